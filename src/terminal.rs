//! Terminal size lookup and resize notification.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::EnvConfig;

pub const FALLBACK_COLUMNS: u16 = 80;

/// Width to render at: the configured override, the stdout window size, or 80.
pub fn terminal_columns(config: &EnvConfig) -> u16 {
    config
        .columns
        .or_else(stdout_columns)
        .unwrap_or(FALLBACK_COLUMNS)
}

#[cfg(unix)]
fn stdout_columns() -> Option<u16> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 {
        Some(size.ws_col)
    } else {
        None
    }
}

#[cfg(not(unix))]
fn stdout_columns() -> Option<u16> {
    None
}

/// Set by SIGWINCH; the render loop polls and clears it.
#[derive(Debug, Clone)]
pub struct ResizeFlag {
    flag: Arc<AtomicBool>,
}

impl ResizeFlag {
    #[cfg(unix)]
    pub fn register() -> io::Result<Self> {
        let flag = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(libc::SIGWINCH, Arc::clone(&flag))?;
        Ok(Self { flag })
    }

    #[cfg(not(unix))]
    pub fn register() -> io::Result<Self> {
        Ok(Self {
            flag: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns whether a resize happened since the last call.
    pub fn take(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_columns_win_over_detection() {
        let config = EnvConfig {
            no_color: true,
            no_highlight: true,
            columns: Some(42),
        };
        assert_eq!(terminal_columns(&config), 42);
    }

    #[cfg(unix)]
    #[test]
    fn resize_flag_observes_sigwinch_once() {
        let flag = ResizeFlag::register().expect("register SIGWINCH");
        assert!(!flag.take());
        unsafe {
            libc::raise(libc::SIGWINCH);
        }
        assert!(flag.take());
        assert!(!flag.take());
    }
}
