//! File logging for the console binary.
//!
//! The console draws on stdout, so log records go to a file instead.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber appending to `log_path`.
///
/// The level comes from `RUST_LOG` and defaults to `info`. Calling this a
/// second time in one process leaves the first subscriber in place.
pub fn init_file_logging(log_path: &Path) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create log directory '{}'", parent.display())
            })?;
        }
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("failed to open log file '{}'", log_path.display()))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .try_init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log_path = dir.path().join("nested").join("logs").join("autodebugger.log");

        init_file_logging(&log_path).expect("logging initializes");
        assert!(log_path.exists());
    }

    #[test]
    fn unwritable_location_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = init_file_logging(dir.path()).expect_err("a directory is not a log file");
        assert!(error.to_string().contains("failed to open log file"));
    }
}
