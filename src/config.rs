//! Environment configuration.

use std::env;

pub const NO_COLOR_ENV_VAR: &str = "FORGE_NO_COLOR";
pub const NO_HIGHLIGHT_ENV_VAR: &str = "FORGE_NO_HIGHLIGHT";
pub const COLUMNS_ENV_VAR: &str = "FORGE_COLUMNS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub no_color: bool,
    pub no_highlight: bool,
    /// Fixed render width; bypasses terminal size detection.
    pub columns: Option<u16>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            no_color: env_flag(NO_COLOR_ENV_VAR) || env_string_opt("NO_COLOR").is_some(),
            no_highlight: env_flag(NO_HIGHLIGHT_ENV_VAR),
            columns: env_string_opt(COLUMNS_ENV_VAR)
                .and_then(|value| value.trim().parse::<u16>().ok())
                .filter(|columns| *columns > 0),
        }
    }

    /// Colors are on unless disabled.
    pub fn color_enabled(&self) -> bool {
        !self.no_color
    }

    /// Highlighting needs color.
    pub fn highlight_enabled(&self) -> bool {
        !self.no_color && !self.no_highlight
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn env_defaults_enable_color_and_highlighting() {
        let _lock = env_lock();
        let _g1 = set_env_guard(NO_COLOR_ENV_VAR, None);
        let _g2 = set_env_guard("NO_COLOR", None);
        let _g3 = set_env_guard(NO_HIGHLIGHT_ENV_VAR, None);
        let _g4 = set_env_guard(COLUMNS_ENV_VAR, None);

        let config = EnvConfig::from_env();
        assert!(config.color_enabled());
        assert!(config.highlight_enabled());
        assert_eq!(config.columns, None);
    }

    #[test]
    fn no_color_disables_highlighting_too() {
        let _lock = env_lock();
        let _g1 = set_env_guard(NO_COLOR_ENV_VAR, Some("1"));
        let _g2 = set_env_guard(NO_HIGHLIGHT_ENV_VAR, None);

        let config = EnvConfig::from_env();
        assert!(!config.color_enabled());
        assert!(!config.highlight_enabled());
    }

    #[test]
    fn columns_override_ignores_garbage_and_zero() {
        let _lock = env_lock();
        let _g1 = set_env_guard(COLUMNS_ENV_VAR, Some("120"));
        assert_eq!(EnvConfig::from_env().columns, Some(120));

        let _g2 = set_env_guard(COLUMNS_ENV_VAR, Some("wide"));
        assert_eq!(EnvConfig::from_env().columns, None);

        let _g3 = set_env_guard(COLUMNS_ENV_VAR, Some("0"));
        assert_eq!(EnvConfig::from_env().columns, None);
    }
}
