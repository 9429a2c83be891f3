//! Runtime configuration from environment variables.
//!
//! `LOG_FILE` and `APP_NAME` are optional; `SESSION_TIMEOUT_HOURS`
//! (default 24) and `EVICTION_INTERVAL_SECS` (default 3600) must parse as
//! integers or startup fails before any dispatch begins.

use anyhow::Result;
use std::env;

pub struct RuntimeConfig {
    pub app_name: String,
    pub log_file: Option<String>,
    pub session_timeout_hours: i64,
    pub eviction_interval_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            app_name: "menubot".to_string(),
            log_file: None,
            session_timeout_hours: 24,
            eviction_interval_secs: 3600,
        }
    }
}

impl RuntimeConfig {
    /// Loads from environment variables, falling back to defaults.
    /// Load `.env` (e.g. `dotenvy::dotenv()`) before calling if used.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let app_name = env::var("APP_NAME").unwrap_or(defaults.app_name);
        let log_file = env::var("LOG_FILE").ok();
        let session_timeout_hours = match env::var("SESSION_TIMEOUT_HOURS") {
            Ok(value) => value.parse().map_err(|_| {
                anyhow::anyhow!("SESSION_TIMEOUT_HOURS must be an integer, got '{}'", value)
            })?,
            Err(_) => defaults.session_timeout_hours,
        };
        let eviction_interval_secs = match env::var("EVICTION_INTERVAL_SECS") {
            Ok(value) => value.parse().map_err(|_| {
                anyhow::anyhow!("EVICTION_INTERVAL_SECS must be an integer, got '{}'", value)
            })?,
            Err(_) => defaults.eviction_interval_secs,
        };
        Ok(Self {
            app_name,
            log_file,
            session_timeout_hours,
            eviction_interval_secs,
        })
    }

    /// Idle window after which a session is eligible for eviction.
    pub fn session_max_idle(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_timeout_hours)
    }

    /// How often the eviction task wakes up.
    pub fn eviction_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.eviction_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.app_name, "menubot");
        assert_eq!(config.session_timeout_hours, 24);
        assert_eq!(config.session_max_idle(), chrono::Duration::hours(24));
        assert_eq!(
            config.eviction_interval(),
            std::time::Duration::from_secs(3600)
        );
    }
}
