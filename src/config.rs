//! Runtime settings read from the environment (and `.env` via dotenvy).

use std::time::Duration;

use crate::error::{Error, Result};
use crate::fetch::DEFAULT_TIMEOUT;
use crate::handover::DEFAULT_BASE_URL;

/// Value used when a handover lookup fails, unless disabled with
/// `HANDOVER_FALLBACK=none`.
pub const DEFAULT_HANDOVER_FALLBACK: f64 = 15.0;

pub const DEFAULT_LOG_FILE_PATH: &str = "logs/station_zones.log";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub handover_api_url: String,
    pub handover_timeout: Duration,
    pub handover_fallback: Option<f64>,
    pub log_file_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            handover_api_url: DEFAULT_BASE_URL.to_string(),
            handover_timeout: DEFAULT_TIMEOUT,
            handover_fallback: Some(DEFAULT_HANDOVER_FALLBACK),
            log_file_path: DEFAULT_LOG_FILE_PATH.to_string(),
        }
    }
}

impl Config {
    /// Reads `HANDOVER_API_URL`, `HANDOVER_TIMEOUT_SECS`, `HANDOVER_FALLBACK`
    /// and `LOG_FILE_PATH` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let handover_timeout = match lookup("HANDOVER_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<f64>().ok().filter(|s| s.is_finite() && *s > 0.0);
                let secs = secs.ok_or_else(|| {
                    Error::validation(format!("HANDOVER_TIMEOUT_SECS must be a positive number, got '{raw}'"))
                })?;
                Duration::from_secs_f64(secs)
            }
            None => defaults.handover_timeout,
        };

        let handover_fallback = match lookup("HANDOVER_FALLBACK") {
            Some(raw) if raw.trim().eq_ignore_ascii_case("none") => None,
            Some(raw) => {
                let value = raw.trim().parse::<f64>().ok().filter(|v| v.is_finite());
                Some(value.ok_or_else(|| {
                    Error::validation(format!("HANDOVER_FALLBACK must be a number or 'none', got '{raw}'"))
                })?)
            }
            None => defaults.handover_fallback,
        };

        Ok(Config {
            handover_api_url: lookup("HANDOVER_API_URL").unwrap_or(defaults.handover_api_url),
            handover_timeout,
            handover_fallback,
            log_file_path: lookup("LOG_FILE_PATH").unwrap_or(defaults.log_file_path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.handover_timeout, Duration::from_secs(2));
        assert_eq!(config.handover_fallback, Some(15.0));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HANDOVER_API_URL", "http://localhost:8080/api/basestation"),
            ("HANDOVER_TIMEOUT_SECS", "0.5"),
            ("HANDOVER_FALLBACK", "NONE"),
            ("LOG_FILE_PATH", "/tmp/zones.log"),
        ])
        .unwrap();

        assert_eq!(config.handover_api_url, "http://localhost:8080/api/basestation");
        assert_eq!(config.handover_timeout, Duration::from_millis(500));
        assert_eq!(config.handover_fallback, None);
        assert_eq!(config.log_file_path, "/tmp/zones.log");
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(config_from(&[("HANDOVER_TIMEOUT_SECS", "0")]).is_err());
        assert!(config_from(&[("HANDOVER_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config_from(&[("HANDOVER_FALLBACK", "high")]).is_err());
    }
}
