//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PREDICT_BACK_CONFIG_PATH";

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Whole-hour UTC offset of the reference civil timezone.
    pub timezone_offset_hours: i8,
    /// Token expected in the `x-admin-token` header for admin routes.
    pub admin_token: String,
    /// Points awarded for a correct majority prediction.
    pub points_per_win: u32,
    /// Lifetime in days of the anonymous pseudo-identity cookie and of the
    /// staged records held under it.
    pub anon_cookie_ttl_days: u64,
    /// Number of questions returned by the past-questions listing.
    pub past_questions_limit: usize,
    /// Days after publication written into `results_unlock_date` by the
    /// admin sync path. Distinct from the one-day lifecycle gate.
    pub results_sync_delay_days: i64,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// built-in defaults when the file is absent or unreadable.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            // Eastern Time standard offset; the reference timezone of the
            // original deployment.
            timezone_offset_hours: -5,
            admin_token: "admin123".into(),
            points_per_win: 10,
            anon_cookie_ttl_days: 365,
            past_questions_limit: 5,
            results_sync_delay_days: 3,
        }
    }
}

/// JSON representation of the configuration file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    timezone_offset_hours: Option<i8>,
    admin_token: Option<String>,
    points_per_win: Option<u32>,
    anon_cookie_ttl_days: Option<u64>,
    past_questions_limit: Option<usize>,
    results_sync_delay_days: Option<i64>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            timezone_offset_hours: raw
                .timezone_offset_hours
                .unwrap_or(defaults.timezone_offset_hours),
            admin_token: raw.admin_token.unwrap_or(defaults.admin_token),
            points_per_win: raw.points_per_win.unwrap_or(defaults.points_per_win),
            anon_cookie_ttl_days: raw
                .anon_cookie_ttl_days
                .unwrap_or(defaults.anon_cookie_ttl_days),
            past_questions_limit: raw
                .past_questions_limit
                .unwrap_or(defaults.past_questions_limit),
            results_sync_delay_days: raw
                .results_sync_delay_days
                .unwrap_or(defaults.results_sync_delay_days),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_raw_config_keeps_defaults_for_missing_fields() {
        let raw: RawConfig =
            serde_json::from_str(r#"{"points_per_win": 25, "admin_token": "hunter2"}"#).unwrap();
        let config: AppConfig = raw.into();

        assert_eq!(config.points_per_win, 25);
        assert_eq!(config.admin_token, "hunter2");
        assert_eq!(config.timezone_offset_hours, -5);
        assert_eq!(config.past_questions_limit, 5);
        assert_eq!(config.results_sync_delay_days, 3);
    }
}
