//! Server configuration.
//!
//! Loaded from environment variables with development defaults; unparsable
//! values are a startup error, not a silent fallback.

use std::env;
use std::time::Duration;

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub http_port: u16,

    /// Path to the SQLite database file.
    pub database_path: String,

    /// JWT signing secret.
    pub jwt_secret: String,

    /// JWT token lifetime in seconds.
    pub jwt_lifetime_secs: i64,

    /// Payment gateway timeout in seconds.
    pub payment_timeout_secs: u64,

    /// SQLite writer-lock wait bound in seconds.
    pub busy_timeout_secs: u64,
}

impl AppConfig {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|name| env::var(name).ok())
    }

    /// Loads configuration through a variable lookup (testable).
    fn load_from(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(AppConfig {
            http_port: parse_or(&get, "OPENLOT_HTTP_PORT", 8080)?,

            database_path: get("OPENLOT_DATABASE_PATH").unwrap_or_else(|| "openlot.db".to_string()),

            // In production this MUST be set via environment variable
            jwt_secret: get("OPENLOT_JWT_SECRET")
                .unwrap_or_else(|| "openlot-dev-secret-change-in-production".to_string()),

            jwt_lifetime_secs: parse_or(&get, "OPENLOT_JWT_LIFETIME_SECS", 86_400)?,

            payment_timeout_secs: parse_or(&get, "OPENLOT_PAYMENT_TIMEOUT_SECS", 10)?,

            busy_timeout_secs: parse_or(&get, "OPENLOT_BUSY_TIMEOUT_SECS", 5)?,
        })
    }

    pub fn payment_timeout(&self) -> Duration {
        Duration::from_secs(self.payment_timeout_secs)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }
}

fn parse_or<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match get(name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::load_from(|_| None).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.database_path, "openlot.db");
        assert_eq!(config.jwt_lifetime_secs, 86_400);
        assert_eq!(config.payment_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("OPENLOT_HTTP_PORT", "9000"),
            ("OPENLOT_DATABASE_PATH", "/data/openlot.db"),
        ]
        .into_iter()
        .collect();
        let config =
            AppConfig::load_from(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.database_path, "/data/openlot.db");
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let result = AppConfig::load_from(|name| {
            (name == "OPENLOT_HTTP_PORT").then(|| "not-a-port".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }
}
