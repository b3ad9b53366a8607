//! Configuration validation

use crate::{AppConfig, ConfigError, ProviderEntry, Result};
use std::net::SocketAddr;

/// Longest accepted pause between geocoder calls
pub const MAX_PAUSE_MS: u64 = 60_000;

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the entire application configuration, reporting every problem found
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    if let Err(e) = validate_log_level(&config.logging.level) {
        errors.push(e);
    }

    if config.dataset.path.as_os_str().is_empty() {
        errors.push(ValidationError::new("dataset.path", "path must not be empty"));
    }

    if config.dataset.checkpoint_every == 0 {
        errors.push(ValidationError::new(
            "dataset.checkpoint_every",
            "checkpoint interval must be greater than 0",
        ));
    }

    for (i, entry) in config.lookup.waterfall.iter().enumerate() {
        errors.extend(validate_provider_entry(&format!("lookup.waterfall[{i}]"), entry));
    }

    errors.extend(validate_provider_entry(
        "geocoding.provider",
        &config.geocoding.provider,
    ));

    if config.geocoding.pause_ms > MAX_PAUSE_MS {
        errors.push(ValidationError::new(
            "geocoding.pause_ms",
            format!("pause must not exceed {MAX_PAUSE_MS} ms"),
        ));
    }

    if config.server.bind.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind",
            format!("invalid socket address: {}", config.server.bind),
        ));
    }

    for (i, entry) in config.server.vendors.iter().enumerate() {
        errors.extend(validate_provider_entry(&format!("server.vendors[{i}]"), entry));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        let error_msg = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(ConfigError::ValidationError(error_msg))
    }
}

/// Server credentials are only required when the server is actually started
pub fn validate_server_credentials(config: &AppConfig) -> Result<()> {
    let mut missing = Vec::new();
    if config.server.sid.trim().is_empty() {
        missing.push("server.sid: must not be empty");
    }
    if config.server.token.trim().is_empty() {
        missing.push("server.token: must not be empty");
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(missing.join("; ")))
    }
}

fn validate_provider_entry(field: &str, entry: &ProviderEntry) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if entry.provider.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{field}.provider"),
            "provider name must not be empty",
        ));
    }
    if !entry.settings.is_object() {
        errors.push(ValidationError::new(
            format!("{field}.settings"),
            "settings must be a table",
        ));
    }
    errors
}

fn validate_log_level(level: &str) -> std::result::Result<(), ValidationError> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new(
            "logging.level",
            format!("invalid log level: {level}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AppConfig::default();
        config.logging.level = "loud".to_string();
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("logging.level"));
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = AppConfig::default();
        config.dataset.checkpoint_every = 0;
        config.geocoding.pause_ms = MAX_PAUSE_MS + 1;
        config.server.bind = "not-an-address".to_string();
        config
            .lookup
            .waterfall
            .push(ProviderEntry::new("", json!(["not", "a", "table"])));

        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("dataset.checkpoint_every"));
        assert!(err.contains("geocoding.pause_ms"));
        assert!(err.contains("server.bind"));
        assert!(err.contains("lookup.waterfall[0].provider"));
        assert!(err.contains("lookup.waterfall[0].settings"));
    }

    #[test]
    fn test_server_credentials() {
        let mut config = AppConfig::default();
        let err = validate_server_credentials(&config).unwrap_err().to_string();
        assert!(err.contains("server.sid"));
        assert!(err.contains("server.token"));

        config.server.sid = "1234".to_string();
        config.server.token = "5678".to_string();
        assert!(validate_server_credentials(&config).is_ok());
    }
}
