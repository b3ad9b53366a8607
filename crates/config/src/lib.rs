//! Configuration management for phone-append
//!
//! One `AppConfig` drives the CLI, both enrichment passes and the lookdown
//! service. It can be read from TOML, YAML or JSON, overridden from
//! `PHONE_APPEND_*` environment variables, and validated in one go so every
//! problem is reported together.

mod config;
mod loader;
mod validation;

pub use self::config::*;
pub use self::loader::*;
pub use self::validation::*;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot load config: {0}")]
    LoadError(String),

    #[error("invalid config: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("config source error: {0}")]
    ConfigLibError(#[from] ::config::ConfigError),

    #[error("invalid TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
