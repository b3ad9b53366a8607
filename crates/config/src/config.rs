//! Core configuration structures for phone-append

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Main application configuration. Every section may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub lookup: LookupConfig,

    #[serde(default)]
    pub geocoding: GeocodingConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// JSON array of number records, rewritten at every checkpoint
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,

    /// Lookup-pass successes between checkpoints
    #[serde(default = "default_checkpoint_every")]
    pub checkpoint_every: usize,
}

/// A provider name plus the settings table handed to its factory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub provider: String,

    #[serde(default = "empty_table")]
    pub settings: Value,
}

impl ProviderEntry {
    pub fn new(provider: impl Into<String>, settings: Value) -> Self {
        Self {
            provider: provider.into(),
            settings,
        }
    }

    pub fn named(provider: impl Into<String>) -> Self {
        Self::new(provider, empty_table())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Providers in the order they are tried
    #[serde(default)]
    pub waterfall: Vec<ProviderEntry>,

    /// Skip the interactive confirmation before each paid call
    #[serde(default)]
    pub run_all: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_geocoder")]
    pub provider: ProviderEntry,

    /// Minimum pause between geocoder calls in milliseconds
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Shared-secret pair every request must present
    #[serde(default)]
    pub sid: String,

    #[serde(default)]
    pub token: String,

    /// Providers asked to look down an address, in order
    #[serde(default)]
    pub vendors: Vec<ProviderEntry>,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("numbers.json")
}

fn default_checkpoint_every() -> usize {
    10
}

fn empty_table() -> Value {
    Value::Object(Default::default())
}

fn default_geocoder() -> ProviderEntry {
    ProviderEntry::named("mock")
}

fn default_pause_ms() -> u64 {
    500
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            checkpoint_every: default_checkpoint_every(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            provider: default_geocoder(),
            pause_ms: default_pause_ms(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            sid: String::new(),
            token: String::new(),
            vendors: Vec::new(),
        }
    }
}
