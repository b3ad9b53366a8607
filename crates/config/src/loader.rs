//! Reading `AppConfig` from files, strings and the environment

use crate::{AppConfig, ConfigError, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use std::path::Path;
use tracing::debug;

/// Default prefix for environment overrides, e.g. `PHONE_APPEND_DATASET__PATH`
pub const ENV_PREFIX: &str = "PHONE_APPEND";

/// Serialization formats a config file may use, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            Some(other) => Err(ConfigError::LoadError(format!(
                "{}: unsupported extension .{other}",
                path.display()
            ))),
            None => Err(ConfigError::LoadError(format!(
                "{}: cannot tell the format without an extension",
                path.display()
            ))),
        }
    }

    fn file_format(self) -> FileFormat {
        match self {
            Self::Toml => FileFormat::Toml,
            Self::Yaml => FileFormat::Yaml,
            Self::Json => FileFormat::Json,
        }
    }
}

/// Entry points for building an `AppConfig`
pub struct ConfigLoader;

impl ConfigLoader {
    /// Parse a single file, format picked from its extension
    pub fn from_file(path: &Path) -> Result<AppConfig> {
        let format = ConfigFormat::from_path(path)?;
        debug!(path = %path.display(), ?format, "Reading config file");
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    pub fn parse(content: &str, format: ConfigFormat) -> Result<AppConfig> {
        match format {
            ConfigFormat::Toml => Self::from_toml(content),
            ConfigFormat::Yaml => Self::from_yaml(content),
            ConfigFormat::Json => Self::from_json(content),
        }
    }

    pub fn from_toml(content: &str) -> Result<AppConfig> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_yaml(content: &str) -> Result<AppConfig> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<AppConfig> {
        Ok(serde_json::from_str(content)?)
    }

    /// Defaults overlaid with `PHONE_APPEND_*` variables
    pub fn from_env() -> Result<AppConfig> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Defaults overlaid with `<prefix>_*` variables. Nested keys use a
    /// double underscore: `<prefix>_DATASET__CHECKPOINT_EVERY=25`
    pub fn from_env_with_prefix(prefix: &str) -> Result<AppConfig> {
        Self::builder().add_env(prefix).build()
    }

    /// A file overlaid with `<env_prefix>_*` variables. Keys missing from the
    /// environment keep their file values.
    pub fn from_file_with_env(path: &Path, env_prefix: &str) -> Result<AppConfig> {
        if !path.is_file() {
            return Err(ConfigError::LoadError(format!(
                "{}: no such config file",
                path.display()
            )));
        }
        Self::builder().add_file(path, true)?.add_env(env_prefix).build()
    }

    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder {
            sources: Config::builder(),
        }
    }
}

/// Layers config sources on top of each other; later layers win
pub struct ConfigLoaderBuilder {
    sources: ConfigBuilder<DefaultState>,
}

impl ConfigLoaderBuilder {
    pub fn add_file(mut self, path: &Path, required: bool) -> Result<Self> {
        let format = ConfigFormat::from_path(path)?.file_format();
        self.sources = self
            .sources
            .add_source(File::from(path).format(format).required(required));
        Ok(self)
    }

    pub fn add_env(mut self, prefix: &str) -> Self {
        self.sources = self.sources.add_source(
            Environment::with_prefix(prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
        self
    }

    pub fn build(self) -> Result<AppConfig> {
        Ok(self.sources.build()?.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    const TOML: &str = r#"
        [logging]
        level = "debug"

        [dataset]
        path = "data/numbers.json"
        checkpoint_every = 25

        [lookup]
        run_all = true

        [[lookup.waterfall]]
        provider = "pacificeast"
        settings = { account_id = "1234", env = "prod", mode = "restricted" }

        [[lookup.waterfall]]
        provider = "whitepages"
        settings = { api_key = "abcd" }

        [geocoding]
        provider = { provider = "google", settings = { api_key = "g-key" } }
        pause_ms = 250
    "#;

    #[test]
    fn test_parse_toml_document() {
        let config = ConfigLoader::from_toml(TOML).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.dataset.checkpoint_every, 25);
        assert!(config.lookup.run_all);
        assert_eq!(config.lookup.waterfall.len(), 2);
        assert_eq!(config.lookup.waterfall[0].provider, "pacificeast");
        assert_eq!(config.lookup.waterfall[0].settings["env"], json!("prod"));
        assert_eq!(config.geocoding.provider.provider, "google");
        assert_eq!(config.geocoding.pause_ms, 250);
        // untouched sections keep their defaults
        assert_eq!(config.server.bind, "0.0.0.0:8080");
    }

    #[test]
    fn test_parse_yaml_document() {
        let yaml = r#"
logging:
  level: warn
  json: true
lookup:
  waterfall:
    - provider: mock
      settings:
        name: mock-a
    - provider: mock
server:
  sid: "123"
  token: "456"
  vendors:
    - provider: mock
"#;
        let config = ConfigLoader::from_yaml(yaml).unwrap();
        assert!(config.logging.json);
        assert_eq!(config.lookup.waterfall[0].settings, json!({"name": "mock-a"}));
        assert_eq!(config.lookup.waterfall[1].settings, json!({}));
        assert_eq!(config.server.sid, "123");
        assert_eq!(config.server.vendors.len(), 1);
    }

    #[test]
    fn test_json_sections_default_independently() {
        let config = ConfigLoader::from_json(r#"{"dataset": {"path": "x.json"}}"#).unwrap();
        assert_eq!(config.dataset.path, std::path::PathBuf::from("x.json"));
        assert_eq!(config.dataset.checkpoint_every, 10);
        assert_eq!(config.geocoding.provider.provider, "mock");
    }

    #[test]
    fn test_empty_document_is_all_defaults() {
        assert_eq!(ConfigLoader::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_read_toml_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(TOML.as_bytes()).unwrap();

        let config = ConfigLoader::from_file(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("a.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert!(ConfigFormat::from_path(Path::new("config")).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(matches!(
            ConfigLoader::from_file(file.path()),
            Err(ConfigError::LoadError(_))
        ));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(TOML.as_bytes()).unwrap();

        std::env::set_var("PA_LOADER_TEST_DATASET__CHECKPOINT_EVERY", "5");
        let config = ConfigLoader::from_file_with_env(file.path(), "PA_LOADER_TEST").unwrap();
        std::env::remove_var("PA_LOADER_TEST_DATASET__CHECKPOINT_EVERY");

        assert_eq!(config.dataset.checkpoint_every, 5);
        // values absent from the environment come from the file
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.lookup.waterfall.len(), 2);
    }
}
