//! Integration tests for the config crate

use phone_append_config::{validate_config, validate_server_credentials, ConfigLoader};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

fn example_config_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/phone-append.example.toml")
}

#[test]
fn test_load_example_config() {
    let config =
        ConfigLoader::from_file(&example_config_path()).expect("Failed to load example config");

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.dataset.checkpoint_every, 10);

    let names: Vec<_> = config
        .lookup
        .waterfall
        .iter()
        .map(|e| e.provider.as_str())
        .collect();
    assert_eq!(names, ["pacificeast", "pacificeast", "whitepages"]);
    assert_eq!(config.lookup.waterfall[1].settings["mode"], "public");
    assert_eq!(config.geocoding.provider.provider, "mock");
    assert_eq!(config.server.vendors.len(), 1);
}

#[test]
fn test_example_config_is_valid() {
    let config = ConfigLoader::from_file(&example_config_path()).unwrap();
    validate_config(&config).expect("example config should validate");
    validate_server_credentials(&config).expect("example config carries credentials");
}

#[test]
fn test_yaml_and_toml_agree() {
    let toml = r#"
        [dataset]
        path = "numbers.json"
        checkpoint_every = 3

        [[lookup.waterfall]]
        provider = "mock"
        settings = { name = "first", miss = true }
    "#;
    let yaml = r#"
dataset:
  path: numbers.json
  checkpoint_every: 3
lookup:
  waterfall:
    - provider: mock
      settings:
        name: first
        miss: true
"#;
    let mut toml_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    toml_file.write_all(toml.as_bytes()).unwrap();
    let mut yaml_file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
    yaml_file.write_all(yaml.as_bytes()).unwrap();

    let from_toml = ConfigLoader::from_file(toml_file.path()).unwrap();
    let from_yaml = ConfigLoader::from_file(yaml_file.path()).unwrap();
    assert_eq!(from_toml, from_yaml);
}

#[test]
fn test_invalid_file_fails_validation() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"{\"logging\": {\"level\": \"chatty\"}, \"dataset\": {\"checkpoint_every\": 0}}")
        .unwrap();
    let content = std::fs::read_to_string(file.path()).unwrap();

    let config = ConfigLoader::from_json(&content).unwrap();
    let err = validate_config(&config).unwrap_err().to_string();
    assert!(err.contains("logging.level"));
    assert!(err.contains("dataset.checkpoint_every"));
}

#[test]
fn test_missing_file_is_a_load_error() {
    let result = ConfigLoader::from_file_with_env(Path::new("/nonexistent/phone-append.toml"), "X");
    assert!(result.is_err());
}

