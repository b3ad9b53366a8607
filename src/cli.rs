use clap::Parser;
use phone_append_config::{AppConfig, ProviderEntry};
use serde_json::{json, Value};
use std::path::PathBuf;

/// Phone number enrichment
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Dataset file, overrides dataset.path
    #[arg(long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Run the waterfall lookup pass
    #[arg(long)]
    pub lookup: bool,

    /// Run the geocoding pass
    #[arg(long)]
    pub geocode: bool,

    /// Serve address lookdowns over HTTP
    #[arg(long)]
    pub server: bool,

    /// Write the dataset as CSV after any passes
    #[arg(long, value_name = "FILE")]
    pub export_csv: Option<PathBuf>,

    /// Geocoder name ("mock" or "google")
    #[arg(long)]
    pub geocoder: Option<String>,

    /// WhitePages API key
    #[arg(long)]
    pub wp_key: Option<String>,

    /// PacificEast account id
    #[arg(long)]
    pub pce_id: Option<String>,

    /// PacificEast environment ("dev" or "prod")
    #[arg(long)]
    pub pce_env: Option<String>,

    /// Run every call without prompting
    #[arg(long)]
    pub runall: bool,

    /// Server shared-secret id
    #[arg(long)]
    pub sid: Option<String>,

    /// Server shared-secret token
    #[arg(long)]
    pub token: Option<String>,

    /// Server listen address
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,
}

impl Args {
    pub fn has_action(&self) -> bool {
        self.lookup || self.geocode || self.server || self.export_csv.is_some()
    }

    /// Overlay command-line flags onto the loaded configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(path) = &self.data {
            config.dataset.path = path.clone();
        }
        if self.runall {
            config.lookup.run_all = true;
        }
        if let Some(name) = &self.geocoder {
            if !config.geocoding.provider.provider.eq_ignore_ascii_case(name) {
                config.geocoding.provider = ProviderEntry::named(name.clone());
            }
        }
        if let Some(sid) = &self.sid {
            config.server.sid = sid.clone();
        }
        if let Some(token) = &self.token {
            config.server.token = token.clone();
        }
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }

        if config.lookup.waterfall.is_empty() {
            config.lookup.waterfall = self.default_waterfall();
        } else {
            self.patch_vendor_settings(&mut config.lookup.waterfall);
        }

        if config.server.vendors.is_empty() {
            config.server.vendors = self.default_server_vendors();
        } else {
            self.patch_vendor_settings(&mut config.server.vendors);
        }
    }

    /// PacificEast restricted, PacificEast public, then WhitePages, each only
    /// when its credential was given. The mock vendor when none was.
    pub fn default_waterfall(&self) -> Vec<ProviderEntry> {
        let mut waterfall = Vec::new();
        if self.pce_id.is_some() {
            waterfall.push(self.pacificeast_entry("restricted"));
            waterfall.push(self.pacificeast_entry("public"));
        }
        if let Some(key) = &self.wp_key {
            waterfall.push(ProviderEntry::new("whitepages", json!({ "api_key": key })));
        }
        if waterfall.is_empty() {
            waterfall.push(ProviderEntry::named("mock"));
        }
        waterfall
    }

    fn default_server_vendors(&self) -> Vec<ProviderEntry> {
        if self.pce_id.is_some() {
            vec![self.pacificeast_entry("restricted")]
        } else {
            vec![ProviderEntry::named("mock")]
        }
    }

    fn pacificeast_entry(&self, mode: &str) -> ProviderEntry {
        let mut settings = json!({ "mode": mode });
        insert_some(&mut settings, "account_id", &self.pce_id);
        insert_some(&mut settings, "env", &self.pce_env);
        ProviderEntry::new("pacificeast", settings)
    }

    fn patch_vendor_settings(&self, entries: &mut [ProviderEntry]) {
        for entry in entries {
            match entry.provider.to_lowercase().as_str() {
                "whitepages" => insert_some(&mut entry.settings, "api_key", &self.wp_key),
                "pacificeast" => {
                    insert_some(&mut entry.settings, "account_id", &self.pce_id);
                    insert_some(&mut entry.settings, "env", &self.pce_env);
                }
                _ => {}
            }
        }
    }
}

fn insert_some(settings: &mut Value, key: &str, value: &Option<String>) {
    if let (Some(table), Some(value)) = (settings.as_object_mut(), value) {
        table.insert(key.to_string(), Value::String(value.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("phone-append").chain(args.iter().copied())).unwrap()
    }

    fn names(entries: &[ProviderEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.provider.as_str()).collect()
    }

    #[test]
    fn test_default_waterfall_without_credentials_is_mock() {
        let mut config = AppConfig::default();
        parse(&["--lookup"]).apply(&mut config);
        assert_eq!(names(&config.lookup.waterfall), ["mock"]);
        assert_eq!(names(&config.server.vendors), ["mock"]);
    }

    #[test]
    fn test_default_waterfall_order() {
        let mut config = AppConfig::default();
        parse(&["--pce-id", "1234", "--pce-env", "prod", "--wp-key", "abcd"]).apply(&mut config);

        let waterfall = &config.lookup.waterfall;
        assert_eq!(names(waterfall), ["pacificeast", "pacificeast", "whitepages"]);
        assert_eq!(
            waterfall[0].settings,
            json!({"mode": "restricted", "account_id": "1234", "env": "prod"})
        );
        assert_eq!(waterfall[1].settings["mode"], "public");
        assert_eq!(waterfall[2].settings, json!({"api_key": "abcd"}));
        assert_eq!(config.server.vendors[0].settings["mode"], "restricted");
    }

    #[test]
    fn test_flags_patch_configured_vendors() {
        let mut config = AppConfig::default();
        config.lookup.waterfall = vec![
            ProviderEntry::new("WhitePages", json!({"api_key": "from-file"})),
            ProviderEntry::named("mock"),
        ];
        parse(&["--wp-key", "from-flag"]).apply(&mut config);

        assert_eq!(config.lookup.waterfall[0].settings["api_key"], "from-flag");
        assert_eq!(config.lookup.waterfall[1].settings, json!({}));
    }

    #[test]
    fn test_scalar_overrides() {
        let mut config = AppConfig::default();
        parse(&[
            "--data", "other.json", "--runall", "--geocoder", "google", "--sid", "s", "--token",
            "t", "--bind", "127.0.0.1:9000",
        ])
        .apply(&mut config);

        assert_eq!(config.dataset.path, PathBuf::from("other.json"));
        assert!(config.lookup.run_all);
        assert_eq!(config.geocoding.provider.provider, "google");
        assert_eq!(config.server.sid, "s");
        assert_eq!(config.server.token, "t");
        assert_eq!(config.server.bind, "127.0.0.1:9000");
    }

    #[test]
    fn test_has_action() {
        assert!(!parse(&[]).has_action());
        assert!(parse(&["--export-csv", "out.csv"]).has_action());
        assert!(parse(&["--server"]).has_action());
    }
}
