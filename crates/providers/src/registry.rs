use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{
    Geocoder, GoogleGeocoder, LookupProvider, MockGeocoder, MockVendor, PacificEast, RegistryError,
    WhitePages,
};

/// Builds one provider instance from its settings table
pub type Factory<T> = Box<dyn Fn(&Value) -> Result<Arc<T>, RegistryError> + Send + Sync>;

/// Case-insensitive name to factory map for one capability category
pub struct ProviderRegistry<T: ?Sized> {
    category: &'static str,
    factories: HashMap<String, Factory<T>>,
}

impl<T: ?Sized> ProviderRegistry<T> {
    pub fn new(category: &'static str) -> Self {
        Self {
            category,
            factories: HashMap::new(),
        }
    }

    pub fn category(&self) -> &'static str {
        self.category
    }

    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<(), RegistryError>
    where
        F: Fn(&Value) -> Result<Arc<T>, RegistryError> + Send + Sync + 'static,
    {
        let key = name.to_lowercase();
        if self.factories.contains_key(&key) {
            return Err(RegistryError::DuplicateProvider {
                category: self.category.to_string(),
                name: key,
            });
        }
        debug!(category = self.category, name = %key, "Registered provider");
        self.factories.insert(key, Box::new(factory));
        Ok(())
    }

    pub fn instantiate(&self, name: &str, settings: &Value) -> Result<Arc<T>, RegistryError> {
        let key = name.to_lowercase();
        let factory = self
            .factories
            .get(&key)
            .ok_or_else(|| RegistryError::UnknownProvider {
                category: self.category.to_string(),
                name: key.clone(),
            })?;
        factory(settings)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_lowercase())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Deserialize a provider's settings table into its config struct.
/// A missing table (`null`) is treated as empty.
pub fn parse_settings<C: DeserializeOwned>(provider: &str, settings: &Value) -> Result<C, RegistryError> {
    let settings = match settings {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    serde_json::from_value(settings).map_err(|e| RegistryError::configuration(provider, e))
}

/// Both registries, built once at startup and passed by reference
pub struct Registries {
    pub lookup: ProviderRegistry<dyn LookupProvider>,
    pub geocoders: ProviderRegistry<dyn Geocoder>,
}

impl Registries {
    pub fn empty() -> Self {
        Self {
            lookup: ProviderRegistry::new("lookup"),
            geocoders: ProviderRegistry::new("geocoder"),
        }
    }

    /// Registries holding every built-in provider
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registries = Self::empty();
        register_lookup_providers(&mut registries.lookup)?;
        register_geocoders(&mut registries.geocoders)?;
        Ok(registries)
    }
}

pub fn register_lookup_providers(
    registry: &mut ProviderRegistry<dyn LookupProvider>,
) -> Result<(), RegistryError> {
    registry.register("mock", |settings| {
        let config = parse_settings("mock", settings)?;
        Ok(Arc::new(MockVendor::new(config)) as Arc<dyn LookupProvider>)
    })?;
    registry.register("whitepages", |settings| {
        let config = parse_settings("whitepages", settings)?;
        Ok(Arc::new(WhitePages::new(config)?) as Arc<dyn LookupProvider>)
    })?;
    registry.register("pacificeast", |settings| {
        let config = parse_settings("pacificeast", settings)?;
        Ok(Arc::new(PacificEast::new(config)?) as Arc<dyn LookupProvider>)
    })?;
    Ok(())
}

pub fn register_geocoders(registry: &mut ProviderRegistry<dyn Geocoder>) -> Result<(), RegistryError> {
    registry.register("mock", |_| Ok(Arc::new(MockGeocoder::new()) as Arc<dyn Geocoder>))?;
    registry.register("google", |settings| {
        let config = parse_settings("google", settings)?;
        Ok(Arc::new(GoogleGeocoder::new(config)?) as Arc<dyn Geocoder>)
    })?;
    Ok(())
}
