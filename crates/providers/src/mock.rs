use async_trait::async_trait;
use phone_append_types::{AddressParts, Contact};
use serde::Deserialize;

use crate::{LookupProvider, ProviderError};

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockVendorConfig {
    /// Identity reported to the waterfall
    #[serde(default = "default_name")]
    pub name: String,

    /// Answer every call with zero results
    #[serde(default)]
    pub miss: bool,
}

fn default_name() -> String {
    "mock".to_string()
}

impl Default for MockVendorConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            miss: false,
        }
    }
}

/// Offline vendor returning a fixed contact
pub struct MockVendor {
    config: MockVendorConfig,
}

impl MockVendor {
    pub fn new(config: MockVendorConfig) -> Self {
        Self { config }
    }

    fn sample_contact() -> Contact {
        Contact {
            firstname: Some("Sally".into()),
            lastname: Some("Smith".into()),
            address: Some("123 Main St".into()),
            city: Some("Anytown".into()),
            zip: Some("01234".into()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl LookupProvider for MockVendor {
    fn identity(&self) -> &str {
        &self.config.name
    }

    async fn lookup(&self, _number: &str) -> Result<Vec<Contact>, ProviderError> {
        if self.config.miss {
            return Err(ProviderError::ZeroResults);
        }
        Ok(vec![Self::sample_contact()])
    }

    async fn lookdown(&self, address: &AddressParts) -> Result<Vec<Contact>, ProviderError> {
        if self.config.miss {
            return Err(ProviderError::ZeroResults);
        }
        let mut contact = Self::sample_contact();
        contact.address = address.line1.clone().or(contact.address);
        contact.city = address.city.clone().or(contact.city);
        contact.state = address.region.clone();
        contact.phone = Some("5555550100".into());
        Ok(vec![contact])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_lookup_returns_sample_contact() {
        let vendor = MockVendor::new(MockVendorConfig::default());
        let contacts = vendor.lookup("5551234567").await.unwrap();
        assert_eq!(
            serde_json::to_value(&contacts).unwrap(),
            json!([{
                "firstname": "Sally",
                "lastname": "Smith",
                "address": "123 Main St",
                "city": "Anytown",
                "zip": "01234"
            }])
        );
    }

    #[tokio::test]
    async fn test_named_miss() {
        let vendor = MockVendor::new(MockVendorConfig {
            name: "mock-b".into(),
            miss: true,
        });
        assert_eq!(vendor.identity(), "mock-b");
        assert!(matches!(vendor.lookup("1").await, Err(ProviderError::ZeroResults)));
    }

    #[tokio::test]
    async fn test_lookdown_echoes_address() {
        let vendor = MockVendor::new(MockVendorConfig::default());
        let address = AddressParts {
            line1: Some("9 Oak Ave".into()),
            region: Some("NY".into()),
            ..Default::default()
        };
        let contacts = vendor.lookdown(&address).await.unwrap();
        assert_eq!(contacts[0].address.as_deref(), Some("9 Oak Ave"));
        assert_eq!(contacts[0].city.as_deref(), Some("Anytown"));
        assert!(contacts[0].phone.is_some());
    }
}
