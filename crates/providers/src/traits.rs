use async_trait::async_trait;
use phone_append_types::{AddressParts, Contact, GeoLocation};

use crate::ProviderError;

/// Reverse phone lookup capability
#[async_trait]
pub trait LookupProvider: Send + Sync {
    /// Stable name recorded in `vendors_checked` and on resolved records
    fn identity(&self) -> &str;

    /// Resolve a phone number to one or more contacts
    async fn lookup(&self, number: &str) -> Result<Vec<Contact>, ProviderError>;

    /// Resolve a name/address to contacts with phone numbers
    async fn lookdown(&self, _address: &AddressParts) -> Result<Vec<Contact>, ProviderError> {
        Err(ProviderError::unsupported(self.identity(), "lookdown"))
    }
}

/// Postal address to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    fn identity(&self) -> &str;

    async fn geocode(&self, address: &AddressParts) -> Result<GeoLocation, ProviderError>;
}
