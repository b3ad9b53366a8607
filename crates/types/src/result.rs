use serde::{Deserialize, Serialize};

use crate::Contact;

/// Outcome of a reverse phone lookup
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    pub success: bool,

    /// Always `None` when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<Contact>>,
}

/// Outcome of a name/address lookdown; same shape as a lookup
pub type LookdownResult = LookupResult;

impl LookupResult {
    pub fn found(contacts: Vec<Contact>) -> Self {
        Self {
            success: true,
            contacts: Some(contacts),
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            contacts: None,
        }
    }

    pub fn into_contacts(self) -> Vec<Contact> {
        self.contacts.unwrap_or_default()
    }
}

impl<E> From<Result<Vec<Contact>, E>> for LookupResult {
    fn from(result: Result<Vec<Contact>, E>) -> Self {
        match result {
            Ok(contacts) => Self::found(contacts),
            Err(_) => Self::failed(),
        }
    }
}

/// Address handed to a geocoder. Every part may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressParts {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

impl AddressParts {
    /// Present, non-empty parts joined with single spaces
    pub fn one_line(&self) -> String {
        [
            &self.line1,
            &self.line2,
            &self.city,
            &self.region,
            &self.country,
            &self.postal_code,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// A geocoder's answer for one address
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub formatted: String,
    pub accuracy: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Outcome of a geocode call; every field other than `success` is absent on failure
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub success: bool,
    pub formatted: Option<String>,
    pub accuracy: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl GeocodeResult {
    pub fn failed() -> Self {
        Self::default()
    }
}

impl From<GeoLocation> for GeocodeResult {
    fn from(location: GeoLocation) -> Self {
        Self {
            success: true,
            formatted: Some(location.formatted),
            accuracy: Some(location.accuracy),
            latitude: Some(location.latitude),
            longitude: Some(location.longitude),
        }
    }
}

impl<E> From<Result<GeoLocation, E>> for GeocodeResult {
    fn from(result: Result<GeoLocation, E>) -> Self {
        match result {
            Ok(location) => location.into(),
            Err(_) => Self::failed(),
        }
    }
}
