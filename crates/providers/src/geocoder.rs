use async_trait::async_trait;
use phone_append_types::{AddressParts, GeoLocation};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{Geocoder, ProviderError, RegistryError};

const MOCK_ACCURACY: &str = "mock_POINT";
const MOCK_LATITUDE: f64 = 33.8120918;
const MOCK_LONGITUDE: f64 = -117.9189742;

/// Offline geocoder that places every address at the same point
#[derive(Debug, Default)]
pub struct MockGeocoder;

impl MockGeocoder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    fn identity(&self) -> &str {
        "mock"
    }

    async fn geocode(&self, address: &AddressParts) -> Result<GeoLocation, ProviderError> {
        Ok(GeoLocation {
            formatted: address.one_line(),
            accuracy: MOCK_ACCURACY.to_string(),
            latitude: MOCK_LATITUDE,
            longitude: MOCK_LONGITUDE,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// GOOGLE
// ═══════════════════════════════════════════════════════════════════════════

const GOOGLE_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoogleGeocoderConfig {
    pub api_key: String,

    #[serde(default = "default_google_url")]
    pub base_url: String,
}

fn default_google_url() -> String {
    GOOGLE_BASE_URL.to_string()
}

/// Google Maps geocoding API
pub struct GoogleGeocoder {
    config: GoogleGeocoderConfig,
    client: Client,
}

impl GoogleGeocoder {
    pub fn new(config: GoogleGeocoderConfig) -> Result<Self, RegistryError> {
        if config.api_key.trim().is_empty() {
            return Err(RegistryError::configuration("google", "api_key must not be empty"));
        }
        Ok(Self {
            config,
            client: Client::new(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    status: String,
    #[serde(default)]
    results: Vec<GoogleResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleResult {
    formatted_address: String,
    geometry: GoogleGeometry,
}

#[derive(Debug, Deserialize)]
struct GoogleGeometry {
    location: GoogleLatLng,
    location_type: String,
}

#[derive(Debug, Deserialize)]
struct GoogleLatLng {
    lat: f64,
    lng: f64,
}

/// Interpret a geocode/json body
pub fn parse_google_response(body: &str) -> Result<GeoLocation, ProviderError> {
    let response: GoogleResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    match response.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Err(ProviderError::ZeroResults),
        other => {
            return Err(ProviderError::Network(format!(
                "Google geocoder status {other}: {}",
                response.error_message.unwrap_or_default()
            )))
        }
    }

    let first = response
        .results
        .into_iter()
        .next()
        .ok_or(ProviderError::ZeroResults)?;

    Ok(GeoLocation {
        formatted: first.formatted_address,
        accuracy: first.geometry.location_type,
        latitude: first.geometry.location.lat,
        longitude: first.geometry.location.lng,
    })
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    fn identity(&self) -> &str {
        "google"
    }

    async fn geocode(&self, address: &AddressParts) -> Result<GeoLocation, ProviderError> {
        let query = address.one_line();
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[("address", query.as_str()), ("key", self.config.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Network(format!(
                "Google geocoder returned status {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        debug!(address = %query, "Parsing Google geocoder response");
        parse_google_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_geocoder() {
        let address = AddressParts {
            line1: Some("123 Main St".into()),
            line2: Some("Apt 13".into()),
            city: Some("Anytown".into()),
            region: Some("CA".into()),
            country: Some("US".into()),
            postal_code: Some("01234".into()),
        };
        let location = MockGeocoder::new().geocode(&address).await.unwrap();
        assert_eq!(location.formatted, "123 Main St Apt 13 Anytown CA US 01234");
        assert_eq!(location.accuracy, "mock_POINT");
        assert_eq!(location.latitude, 33.8120918);
        assert_eq!(location.longitude, -117.9189742);
    }

    #[test]
    fn test_google_ok() {
        let body = r#"{
            "status": "OK",
            "results": [{
                "formatted_address": "1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA",
                "geometry": {
                    "location": {"lat": 37.4224764, "lng": -122.0842499},
                    "location_type": "ROOFTOP"
                }
            }]
        }"#;
        let location = parse_google_response(body).unwrap();
        assert_eq!(location.accuracy, "ROOFTOP");
        assert_eq!(location.latitude, 37.4224764);
    }

    #[test]
    fn test_google_statuses() {
        assert!(matches!(
            parse_google_response(r#"{"status": "ZERO_RESULTS", "results": []}"#),
            Err(ProviderError::ZeroResults)
        ));
        assert!(matches!(
            parse_google_response(r#"{"status": "REQUEST_DENIED", "error_message": "bad key"}"#),
            Err(ProviderError::Network(_))
        ));
        assert!(matches!(
            parse_google_response(r#"{"results": []}"#),
            Err(ProviderError::Parse(_))
        ));
    }

    #[test]
    fn test_google_requires_key() {
        let err = GoogleGeocoder::new(GoogleGeocoderConfig {
            api_key: String::new(),
            base_url: default_google_url(),
        })
        .err()
        .unwrap();
        assert!(matches!(err, RegistryError::Configuration { .. }));
    }
}
