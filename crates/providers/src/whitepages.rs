//! WhitePages Pro reverse phone API (JSON entity graph).

use async_trait::async_trait;
use phone_append_types::Contact;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{LookupProvider, ProviderError, RegistryError};

pub const WHITEPAGES_IDENTITY: &str = "WhitePages";

const DEFAULT_BASE_URL: &str = "http://proapi.whitepages.com/2.1/phone.json";

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WhitePagesConfig {
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

pub struct WhitePages {
    config: WhitePagesConfig,
    client: Client,
}

impl WhitePages {
    pub fn new(config: WhitePagesConfig) -> Result<Self, RegistryError> {
        if config.api_key.trim().is_empty() {
            return Err(RegistryError::configuration("whitepages", "api_key must not be empty"));
        }
        Ok(Self {
            config,
            client: Client::new(),
        })
    }
}

#[async_trait]
impl LookupProvider for WhitePages {
    fn identity(&self) -> &str {
        WHITEPAGES_IDENTITY
    }

    async fn lookup(&self, number: &str) -> Result<Vec<Contact>, ProviderError> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[("phone_number", number), ("api_key", self.config.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Network(format!(
                "WhitePages API returned status {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        debug!(number, bytes = body.len(), "Parsing WhitePages response");
        parse_phone_response(&body)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// WIRE FORMAT
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct PhoneResponse {
    results: Vec<PhoneRecord>,
}

#[derive(Debug, Deserialize)]
struct PhoneRecord {
    #[serde(default)]
    belongs_to: Option<Vec<Entity>>,
    #[serde(default)]
    best_location: Option<Location>,
}

#[derive(Debug, Deserialize)]
struct Entity {
    #[serde(default)]
    id: Option<EntityId>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    names: Option<Vec<NameVariant>>,
    #[serde(default)]
    best_location: Option<Location>,
}

#[derive(Debug, Deserialize)]
struct EntityId {
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NameVariant {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Location {
    #[serde(default)]
    standard_address_line1: Option<String>,
    #[serde(default)]
    standard_address_line2: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    postal_code: Option<String>,
    #[serde(default)]
    zip4: Option<String>,
    #[serde(default)]
    state_code: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    lat_long: Option<LatLong>,
}

#[derive(Debug, Deserialize)]
struct LatLong {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    accuracy: Option<String>,
}

impl Entity {
    fn is_business(&self) -> bool {
        self.id
            .as_ref()
            .and_then(|id| id.kind.as_deref())
            .map_or(false, |kind| kind == "Business")
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PARSING
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
struct Name {
    first: Option<String>,
    last: Option<String>,
    complete: bool,
}

/// Turn a phone.json body into one contact per result
pub fn parse_phone_response(body: &str) -> Result<Vec<Contact>, ProviderError> {
    let response: PhoneResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    if response.results.is_empty() {
        return Err(ProviderError::ZeroResults);
    }

    Ok(response.results.iter().map(contact_from_record).collect())
}

fn contact_from_record(record: &PhoneRecord) -> Contact {
    let mut name: Option<Name> = None;
    let mut entity_location: Option<&Location> = None;

    for entity in record.belongs_to.iter().flatten() {
        let have_complete = name.as_ref().map_or(false, |n| n.complete);
        if !have_complete {
            if let Some(candidate) = entity_name(entity) {
                if name.is_none() || candidate.complete {
                    name = Some(candidate);
                }
            }
        }

        if entity_location.is_none() {
            entity_location = entity.best_location.as_ref();
        }

        if name.as_ref().map_or(false, |n| n.complete) && entity_location.is_some() {
            break;
        }
    }

    let (first, last) = name.map_or((None, None), |n| (n.first, n.last));
    let mut contact = Contact::named(first, last);

    if let Some(location) = entity_location.or(record.best_location.as_ref()) {
        apply_location(&mut contact, location);
    }
    contact
}

/// A business counts as a complete name. For people the first variant with
/// both parts wins, otherwise the first variant with either part.
fn entity_name(entity: &Entity) -> Option<Name> {
    if entity.is_business() {
        return entity.name.as_ref().map(|business| Name {
            first: None,
            last: Some(business.clone()),
            complete: true,
        });
    }

    let mut partial = None;
    for variant in entity.names.iter().flatten() {
        match (&variant.first_name, &variant.last_name) {
            (Some(first), Some(last)) => {
                return Some(Name {
                    first: Some(first.clone()),
                    last: Some(last.clone()),
                    complete: true,
                })
            }
            (None, None) => {}
            (first, last) => {
                if partial.is_none() {
                    partial = Some(Name {
                        first: first.clone(),
                        last: last.clone(),
                        complete: false,
                    });
                }
            }
        }
    }
    partial
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn apply_location(contact: &mut Contact, location: &Location) {
    contact.address = non_empty(&location.standard_address_line1);
    contact.line2 = non_empty(&location.standard_address_line2);
    contact.city = location.city.clone();
    contact.state = location.state_code.clone();
    contact.zip = match (&location.postal_code, non_empty(&location.zip4)) {
        (Some(base), Some(plus4)) => Some(format!("{base}-{plus4}")),
        (base, _) => base.clone(),
    };
    contact.country = location.country_code.clone();

    contact.geocoded = true;
    contact.formatted_addr = location.address.clone();
    if let Some(lat_long) = &location.lat_long {
        contact.geo_accuracy = lat_long.accuracy.clone();
        contact.latitude = lat_long.latitude;
        contact.longitude = lat_long.longitude;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phone_append_types::AddressParts;
    use serde_json::json;

    fn location(line1: &str, city: &str, zip4: Option<&str>, accuracy: &str) -> serde_json::Value {
        json!({
            "standard_address_line1": line1,
            "standard_address_line2": "",
            "city": city,
            "postal_code": "01234",
            "zip4": zip4,
            "state_code": "CA",
            "country_code": "US",
            "address": format!("{line1}, {city} CA 01234"),
            "lat_long": {"latitude": 24.688217, "longitude": -106.167145, "accuracy": accuracy}
        })
    }

    fn parse(value: serde_json::Value) -> Vec<Contact> {
        parse_phone_response(&value.to_string()).unwrap()
    }

    #[test]
    fn test_business_without_location() {
        let contacts = parse(json!({
            "results": [{
                "belongs_to": [{"id": {"type": "Business"}, "name": "Whitepages", "best_location": null}],
                "best_location": null
            }]
        }));
        assert_eq!(contacts.len(), 1);
        assert_eq!(
            serde_json::to_value(&contacts[0]).unwrap(),
            json!({"lastname": "Whitepages"})
        );
    }

    #[test]
    fn test_entity_location_beats_phone_location() {
        let contacts = parse(json!({
            "results": [{
                "belongs_to": [{
                    "id": {"type": "Person"},
                    "names": [{"first_name": "Bob", "last_name": "Bobson"}],
                    "best_location": location("3434 Bubble Ct", "Anytown", Some("4444"), "RoofTop")
                }],
                "best_location": location("1 Other Rd", "Elsewhere", None, "PostalCode")
            }]
        }));
        let contact = &contacts[0];
        assert_eq!(contact.firstname.as_deref(), Some("Bob"));
        assert_eq!(contact.lastname.as_deref(), Some("Bobson"));
        assert_eq!(contact.address.as_deref(), Some("3434 Bubble Ct"));
        assert_eq!(contact.city.as_deref(), Some("Anytown"));
        assert_eq!(contact.zip.as_deref(), Some("01234-4444"));
        assert_eq!(contact.geo_accuracy.as_deref(), Some("RoofTop"));
        assert!(contact.geocoded);
        assert!(contact.line2.is_none());
    }

    #[test]
    fn test_phone_location_used_when_no_entity_location() {
        let contacts = parse(json!({
            "results": [{
                "belongs_to": [],
                "best_location": location("", "Mineola", None, "PostalCode")
            }]
        }));
        let value = serde_json::to_value(&contacts[0]).unwrap();
        assert_eq!(value["city"], "Mineola");
        assert_eq!(value["zip"], "01234");
        assert_eq!(value["geocoded"], true);
        assert!(value.get("address").is_none());
        assert!(value.get("line2").is_none());
        assert!(value.get("firstname").is_none());
    }

    #[test]
    fn test_name_variant_preference() {
        let contacts = parse(json!({
            "results": [{
                "belongs_to": [{
                    "id": {"type": "Person"},
                    "names": [
                        {"first_name": "Rob"},
                        {"first_name": "Robert", "last_name": "Jones"},
                        {"first_name": "Bobby", "last_name": "Jones"}
                    ]
                }]
            }]
        }));
        assert_eq!(contacts[0].firstname.as_deref(), Some("Robert"));
        assert_eq!(contacts[0].lastname.as_deref(), Some("Jones"));

        let contacts = parse(json!({
            "results": [{
                "belongs_to": [{
                    "id": {"type": "Person"},
                    "names": [{"middle_name": "Q"}, {"last_name": "Jones"}, {"first_name": "Ann"}]
                }]
            }]
        }));
        assert_eq!(contacts[0].firstname, None);
        assert_eq!(contacts[0].lastname.as_deref(), Some("Jones"));
    }

    #[test]
    fn test_stops_at_first_complete_entity() {
        let contacts = parse(json!({
            "results": [{
                "belongs_to": [
                    {
                        "id": {"type": "Person"},
                        "names": [{"first_name": "Ann", "last_name": "Lee"}],
                        "best_location": location("1 First St", "Firstville", None, "RoofTop")
                    },
                    {
                        "id": {"type": "Person"},
                        "names": [{"first_name": "Zed", "last_name": "Zee"}],
                        "best_location": location("2 Second St", "Secondville", None, "RoofTop")
                    }
                ]
            }]
        }));
        assert_eq!(contacts[0].firstname.as_deref(), Some("Ann"));
        assert_eq!(contacts[0].city.as_deref(), Some("Firstville"));
    }

    #[test]
    fn test_partial_name_upgraded_by_later_entity() {
        let contacts = parse(json!({
            "results": [{
                "belongs_to": [
                    {"id": {"type": "Person"}, "names": [{"first_name": "Ann"}]},
                    {
                        "id": {"type": "Person"},
                        "names": [{"first_name": "Zed", "last_name": "Zee"}],
                        "best_location": location("2 Second St", "Secondville", None, "RoofTop")
                    }
                ]
            }]
        }));
        assert_eq!(contacts[0].firstname.as_deref(), Some("Zed"));
        assert_eq!(contacts[0].lastname.as_deref(), Some("Zee"));
        assert_eq!(contacts[0].city.as_deref(), Some("Secondville"));
    }

    #[test]
    fn test_one_contact_per_result() {
        let contacts = parse(json!({
            "results": [
                {"belongs_to": [{"id": {"type": "Business"}, "name": "A"}]},
                {"belongs_to": [{"id": {"type": "Business"}, "name": "B"}]}
            ]
        }));
        let names: Vec<_> = contacts.iter().map(|c| c.lastname.clone().unwrap()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_empty_and_malformed_responses() {
        assert!(matches!(
            parse_phone_response(r#"{"results": []}"#),
            Err(ProviderError::ZeroResults)
        ));
        assert!(matches!(
            parse_phone_response("{not json"),
            Err(ProviderError::Parse(_))
        ));
        assert!(matches!(
            parse_phone_response(r#"{"messages": []}"#),
            Err(ProviderError::Parse(_))
        ));
    }

    #[test]
    fn test_config_validation() {
        let err = WhitePages::new(WhitePagesConfig {
            api_key: "  ".into(),
            base_url: default_base_url(),
        })
        .err()
        .unwrap();
        assert!(matches!(err, RegistryError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_lookdown_is_unsupported() {
        let provider = WhitePages::new(WhitePagesConfig {
            api_key: "1234".into(),
            base_url: default_base_url(),
        })
        .unwrap();
        let err = provider.lookdown(&AddressParts::default()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unsupported { .. }));
        assert_eq!(err.kind(), "unsupported");
    }
}
