use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{AddressParts, GeocodeResult};

/// A normalized contact produced by a lookup provider.
///
/// Every field is optional and omitted from the serialized form when absent.
/// Absent means the provider had no opinion; `Some(String::new())` means the
/// provider explicitly reported an empty value.
///
/// Contacts loaded from a dataset remember keys stored as `null` (and an
/// explicit `"geocoded": false`) so an untouched contact is written back
/// exactly as it was read.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,

    /// Primary address line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Postal code, either `"12345"` or `"12345-6789"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Set once a geocoding attempt has been made, successful or not
    #[serde(default, skip_serializing_if = "is_false")]
    pub geocoded: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_addr: Option<String>,

    /// Provider-specific accuracy label (e.g. "RoofTop", "ROOFTOP")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_accuracy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linetype: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restricted: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startdate: Option<String>,

    /// Fields this crate does not interpret, carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Keys read as `null` or `false`, restored on write while still unset
    #[serde(skip)]
    pub loaded_blanks: Map<String, Value>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_blank(key: &str, value: &Value) -> bool {
    value.is_null() || (key == "geocoded" && value == &Value::Bool(false))
}

impl Serialize for Contact {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut value =
            Contact::serialize(self, serde_json::value::Serializer).map_err(ser::Error::custom)?;
        if let Value::Object(fields) = &mut value {
            for (key, blank) in &self.loaded_blanks {
                fields.entry(key.clone()).or_insert_with(|| blank.clone());
            }
        }
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Contact {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        let blank_keys: Vec<String> = fields
            .iter()
            .filter(|(key, value)| is_blank(key, value))
            .map(|(key, _)| key.clone())
            .collect();

        let mut loaded_blanks = Map::new();
        for key in blank_keys {
            if let Some(value) = fields.remove(&key) {
                loaded_blanks.insert(key, value);
            }
        }

        let mut contact = Contact::deserialize(Value::Object(fields)).map_err(de::Error::custom)?;
        contact.loaded_blanks = loaded_blanks;
        Ok(contact)
    }
}

impl Contact {
    /// Contact with only name fields set
    pub fn named(firstname: Option<String>, lastname: Option<String>) -> Self {
        Self {
            firstname,
            lastname,
            ..Default::default()
        }
    }

    /// Whether the geocoding pass should visit this contact
    pub fn needs_geocoding(&self) -> bool {
        self.state.is_some() && !self.geocoded
    }

    /// Address fields in the shape geocoders accept
    pub fn address_parts(&self) -> AddressParts {
        AddressParts {
            line1: self.address.clone(),
            line2: self.line2.clone(),
            city: self.city.clone(),
            region: self.state.clone(),
            country: self.country.clone(),
            postal_code: self.zip.clone(),
        }
    }

    /// Copy a successful geocode onto the contact. Failed results leave it untouched.
    pub fn apply_geocode(&mut self, result: &GeocodeResult) {
        if !result.success {
            return;
        }
        self.formatted_addr = result.formatted.clone();
        self.geo_accuracy = result.accuracy.clone();
        self.latitude = result.latitude;
        self.longitude = result.longitude;
    }
}
