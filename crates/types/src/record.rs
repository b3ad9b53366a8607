use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Contact;

/// Provider identities already attempted for a record.
///
/// Insertion-ordered and duplicate-free. There is no way to remove an
/// identity once inserted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct VendorsChecked(Vec<String>);

impl VendorsChecked {
    /// Record an attempt. Returns false if the identity was already present.
    pub fn insert(&mut self, identity: impl Into<String>) -> bool {
        let identity = identity.into();
        if self.contains(&identity) {
            return false;
        }
        self.0.push(identity);
        true
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.0.iter().any(|v| v == identity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every identity in `other` is also present here
    pub fn is_superset_of(&self, other: &VendorsChecked) -> bool {
        other.iter().all(|v| self.contains(v))
    }
}

impl From<Vec<String>> for VendorsChecked {
    fn from(values: Vec<String>) -> Self {
        let mut checked = Self::default();
        for value in values {
            checked.insert(value);
        }
        checked
    }
}

impl From<VendorsChecked> for Vec<String> {
    fn from(checked: VendorsChecked) -> Self {
        checked.0
    }
}

/// One phone number and everything learned about it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumberRecord {
    pub number: String,

    /// Identity of the provider that resolved this number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,

    #[serde(default)]
    pub contacts: Vec<Contact>,

    #[serde(default)]
    pub vendors_checked: VendorsChecked,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NumberRecord {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            vendor: None,
            contacts: Vec::new(),
            vendors_checked: VendorsChecked::default(),
            extra: Map::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.vendor.is_some()
    }

    /// Mark the record resolved by `vendor`
    pub fn resolve(&mut self, vendor: impl Into<String>, contacts: Vec<Contact>) {
        self.vendor = Some(vendor.into());
        self.contacts = contacts;
    }
}
