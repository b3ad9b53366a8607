//! PacificEast SOAP services: reverse phone lookup and RAD (name/address) lookdown.

use async_trait::async_trait;
use phone_append_types::{AddressParts, Contact};
use quick_xml::escape::escape;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::xml::{Element, SOAP_ENVELOPE_NS};
use crate::{LookupProvider, ProviderError, RegistryError};

pub const CUSTOM_NS: &str = "http://pacificeast.com/custom";
pub const FLEXI_QUERY_NS: &str = "http://pacificeast.com/";
pub const FLEXI_QUERY_DATA_NS: &str = "http://schemas.datacontract.org/2004/07/PE.RealTime.FlexiQuery";

const REVERSE_PHONE_PATH: &str = "/Services/Custom/2527/1_0/PECustomXML.svc";
const REVERSE_PHONE_ACTION: &str = "http://pacificeast.com/custom/ReversePhoneLookup";
const RAD_PATH: &str = "/Services/FlexiQuery/1_0/FlexiQuery.svc";
const RAD_ACTION: &str = "http://pacificeast.com/IFlexiQuery/GetResponse";
const CONTENT_TYPE: &str = "text/xml; charset=utf-8";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacificEastEnv {
    Dev,
    Prod,
}

impl PacificEastEnv {
    pub fn host(&self) -> &'static str {
        match self {
            PacificEastEnv::Dev => "https://dev.pacificeast.com",
            PacificEastEnv::Prod => "https://secure.pacificeast.com",
        }
    }
}

/// Which slice of the directory a reverse lookup searches
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    Public,
    #[default]
    Restricted,
}

impl QueryMode {
    fn query_type(&self) -> &'static str {
        match self {
            QueryMode::Public => "PublicOnly",
            QueryMode::Restricted => "RestrictedOnly",
        }
    }

    fn identity(&self) -> &'static str {
        match self {
            QueryMode::Public => "PacificEast-public",
            QueryMode::Restricted => "PacificEast-restricted",
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PacificEastConfig {
    pub account_id: String,
    pub env: PacificEastEnv,
    #[serde(default)]
    pub mode: QueryMode,
    /// Overrides the environment host, e.g. for a local stub
    #[serde(default)]
    pub base_url: Option<String>,
}

pub struct PacificEast {
    config: PacificEastConfig,
    client: Client,
}

impl PacificEast {
    pub fn new(config: PacificEastConfig) -> Result<Self, RegistryError> {
        if config.account_id.trim().is_empty() {
            return Err(RegistryError::configuration("pacificeast", "account_id must not be empty"));
        }
        Ok(Self {
            config,
            client: Client::new(),
        })
    }

    fn host(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.config.env.host())
    }

    pub fn reverse_phone_url(&self) -> String {
        format!("{}{}", self.host().trim_end_matches('/'), REVERSE_PHONE_PATH)
    }

    pub fn rad_url(&self) -> String {
        format!("{}{}", self.host().trim_end_matches('/'), RAD_PATH)
    }

    async fn post(&self, url: &str, action: &str, envelope: String) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", CONTENT_TYPE)
            .header("SOAPAction", action)
            .body(envelope)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Network(format!(
                "PacificEast returned status {status}"
            )));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl LookupProvider for PacificEast {
    fn identity(&self) -> &str {
        self.config.mode.identity()
    }

    async fn lookup(&self, number: &str) -> Result<Vec<Contact>, ProviderError> {
        let envelope = reverse_phone_envelope(&self.config.account_id, number, self.config.mode);
        let body = self
            .post(&self.reverse_phone_url(), REVERSE_PHONE_ACTION, envelope)
            .await?;
        debug!(number, provider = self.identity(), bytes = body.len(), "Parsing reverse phone response");
        parse_reverse_phone(&body)
    }

    async fn lookdown(&self, address: &AddressParts) -> Result<Vec<Contact>, ProviderError> {
        let envelope = rad_envelope(&self.config.account_id, address);
        let body = self.post(&self.rad_url(), RAD_ACTION, envelope).await?;
        debug!(provider = self.identity(), bytes = body.len(), "Parsing RAD response");
        parse_rad(&body)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// REQUEST ENVELOPES
// ═══════════════════════════════════════════════════════════════════════════

pub fn reverse_phone_envelope(account_id: &str, number: &str, mode: QueryMode) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soapenv:Envelope xmlns:soapenv="{SOAP_ENVELOPE_NS}" xmlns:cus="{CUSTOM_NS}">
  <soapenv:Header/>
  <soapenv:Body>
    <cus:ReversePhoneLookup>
      <cus:accountID>{account}</cus:accountID>
      <cus:phoneNumber>{number}</cus:phoneNumber>
      <cus:queryType>{query_type}</cus:queryType>
    </cus:ReversePhoneLookup>
  </soapenv:Body>
</soapenv:Envelope>"#,
        account = escape(account_id),
        number = escape(number),
        query_type = mode.query_type(),
    )
}

pub fn rad_envelope(account_id: &str, address: &AddressParts) -> String {
    let field = |value: &Option<String>| escape(value.as_deref().unwrap_or_default()).into_owned();
    let street = match (&address.line1, &address.line2) {
        (Some(line1), Some(line2)) if !line2.is_empty() => Some(format!("{line1} {line2}")),
        (line1, _) => line1.clone(),
    };

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soapenv:Envelope xmlns:soapenv="{SOAP_ENVELOPE_NS}" xmlns:pac="{FLEXI_QUERY_NS}" xmlns:pe="{FLEXI_QUERY_DATA_NS}">
  <soapenv:Header/>
  <soapenv:Body>
    <pac:GetResponse>
      <pac:request>
        <pe:AccountID>{account}</pe:AccountID>
        <pe:Address>{street}</pe:Address>
        <pe:City>{city}</pe:City>
        <pe:Country>{country}</pe:Country>
        <pe:Postal>{postal}</pe:Postal>
        <pe:QueryType>RAD</pe:QueryType>
        <pe:State>{state}</pe:State>
      </pac:request>
    </pac:GetResponse>
  </soapenv:Body>
</soapenv:Envelope>"#,
        account = escape(account_id),
        street = field(&street),
        city = field(&address.city),
        country = field(&address.country),
        postal = field(&address.postal_code),
        state = field(&address.region),
    )
}

// ═══════════════════════════════════════════════════════════════════════════
// RESPONSE PARSING
// ═══════════════════════════════════════════════════════════════════════════

/// Parse a ReversePhoneLookup response. Fields missing from a contact node
/// stay absent on the resulting contact.
pub fn parse_reverse_phone(body: &str) -> Result<Vec<Contact>, ProviderError> {
    let root = Element::parse(body)?;
    let result = root
        .find(&[
            (SOAP_ENVELOPE_NS, "Body"),
            (CUSTOM_NS, "ReversePhoneLookupResponse"),
            (CUSTOM_NS, "ReversePhoneLookupResult"),
        ])
        .ok_or_else(|| ProviderError::Parse("missing ReversePhoneLookupResult".into()))?;

    let found = result
        .child_text(CUSTOM_NS, "ContactsFound")
        .ok_or_else(|| ProviderError::Parse("missing ContactsFound".into()))?;
    if found.trim() == "0" {
        return Err(ProviderError::ZeroResults);
    }

    let contacts: Vec<Contact> = result
        .child(CUSTOM_NS, "Contacts")
        .into_iter()
        .flat_map(|c| c.children_named(CUSTOM_NS, "Contact"))
        .map(reverse_phone_contact)
        .collect();

    if contacts.is_empty() {
        return Err(ProviderError::Parse(format!(
            "ContactsFound is {found} but no Contact nodes were returned"
        )));
    }
    Ok(contacts)
}

fn reverse_phone_contact(node: &Element) -> Contact {
    let text = |name: &str| node.child_text(CUSTOM_NS, name);
    Contact {
        firstname: text("FirstName"),
        lastname: text("LastName"),
        address: text("Address"),
        city: text("City"),
        state: text("State"),
        zip: text("Postal"),
        country: text("Country"),
        startdate: text("StartDate"),
        ..Default::default()
    }
}

/// Parse a FlexiQuery GetResponse carrying RAD listings
pub fn parse_rad(body: &str) -> Result<Vec<Contact>, ProviderError> {
    let root = Element::parse(body)?;
    let result = root
        .find(&[
            (SOAP_ENVELOPE_NS, "Body"),
            (FLEXI_QUERY_NS, "GetResponseResponse"),
            (FLEXI_QUERY_NS, "GetResponseResult"),
        ])
        .ok_or_else(|| ProviderError::Parse("missing GetResponseResult".into()))?;

    let listing_info = match result.child(FLEXI_QUERY_DATA_NS, "ListingInfo") {
        Some(info) if !info.nil => info,
        _ => return Err(ProviderError::ZeroResults),
    };
    if listing_info
        .child_text(FLEXI_QUERY_DATA_NS, "ListingsFound")
        .is_some_and(|found| found.trim() == "0")
    {
        return Err(ProviderError::ZeroResults);
    }

    let listings: Vec<&Element> = listing_info
        .child(FLEXI_QUERY_DATA_NS, "Listings")
        .into_iter()
        .flat_map(|l| l.children_named(FLEXI_QUERY_DATA_NS, "Listing"))
        .collect();
    if listings.is_empty() {
        return Err(ProviderError::ZeroResults);
    }

    listings.into_iter().map(rad_contact).collect()
}

fn rad_contact(node: &Element) -> Result<Contact, ProviderError> {
    let text = |name: &str| node.child_text(FLEXI_QUERY_DATA_NS, name);

    let restricted = match text("RestrictedData").as_deref().map(str::trim) {
        None | Some("") => None,
        Some("true") => Some(true),
        Some("false") => Some(false),
        Some(other) => {
            return Err(ProviderError::Parse(format!(
                "unexpected RestrictedData value {other:?}"
            )))
        }
    };

    Ok(Contact {
        firstname: text("FirstName"),
        lastname: text("LastName"),
        address: text("Address"),
        city: text("City"),
        state: text("State"),
        zip: text("Postal"),
        country: text("Country"),
        carrier: text("Carrier"),
        phone: text("Phone"),
        linetype: text("PhoneServiceType").map(|t| t.to_lowercase()),
        restricted,
        ..Default::default()
    })
}
