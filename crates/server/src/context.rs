use phone_append_metrics::MetricsCollector;
use phone_append_providers::LookupProvider;
use std::sync::Arc;

use crate::ServerError;

/// Shared secret pair every request must present
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    sid: String,
    token: String,
}

impl Credentials {
    pub fn new(sid: impl Into<String>, token: impl Into<String>) -> Result<Self, ServerError> {
        let sid = sid.into();
        let token = token.into();
        if sid.trim().is_empty() || token.trim().is_empty() {
            return Err(ServerError::Context(
                "sid and token must both be set".to_string(),
            ));
        }
        Ok(Self { sid, token })
    }

    pub fn matches(&self, sid: &str, token: &str) -> bool {
        self.sid == sid && self.token == token
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("sid", &self.sid)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Everything a request handler needs, built once at startup
pub struct ServiceContext {
    pub credentials: Credentials,
    pub vendors: Vec<Arc<dyn LookupProvider>>,
    pub metrics: MetricsCollector,
}

impl ServiceContext {
    pub fn new(credentials: Credentials, vendors: Vec<Arc<dyn LookupProvider>>) -> Self {
        Self {
            credentials,
            vendors,
            metrics: MetricsCollector::new(),
        }
    }

    pub fn vendor_identities(&self) -> Vec<&str> {
        self.vendors.iter().map(|v| v.identity()).collect()
    }
}
