use thiserror::Error;

/// Failure of a single provider call. Never fatal to a pass.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("provider returned zero results")]
    ZeroResults,

    #[error("{provider} does not support {operation}")]
    Unsupported {
        provider: String,
        operation: &'static str,
    },
}

impl ProviderError {
    /// Stable label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Network(_) => "network",
            ProviderError::Parse(_) => "parse",
            ProviderError::ZeroResults => "zero_results",
            ProviderError::Unsupported { .. } => "unsupported",
        }
    }

    pub fn unsupported(provider: impl Into<String>, operation: &'static str) -> Self {
        ProviderError::Unsupported {
            provider: provider.into(),
            operation,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Network(err.to_string())
    }
}

/// Registry misuse or bad provider configuration. Fatal at startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown {category} provider: {name}")]
    UnknownProvider { category: String, name: String },

    #[error("{category} provider already registered: {name}")]
    DuplicateProvider { category: String, name: String },

    #[error("invalid configuration for {provider}: {reason}")]
    Configuration { provider: String, reason: String },
}

impl RegistryError {
    pub fn configuration(provider: impl Into<String>, reason: impl ToString) -> Self {
        RegistryError::Configuration {
            provider: provider.into(),
            reason: reason.to_string(),
        }
    }
}
