use thiserror::Error;

/// Failure reading or writing the persisted dataset
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("dataset I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Reasons a pass stops before visiting every record.
///
/// Provider failures never show up here; they are absorbed by the passes.
#[derive(Debug, Error)]
pub enum PassError {
    #[error("checkpoint failed: {0}")]
    Store(#[from] StoreError),

    #[error("interrupted; dataset saved at the last checkpoint")]
    Interrupted,

    #[error("operator declined {provider} for {number}")]
    Aborted { number: String, provider: String },
}
