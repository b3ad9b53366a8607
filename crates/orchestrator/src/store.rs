use async_trait::async_trait;
use phone_append_types::NumberRecord;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::StoreError;

/// Where the dataset lives between runs. Always read and written whole.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    async fn load(&self) -> Result<Vec<NumberRecord>, StoreError>;

    async fn save(&self, records: &[NumberRecord]) -> Result<(), StoreError>;
}

// ═══════════════════════════════════════════════════════════════════════════
// JSON FILE
// ═══════════════════════════════════════════════════════════════════════════

/// A pretty-printed JSON array on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl DatasetStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<NumberRecord>, StoreError> {
        let bytes = fs::read(&self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        let records: Vec<NumberRecord> = serde_json::from_slice(&bytes)?;
        debug!(path = %self.path.display(), records = records.len(), "Loaded dataset");
        Ok(records)
    }

    async fn save(&self, records: &[NumberRecord]) -> Result<(), StoreError> {
        let mut bytes = serde_json::to_vec_pretty(records)?;
        bytes.push(b'\n');

        // Atomic write: tmp file + rename
        let tmp_path = self.tmp_path();
        {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp_path)
                .await
                .map_err(|e| StoreError::io(&tmp_path, e))?;

            file.write_all(&bytes)
                .await
                .map_err(|e| StoreError::io(&tmp_path, e))?;

            file.sync_all()
                .await
                .map_err(|e| StoreError::io(&tmp_path, e))?;
        }

        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        debug!(path = %self.path.display(), records = records.len(), "Saved dataset");
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// IN MEMORY
// ═══════════════════════════════════════════════════════════════════════════

/// Keeps every saved snapshot so callers can inspect checkpoint history
#[derive(Debug, Default)]
pub struct InMemoryStore {
    initial: Vec<NumberRecord>,
    snapshots: Mutex<Vec<Vec<NumberRecord>>>,
}

impl InMemoryStore {
    pub fn new(initial: Vec<NumberRecord>) -> Self {
        Self {
            initial,
            snapshots: Mutex::new(Vec::new()),
        }
    }

    pub fn snapshots(&self) -> Vec<Vec<NumberRecord>> {
        self.snapshots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn save_count(&self) -> usize {
        self.snapshots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[async_trait]
impl DatasetStore for InMemoryStore {
    async fn load(&self) -> Result<Vec<NumberRecord>, StoreError> {
        let snapshots = self
            .snapshots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(snapshots.last().unwrap_or(&self.initial).clone())
    }

    async fn save(&self, records: &[NumberRecord]) -> Result<(), StoreError> {
        self.snapshots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(records.to_vec());
        Ok(())
    }
}
