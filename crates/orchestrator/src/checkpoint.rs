use phone_append_metrics::MetricsCollector;
use phone_append_types::NumberRecord;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{DatasetStore, PassError};

/// Set by an external interrupt, observed only at checkpoint boundaries
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Raise this flag on Ctrl-C instead of letting the process die mid-write.
    /// Must be called from within a tokio runtime.
    pub fn install_ctrl_c_handler(&self) {
        let flag = self.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    warn!("Interrupt received; stopping at the next checkpoint");
                    flag.raise();
                }
                Err(e) => warn!(error = %e, "Unable to listen for Ctrl-C"),
            }
        });
    }
}

/// Writes the full dataset and reports a pending interrupt after the write
pub struct Checkpointer {
    store: Arc<dyn DatasetStore>,
    interrupt: InterruptFlag,
    metrics: MetricsCollector,
    writes: usize,
}

impl Checkpointer {
    pub fn new(store: Arc<dyn DatasetStore>, interrupt: InterruptFlag) -> Self {
        Self {
            store,
            interrupt,
            metrics: MetricsCollector::new(),
            writes: 0,
        }
    }

    /// Number of checkpoints written by this checkpointer
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub async fn checkpoint(&mut self, records: &[NumberRecord]) -> Result<(), PassError> {
        self.store.save(records).await?;
        self.writes += 1;
        self.metrics.record_checkpoint();

        // let a pending signal task run on a current-thread runtime
        tokio::task::yield_now().await;
        if self.interrupt.is_raised() {
            info!(checkpoints = self.writes, "Dataset saved after interrupt");
            return Err(PassError::Interrupted);
        }
        Ok(())
    }
}
