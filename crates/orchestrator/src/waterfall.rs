use phone_append_metrics::{MetricsCollector, OUTCOME_SUCCESS};
use phone_append_providers::{LookupProvider, ProviderError};
use phone_append_types::NumberRecord;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::{Checkpointer, ConfirmGate, Decision, PassError};

/// Successes between mid-pass checkpoints unless configured otherwise
pub const DEFAULT_CHECKPOINT_EVERY: usize = 10;

/// Counts for one lookup pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupPassSummary {
    /// Records that already had a vendor before the pass
    pub already_resolved: usize,
    /// Records resolved during this pass
    pub resolved: usize,
    /// Records every configured provider has now failed
    pub exhausted: usize,
    /// Provider calls made
    pub attempts: usize,
}

enum RecordOutcome {
    AlreadyResolved,
    Resolved,
    Exhausted,
    Declined { provider: String },
}

/// Tries providers in a fixed order until one resolves a number.
///
/// A provider is never asked twice about the same number: its identity goes
/// into `vendors_checked` as soon as it has been called, whatever the result.
pub struct WaterfallOrchestrator {
    providers: Vec<Arc<dyn LookupProvider>>,
    gate: Arc<dyn ConfirmGate>,
    checkpoint_every: usize,
    metrics: MetricsCollector,
}

impl WaterfallOrchestrator {
    pub fn new(providers: Vec<Arc<dyn LookupProvider>>, gate: Arc<dyn ConfirmGate>) -> Self {
        Self {
            providers,
            gate,
            checkpoint_every: DEFAULT_CHECKPOINT_EVERY,
            metrics: MetricsCollector::new(),
        }
    }

    /// Values below one are treated as one
    pub fn with_checkpoint_every(mut self, every: usize) -> Self {
        self.checkpoint_every = every.max(1);
        self
    }

    pub fn provider_identities(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.identity()).collect()
    }

    /// Run one pass over `records`, checkpointing through `checkpointer`
    pub async fn run(
        &self,
        records: &mut [NumberRecord],
        checkpointer: &mut Checkpointer,
    ) -> Result<LookupPassSummary, PassError> {
        let mut summary = LookupPassSummary::default();
        info!(
            records = records.len(),
            providers = ?self.provider_identities(),
            "Starting lookup pass"
        );

        for index in 0..records.len() {
            match self.resolve_record(&mut records[index], &mut summary).await {
                RecordOutcome::AlreadyResolved => summary.already_resolved += 1,
                RecordOutcome::Exhausted => summary.exhausted += 1,
                RecordOutcome::Resolved => {
                    summary.resolved += 1;
                    if summary.resolved % self.checkpoint_every == 0 {
                        checkpointer.checkpoint(records).await?;
                    }
                }
                RecordOutcome::Declined { provider } => {
                    let number = records[index].number.clone();
                    checkpointer.checkpoint(records).await?;
                    return Err(PassError::Aborted { number, provider });
                }
            }
        }

        checkpointer.checkpoint(records).await?;
        info!(
            resolved = summary.resolved,
            exhausted = summary.exhausted,
            already_resolved = summary.already_resolved,
            attempts = summary.attempts,
            "Lookup pass complete"
        );
        Ok(summary)
    }

    async fn resolve_record(
        &self,
        record: &mut NumberRecord,
        summary: &mut LookupPassSummary,
    ) -> RecordOutcome {
        if record.is_resolved() {
            return RecordOutcome::AlreadyResolved;
        }

        for provider in &self.providers {
            let identity = provider.identity();
            if record.vendors_checked.contains(identity) {
                continue;
            }

            if self.gate.confirm("Lookup", &record.number, identity).await == Decision::Abort {
                return RecordOutcome::Declined {
                    provider: identity.to_string(),
                };
            }

            debug!(number = %record.number, provider = identity, "Looking up number");
            self.metrics.record_lookup_attempt(identity);
            summary.attempts += 1;

            let started = Instant::now();
            let result = match provider.lookup(&record.number).await {
                Ok(contacts) if contacts.is_empty() => Err(ProviderError::ZeroResults),
                other => other,
            };
            let elapsed = started.elapsed();
            record.vendors_checked.insert(identity);

            match result {
                Ok(contacts) => {
                    self.metrics
                        .record_lookup_outcome(identity, OUTCOME_SUCCESS, elapsed);
                    self.metrics.record_record_resolved();
                    info!(
                        number = %record.number,
                        provider = identity,
                        contacts = contacts.len(),
                        "Number resolved"
                    );
                    record.resolve(identity, contacts);
                    return RecordOutcome::Resolved;
                }
                Err(e) => {
                    self.metrics.record_lookup_outcome(identity, e.kind(), elapsed);
                    warn!(
                        number = %record.number,
                        provider = identity,
                        error_kind = e.kind(),
                        error = %e,
                        "Lookup failed"
                    );
                }
            }
        }

        debug!(number = %record.number, "Every provider has been tried");
        RecordOutcome::Exhausted
    }
}
