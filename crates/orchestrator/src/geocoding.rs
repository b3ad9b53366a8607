use phone_append_metrics::{MetricsCollector, OUTCOME_SUCCESS};
use phone_append_providers::Geocoder;
use phone_append_ratelimit::RateLimiter;
use phone_append_types::{GeocodeResult, NumberRecord};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{Checkpointer, ConfirmGate, Decision, PassError, RunAll};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeocodePassSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Attaches coordinates to every contact that has a region and has never
/// been geocoded. Each contact gets at most one attempt, ever.
pub struct GeocodingPass {
    geocoder: Arc<dyn Geocoder>,
    limiter: RateLimiter,
    gate: Arc<dyn ConfirmGate>,
    metrics: MetricsCollector,
}

impl GeocodingPass {
    pub fn new(geocoder: Arc<dyn Geocoder>, pause: Duration) -> Self {
        let limiter = RateLimiter::new().with_min_interval(geocoder.identity(), pause);
        Self {
            geocoder,
            limiter,
            gate: Arc::new(RunAll),
            metrics: MetricsCollector::new(),
        }
    }

    /// Ask `gate` before every geocoder call. Without one the pass never asks.
    pub fn with_gate(mut self, gate: Arc<dyn ConfirmGate>) -> Self {
        self.gate = gate;
        self
    }

    pub async fn run(
        &self,
        records: &mut [NumberRecord],
        checkpointer: &mut Checkpointer,
    ) -> Result<GeocodePassSummary, PassError> {
        let identity = self.geocoder.identity();
        let mut summary = GeocodePassSummary::default();
        info!(geocoder = identity, records = records.len(), "Starting geocoding pass");

        for index in 0..records.len() {
            for slot in 0..records[index].contacts.len() {
                if !records[index].contacts[slot].needs_geocoding() {
                    continue;
                }

                let number = &records[index].number;
                if self.gate.confirm("Geocode", number, identity).await == Decision::Abort {
                    let number = number.clone();
                    checkpointer.checkpoint(records).await?;
                    return Err(PassError::Aborted {
                        number,
                        provider: identity.to_string(),
                    });
                }
                let record = &mut records[index];
                let contact = &mut record.contacts[slot];

                // marked before the call so a crash mid-call never causes a retry
                contact.geocoded = true;
                let address = contact.address_parts();

                self.limiter.acquire(identity).await;
                summary.attempted += 1;
                debug!(number = %record.number, geocoder = identity, "Geocoding contact");

                let result = match self.geocoder.geocode(&address).await {
                    Ok(location) => {
                        summary.succeeded += 1;
                        self.metrics.record_geocode_outcome(identity, OUTCOME_SUCCESS);
                        GeocodeResult::from(location)
                    }
                    Err(e) => {
                        summary.failed += 1;
                        self.metrics.record_geocode_outcome(identity, e.kind());
                        warn!(
                            number = %record.number,
                            geocoder = identity,
                            error_kind = e.kind(),
                            error = %e,
                            "Geocoding failed"
                        );
                        GeocodeResult::failed()
                    }
                };
                contact.apply_geocode(&result);

                checkpointer.checkpoint(records).await?;
            }
        }

        checkpointer.checkpoint(records).await?;
        info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Geocoding pass complete"
        );
        Ok(summary)
    }
}
