//! Enrichment passes over a persisted dataset of phone numbers.
//!
//! The waterfall pass asks each configured lookup provider in turn until one
//! resolves a number. The geocoding pass then attaches coordinates to every
//! contact with an address. Both passes run strictly one call at a time and
//! rewrite the whole dataset at checkpoint boundaries, which is also the only
//! place an interrupt is honoured.

pub mod checkpoint;
pub mod confirm;
pub mod error;
pub mod geocoding;
pub mod store;
pub mod waterfall;


// Re-export main types
pub use checkpoint::{Checkpointer, InterruptFlag};
pub use confirm::{ConfirmGate, Decision, RunAll, StdinPrompt};
pub use error::{PassError, StoreError};
pub use geocoding::{GeocodePassSummary, GeocodingPass};
pub use store::{DatasetStore, InMemoryStore, JsonFileStore};
pub use waterfall::{LookupPassSummary, WaterfallOrchestrator, DEFAULT_CHECKPOINT_EVERY};
