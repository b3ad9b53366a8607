//! Metrics and logging for phone-append
//!
//! # Features
//!
//! - Prometheus counters for lookup attempts, provider outcomes, geocoding and checkpoints
//! - `/metrics` and `/health` routes for scraping
//! - Tracing initialisation with run correlation IDs
//!
//! # Example
//!
//! ```no_run
//! use phone_append_metrics::{init_tracing, MetricsCollector};
//!
//! init_tracing("info", false).unwrap();
//! let collector = MetricsCollector::new();
//! collector.record_lookup_attempt("WhitePages");
//! println!("{}", collector.export_metrics().unwrap());
//! ```

pub mod collector;
pub mod http;
pub mod metrics;
pub mod tracing;

pub use collector::{MetricsCollector, MetricsError, OUTCOME_SUCCESS};
pub use http::metrics_router;
pub use self::tracing::{init_tracing, RunId, TracingError};
