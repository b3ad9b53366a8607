use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

lazy_static! {
    // ═══════════════════════════════════════════════════════════════════════════
    // LOOKUP METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Reverse lookups issued, by provider identity
    pub static ref LOOKUP_ATTEMPTS: IntCounterVec = register_int_counter_vec!(
        "phone_append_lookup_attempts_total",
        "Total reverse lookups issued",
        &["provider"]
    )
    .unwrap();

    /// Lookup outcomes: success, network, parse, zero_results, unsupported
    pub static ref LOOKUP_OUTCOMES: IntCounterVec = register_int_counter_vec!(
        "phone_append_lookup_outcomes_total",
        "Reverse lookup outcomes by provider",
        &["provider", "outcome"]
    )
    .unwrap();

    pub static ref LOOKUP_LATENCY: HistogramVec = register_histogram_vec!(
        "phone_append_lookup_latency_ms",
        "Reverse lookup latency in milliseconds",
        &["provider"],
        vec![50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]
    )
    .unwrap();

    /// Records that moved to resolved
    pub static ref RECORDS_RESOLVED: IntCounter = register_int_counter!(
        "phone_append_records_resolved_total",
        "Total number records resolved by a lookup provider"
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // GEOCODING METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    pub static ref GEOCODE_OUTCOMES: IntCounterVec = register_int_counter_vec!(
        "phone_append_geocode_outcomes_total",
        "Geocoding outcomes by geocoder",
        &["geocoder", "outcome"]
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // PERSISTENCE AND SERVICE METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    pub static ref CHECKPOINTS: IntCounter = register_int_counter!(
        "phone_append_checkpoints_total",
        "Total full dataset writes"
    )
    .unwrap();

    pub static ref LOOKDOWN_REQUESTS: IntCounterVec = register_int_counter_vec!(
        "phone_append_lookdown_requests_total",
        "Forward lookup API requests by HTTP status",
        &["status"]
    )
    .unwrap();
}
