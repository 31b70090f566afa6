//! # Validator Set Metrics
//!
//! Prometheus metrics for committee churn and punishment.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qc-18-validator-set = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `validator_set_admissions_total` - Candidates that gained a seat
//! - `validator_set_evictions_total` - Members displaced by a stronger candidate
//! - `validator_set_removals_total` - Members removed (by reason)
//! - `validator_set_punishments_total` - Punishments applied (by reason)
//! - `validator_set_delta_size` - Entries per committee delta
//! - `validator_set_unknown_keys_total` - Hook inputs naming no validator

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref ADMISSIONS: IntCounter = register_int_counter!(
        "validator_set_admissions_total",
        "Total number of candidates admitted to the committee"
    )
    .expect("Failed to create ADMISSIONS metric");

    pub static ref EVICTIONS: IntCounter = register_int_counter!(
        "validator_set_evictions_total",
        "Total number of committee members displaced by admission"
    )
    .expect("Failed to create EVICTIONS metric");

    pub static ref REMOVALS: IntCounterVec = register_int_counter_vec!(
        "validator_set_removals_total",
        "Total number of validators removed from active membership",
        &["reason"]
    )
    .expect("Failed to create REMOVALS metric");

    pub static ref PUNISHMENTS: IntCounterVec = register_int_counter_vec!(
        "validator_set_punishments_total",
        "Total number of punishments applied",
        &["reason"]
    )
    .expect("Failed to create PUNISHMENTS metric");

    pub static ref DELTA_SIZE: Histogram = register_histogram!(
        "validator_set_delta_size",
        "Number of entries in each committee delta",
        vec![0.0, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0]
    )
    .expect("Failed to create DELTA_SIZE metric");

    pub static ref UNKNOWN_KEYS: IntCounter = register_int_counter!(
        "validator_set_unknown_keys_total",
        "Total number of consensus keys in hook input with no validator"
    )
    .expect("Failed to create UNKNOWN_KEYS metric");
}

#[cfg(feature = "metrics")]
pub fn record_admission() {
    ADMISSIONS.inc();
}

#[cfg(feature = "metrics")]
pub fn record_eviction() {
    EVICTIONS.inc();
}

#[cfg(feature = "metrics")]
pub fn record_removal(reason: &str) {
    REMOVALS.with_label_values(&[reason]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_punishment(reason: &str) {
    PUNISHMENTS.with_label_values(&[reason]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_delta_size(entries: usize) {
    DELTA_SIZE.observe(entries as f64);
}

#[cfg(feature = "metrics")]
pub fn record_unknown_consensus_key() {
    UNKNOWN_KEYS.inc();
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_admission() {}

#[cfg(not(feature = "metrics"))]
pub fn record_eviction() {}

#[cfg(not(feature = "metrics"))]
pub fn record_removal(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_punishment(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_delta_size(_entries: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_unknown_consensus_key() {}
