//! Prometheus counters for a submission run
//!
//! Exposes metrics for:
//! - Nonce reads
//! - Signing and broadcast
//! - Failures by error kind

use crate::error::TransferError;

use lazy_static::lazy_static;
use prometheus::{register_counter, register_counter_vec, Counter, CounterVec, Encoder, TextEncoder};

lazy_static! {
    pub static ref NONCE_FETCHES: Counter = register_counter!(
        "transfer_nonce_fetches_total",
        "Transaction count reads against the node"
    ).unwrap();

    pub static ref TX_SIGNED: Counter = register_counter!(
        "transfer_transactions_signed_total",
        "Transactions signed locally"
    ).unwrap();

    pub static ref TX_BROADCAST: Counter = register_counter!(
        "transfer_transactions_broadcast_total",
        "Transactions accepted by the node"
    ).unwrap();

    pub static ref TX_FAILED: CounterVec = register_counter_vec!(
        "transfer_failures_total",
        "Failed submissions by error kind",
        &["kind"]
    ).unwrap();
}

pub fn record_nonce_fetch() {
    NONCE_FETCHES.inc();
}

pub fn record_tx_signed() {
    TX_SIGNED.inc();
}

pub fn record_tx_broadcast() {
    TX_BROADCAST.inc();
}

pub fn record_failure(err: &TransferError) {
    TX_FAILED.with_label_values(&[err.kind()]).inc();
}

/// Render the default registry in the text exposition format
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
