//! Prometheus metrics
//!
//! Counters for the operations worth watching: uploads, upsert row counts
//! and claim outcomes. Exposed at `/metrics`.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder. Idempotent; later calls reuse the
/// first handle (tests build several routers in one process).
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

/// Render the current metrics snapshot.
pub async fn metrics_handler() -> String {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => handle.render(),
        None => String::new(),
    }
}

/// Record a processed CSV upload.
pub fn record_upload(inserted: usize, updated: usize, skipped: usize) {
    metrics::counter!("lead_portal_uploads_total").increment(1);
    metrics::counter!("lead_portal_leads_inserted_total").increment(inserted as u64);
    metrics::counter!("lead_portal_leads_updated_total").increment(updated as u64);
    metrics::counter!("lead_portal_rows_skipped_total").increment(skipped as u64);
}

/// Record a claim attempt and its outcome.
pub fn record_claim(outcome: &str) {
    metrics::counter!("lead_portal_claims_total", "outcome" => outcome.to_string()).increment(1);
}
