//! Prometheus metrics (lock-free atomics, zero allocation on hot path).

use std::sync::atomic::{AtomicU64, Ordering};

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Traffic ---
    pub requests_total: AtomicU64,
    pub tx_submitted: AtomicU64,
    pub tx_success: AtomicU64,
    pub tx_error: AtomicU64,

    // --- Uploads ---
    pub uploads_total: AtomicU64,
    pub upload_errors: AtomicU64,

    // --- RPC ---
    pub rpc_errors: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            tx_submitted: AtomicU64::new(0),
            tx_success: AtomicU64::new(0),
            tx_error: AtomicU64::new(0),
            uploads_total: AtomicU64::new(0),
            upload_errors: AtomicU64::new(0),
            rpc_errors: AtomicU64::new(0),
        }
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let tx_submitted = self.tx_submitted.load(Ordering::Relaxed);
        let tx_success = self.tx_success.load(Ordering::Relaxed);
        let tx_error = self.tx_error.load(Ordering::Relaxed);
        let uploads = self.uploads_total.load(Ordering::Relaxed);
        let upload_errors = self.upload_errors.load(Ordering::Relaxed);
        let rpc_errors = self.rpc_errors.load(Ordering::Relaxed);

        format!(
            "\
# HELP gateway_requests_total Total API requests received.\n\
# TYPE gateway_requests_total counter\n\
gateway_requests_total {requests}\n\
# HELP gateway_tx_submitted_total Signed envelopes submitted to the network.\n\
# TYPE gateway_tx_submitted_total counter\n\
gateway_tx_submitted_total {tx_submitted}\n\
# HELP gateway_tx_success_total Transactions confirmed with a success status.\n\
# TYPE gateway_tx_success_total counter\n\
gateway_tx_success_total {tx_success}\n\
# HELP gateway_tx_error_total Transactions that failed at any pipeline stage.\n\
# TYPE gateway_tx_error_total counter\n\
gateway_tx_error_total {tx_error}\n\
# HELP gateway_uploads_total Files pinned via the upload endpoint.\n\
# TYPE gateway_uploads_total counter\n\
gateway_uploads_total {uploads}\n\
# HELP gateway_upload_errors_total Failed upload requests.\n\
# TYPE gateway_upload_errors_total counter\n\
gateway_upload_errors_total {upload_errors}\n\
# HELP gateway_rpc_errors_total Soroban RPC errors.\n\
# TYPE gateway_rpc_errors_total counter\n\
gateway_rpc_errors_total {rpc_errors}\n"
        )
    }
}
