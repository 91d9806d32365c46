pub mod handlers;
pub mod http_metrics;
pub mod response;
pub mod router;

use crate::core::LoyaltyOperations;
use std::sync::Arc;
use std::time::Duration;

/// Shared handler state. The orchestrator is held behind the operations trait so the
/// transport does not depend on the concrete store or directory types.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn LoyaltyOperations>,
    pub request_timeout: Duration,
    pub metrics: Option<http_metrics::MetricsExporter>,
}

impl AppState {
    pub fn new(service: Arc<dyn LoyaltyOperations>, request_timeout: Duration) -> Self {
        Self {
            service,
            request_timeout,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, exporter: http_metrics::MetricsExporter) -> Self {
        self.metrics = Some(exporter);
        self
    }
}

pub use http_metrics::MetricsExporter;
pub use router::{router, serve, serve_with_shutdown, shutdown_signal};
