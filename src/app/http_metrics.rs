use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

pub const REQUESTS_TOTAL: &str = "loyalty_http_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "loyalty_http_request_duration_seconds";

static PROMETHEUS: OnceLock<PrometheusHandle> = OnceLock::new();

/// Prometheus exporter mounted on the router when metrics are enabled.
#[derive(Clone)]
pub struct MetricsExporter {
    pub path: String,
    handle: PrometheusHandle,
}

impl MetricsExporter {
    /// Installs the process-wide recorder on first use and returns an exporter for `path`.
    pub fn install(path: impl Into<String>) -> Self {
        let handle = PROMETHEUS
            .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
                Ok(handle) => handle,
                Err(e) => {
                    // Another recorder owns the process; render an empty registry instead.
                    tracing::error!("Failed to install Prometheus recorder: {}", e);
                    PrometheusBuilder::new().build_recorder().handle()
                }
            })
            .clone();

        Self {
            path: path.into(),
            handle,
        }
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Periodically compacts histogram buckets. The task runs until aborted.
    pub fn spawn_upkeep(&self, every: Duration) -> JoinHandle<()> {
        let handle = self.handle.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                handle.run_upkeep();
            }
        })
    }
}

/// Records request count and latency per method, matched route and status.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let method = request.method().to_string();

    let response = next.run(request).await;

    let labels = [
        ("method", method),
        ("path", path),
        ("status", response.status().as_u16().to_string()),
    ];
    metrics::counter!(REQUESTS_TOTAL, &labels).increment(1);
    metrics::histogram!(REQUEST_DURATION_SECONDS, &labels).record(start.elapsed().as_secs_f64());

    response
}
