use crate::app::handlers;
use crate::app::http_metrics::track_metrics;
use crate::app::AppState;
use crate::utils::error::SetupResult;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/api/v1/loyalty-cards",
            get(handlers::read_card).post(handlers::create_card),
        )
        .route(
            "/api/v1/companies/{company_id}/loyalty-config",
            post(handlers::configure_program),
        );

    if let Some(exporter) = state.metrics.clone() {
        let path = exporter.path.clone();
        // Layer first so scrapes of the exporter route are not counted.
        router = router
            .route_layer(middleware::from_fn(track_metrics))
            .route(
                &path,
                get(move || {
                    let exporter = exporter.clone();
                    async move { exporter.render() }
                }),
            );
    }

    router.with_state(state)
}

/// Binds `addr` and serves until Ctrl-C or SIGTERM, then drains for at most `drain_timeout`.
pub async fn serve(addr: SocketAddr, state: AppState, drain_timeout: Duration) -> SetupResult<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on {}", listener.local_addr()?);
    serve_with_shutdown(listener, state, shutdown_signal(), drain_timeout).await
}

/// Serves on an already bound listener until `shutdown` resolves. In-flight requests
/// get `drain_timeout` to finish; whatever is still open after that is abandoned.
pub async fn serve_with_shutdown<S>(
    listener: TcpListener,
    state: AppState,
    shutdown: S,
    drain_timeout: Duration,
) -> SetupResult<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let (draining_tx, draining_rx) = oneshot::channel::<()>();
    let signal = async move {
        shutdown.await;
        let _ = draining_tx.send(());
    };

    let server = axum::serve(listener, router(state))
        .with_graceful_shutdown(signal)
        .into_future();
    let mut server = std::pin::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        Ok(()) = draining_rx => {
            match tokio::time::timeout(drain_timeout, &mut server).await {
                Ok(result) => result?,
                Err(_) => tracing::warn!(
                    "Open connections still busy after {:?}, forcing shutdown",
                    drain_timeout
                ),
            }
        }
    }

    tracing::info!("HTTP server stopped");
    Ok(())
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
