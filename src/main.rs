use anyhow::Context;
use clap::Parser;
use loyalty_service::app::{self, AppState, MetricsExporter};
use loyalty_service::utils::{logger, validation::Validate};
use loyalty_service::{
    CliConfig, InMemoryCardStore, InMemoryConfigStore, LoyaltyService, SellerServiceClient,
    ServiceConfig,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let mut config = match ServiceConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };
    cli.apply_overrides(&mut config);

    // 初始化日誌
    logger::init_logger(&config.logs);

    tracing::info!("Starting loyalty-service");
    tracing::debug!("Service config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let directory =
        SellerServiceClient::new(&config.seller_service.base_url, config.seller_timeout())
            .context("failed to build seller service client")?;
    tracing::info!("Seller service at {}", directory.base_url());

    let service = LoyaltyService::new(
        InMemoryCardStore::new(),
        InMemoryConfigStore::new(),
        directory,
    );
    let mut state = AppState::new(Arc::new(service), config.request_timeout());

    let mut upkeep = None;
    if config.metrics.enabled {
        let exporter = MetricsExporter::install(&config.metrics.path);
        upkeep = Some(exporter.spawn_upkeep(Duration::from_secs(5)));
        tracing::info!("📊 Prometheus metrics exposed at {}", config.metrics.path);
        state = state.with_metrics(exporter);
    }

    let addr = config.listen_addr()?;
    app::serve(addr, state, config.shutdown_timeout())
        .await
        .with_context(|| format!("HTTP server on {} failed", addr))?;

    if let Some(upkeep) = upkeep {
        upkeep.abort();
    }

    tracing::info!("✅ loyalty-service shut down cleanly");
    Ok(())
}
