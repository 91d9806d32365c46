#[cfg(feature = "cli")]
pub mod cli;
pub mod service_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use service_config::{LogsConfig, MetricsConfig, SellerServiceConfig, ServerConfig, ServiceConfig};
