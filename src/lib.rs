pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::http::SellerServiceClient;
pub use crate::adapters::storage::{InMemoryCardStore, InMemoryConfigStore};
pub use crate::app::AppState;
#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::ServiceConfig;
pub use crate::core::loyalty::LoyaltyService;
pub use crate::utils::error::{LoyaltyError, Result};
