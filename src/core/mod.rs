pub mod loyalty;

pub use crate::domain::ports::{CardStore, CompanyDirectory, ConfigStore, LoyaltyOperations};
pub use crate::utils::error::Result;
