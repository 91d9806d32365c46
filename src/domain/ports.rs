use crate::domain::company::Company;
use crate::domain::model::{
    LoyaltyCard, LoyaltyCardUpdate, LoyaltyConfig, LoyaltyConfigUpdate, NewLoyaltyCard,
    NewLoyaltyConfig,
};
use crate::domain::views::{
    ConfigureLoyaltyRequest, CreateLoyaltyCardRequest, LoyaltyCardView, LoyaltyConfigView,
};
use crate::utils::error::{LookupError, Result, StoreResult};
use async_trait::async_trait;

/// Persistence for loyalty cards. `create` must reject a second card for the same
/// (user, company) pair atomically with `StoreError::AlreadyExists`.
#[async_trait]
pub trait CardStore: Send + Sync {
    async fn get_by_user_and_company(&self, user_id: i64, company_id: i64)
        -> StoreResult<LoyaltyCard>;
    async fn create(&self, card: NewLoyaltyCard) -> StoreResult<LoyaltyCard>;
    async fn update(&self, update: LoyaltyCardUpdate) -> StoreResult<LoyaltyCard>;
}

/// Persistence for program configurations. `create` must reject a second config for
/// the same company atomically with `StoreError::AlreadyExists`.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get_by_company_id(&self, company_id: i64) -> StoreResult<LoyaltyConfig>;
    async fn create(&self, config: NewLoyaltyConfig) -> StoreResult<LoyaltyConfig>;
    async fn update(&self, update: LoyaltyConfigUpdate) -> StoreResult<LoyaltyConfig>;
}

/// Source of company records used to authorize program changes.
#[async_trait]
pub trait CompanyDirectory: Send + Sync {
    async fn get_company(&self, company_id: i64) -> std::result::Result<Company, LookupError>;
}

/// Operations exposed to the transport layer.
#[async_trait]
pub trait LoyaltyOperations: Send + Sync {
    async fn read_card(&self, user_id: i64, company_id: i64) -> Result<LoyaltyCardView>;
    async fn create_card(&self, request: &CreateLoyaltyCardRequest) -> Result<LoyaltyCardView>;
    async fn configure_program(
        &self,
        company_id: i64,
        acting_user_id: i64,
        request: &ConfigureLoyaltyRequest,
    ) -> Result<LoyaltyConfigView>;
}
