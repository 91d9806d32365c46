use crate::core::{CardStore, CompanyDirectory, ConfigStore, LoyaltyOperations};
use crate::domain::model::{
    DiscountPercentage, LoyaltyConfig, LoyaltyConfigUpdate, NewLoyaltyCard, NewLoyaltyConfig,
};
use crate::domain::views::{
    ConfigureLoyaltyRequest, CreateLoyaltyCardRequest, LoyaltyCardView, LoyaltyConfigView,
};
use crate::utils::error::{LookupError, LoyaltyError, Result, StoreError};
use async_trait::async_trait;

/// Loyalty orchestrator: applies the program rules on top of the card and config stores
/// and the company directory. Holds no state of its own between calls.
pub struct LoyaltyService<C: CardStore, F: ConfigStore, D: CompanyDirectory> {
    cards: C,
    configs: F,
    directory: D,
}

impl<C: CardStore, F: ConfigStore, D: CompanyDirectory> LoyaltyService<C, F, D> {
    pub fn new(cards: C, configs: F, directory: D) -> Self {
        Self {
            cards,
            configs,
            directory,
        }
    }

    /// Fetches the company's program and refuses to proceed unless it exists and is enabled.
    async fn enabled_config(&self, company_id: i64, operation: &str) -> Result<LoyaltyConfig> {
        let config = match self.configs.get_by_company_id(company_id).await {
            Ok(config) => config,
            Err(StoreError::NotFound) => return Err(LoyaltyError::ConfigNotFound),
            Err(e) => {
                return Err(LoyaltyError::internal(
                    format!("{}: failed to get config", operation),
                    e,
                ))
            }
        };

        if !config.is_enabled {
            return Err(LoyaltyError::ConfigDisabled);
        }

        Ok(config)
    }

    async fn check_manager_access(&self, company_id: i64, user_id: i64) -> Result<()> {
        let company = match self.directory.get_company(company_id).await {
            Ok(company) => company,
            // No company means there is no program to configure.
            Err(LookupError::CompanyNotFound) => return Err(LoyaltyError::ConfigNotFound),
            Err(source) => return Err(LoyaltyError::SellerServiceUnavailable { source }),
        };

        if !company.is_managed_by(user_id) {
            return Err(LoyaltyError::AccessDenied);
        }

        Ok(())
    }
}

#[async_trait]
impl<C: CardStore, F: ConfigStore, D: CompanyDirectory> LoyaltyOperations
    for LoyaltyService<C, F, D>
{
    async fn read_card(&self, user_id: i64, company_id: i64) -> Result<LoyaltyCardView> {
        // A disabled program hides existing cards as well.
        self.enabled_config(company_id, "read_card").await?;

        let card = self
            .cards
            .get_by_user_and_company(user_id, company_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => LoyaltyError::CardNotFound,
                other => LoyaltyError::internal("read_card: card lookup failed", other),
            })?;

        tracing::debug!(user_id, company_id, card_id = card.id, "Loyalty card read");
        Ok(card.into())
    }

    async fn create_card(&self, request: &CreateLoyaltyCardRequest) -> Result<LoyaltyCardView> {
        let config = self
            .enabled_config(request.company_id, "create_card")
            .await?;

        let new_card = NewLoyaltyCard::issue(request.user_id, &config)?;

        // Uniqueness is enforced by the store; no read-before-write here.
        let card = self.cards.create(new_card).await.map_err(|e| match e {
            StoreError::AlreadyExists => LoyaltyError::CardAlreadyExists,
            other => LoyaltyError::internal("create_card: insert failed", other),
        })?;

        tracing::info!(
            user_id = card.user_id,
            company_id = card.company_id,
            card_id = card.id,
            discount_percentage = card.discount_percentage.value(),
            "Loyalty card issued"
        );
        Ok(card.into())
    }

    async fn configure_program(
        &self,
        company_id: i64,
        acting_user_id: i64,
        request: &ConfigureLoyaltyRequest,
    ) -> Result<LoyaltyConfigView> {
        self.check_manager_access(company_id, acting_user_id).await?;

        let discount_percentage = DiscountPercentage::new(request.discount_percentage)?;

        let existing = match self.configs.get_by_company_id(company_id).await {
            Ok(config) => Some(config),
            Err(StoreError::NotFound) => None,
            Err(e) => {
                return Err(LoyaltyError::internal(
                    "configure_program: failed to check existing config",
                    e,
                ))
            }
        };

        let config = match existing {
            Some(existing) => {
                let is_enabled = request.is_enabled.unwrap_or(existing.is_enabled);
                let update = LoyaltyConfigUpdate {
                    company_id,
                    is_enabled: Some(is_enabled),
                    discount_percentage: Some(discount_percentage),
                };

                self.configs.update(update).await.map_err(|e| {
                    LoyaltyError::internal("configure_program: failed to update config", e)
                })?
            }
            None => {
                let new_config = NewLoyaltyConfig {
                    company_id,
                    is_enabled: request.is_enabled.unwrap_or(false),
                    discount_percentage,
                };

                self.configs
                    .create(new_config)
                    .await
                    .map_err(|e| match e {
                        StoreError::AlreadyExists => LoyaltyError::ConfigAlreadyExists,
                        other => LoyaltyError::internal(
                            "configure_program: failed to create config",
                            other,
                        ),
                    })?
            }
        };

        tracing::info!(
            company_id,
            acting_user_id,
            is_enabled = config.is_enabled,
            discount_percentage = discount_percentage.value(),
            "Loyalty program configured"
        );
        Ok(config.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::in_memory::{InMemoryCardStore, InMemoryConfigStore};
    use crate::domain::company::Company;
    use crate::domain::model::{CardStatus, LoyaltyCard, LoyaltyCardUpdate, NewLoyaltyConfig};
    use crate::utils::error::StoreResult;
    use std::collections::HashMap;

    /// Directory backed by a fixed map; companies not in the map are "not found".
    struct StaticDirectory {
        companies: HashMap<i64, Vec<i64>>,
        unavailable: bool,
    }

    impl StaticDirectory {
        fn with_company(company_id: i64, managers: &[i64]) -> Self {
            let mut companies = HashMap::new();
            companies.insert(company_id, managers.to_vec());
            Self {
                companies,
                unavailable: false,
            }
        }

        fn unavailable() -> Self {
            Self {
                companies: HashMap::new(),
                unavailable: true,
            }
        }
    }

    #[async_trait]
    impl CompanyDirectory for StaticDirectory {
        async fn get_company(
            &self,
            company_id: i64,
        ) -> std::result::Result<Company, LookupError> {
            if self.unavailable {
                return Err(LookupError::UnexpectedStatus {
                    status: 502,
                    body: "bad gateway".to_string(),
                });
            }
            match self.companies.get(&company_id) {
                Some(managers) => Ok(Company {
                    id: company_id,
                    name: "Test Co".to_string(),
                    addresses: vec![],
                    manager_ids: managers.clone(),
                    created_at: None,
                    updated_at: None,
                }),
                None => Err(LookupError::CompanyNotFound),
            }
        }
    }

    /// Config store whose backend is always down.
    struct BrokenConfigStore;

    #[async_trait]
    impl ConfigStore for BrokenConfigStore {
        async fn get_by_company_id(&self, _company_id: i64) -> StoreResult<LoyaltyConfig> {
            Err(StoreError::Backend {
                message: "connection refused".to_string(),
            })
        }

        async fn create(&self, _config: NewLoyaltyConfig) -> StoreResult<LoyaltyConfig> {
            Err(StoreError::Backend {
                message: "connection refused".to_string(),
            })
        }

        async fn update(&self, _update: LoyaltyConfigUpdate) -> StoreResult<LoyaltyConfig> {
            Err(StoreError::Backend {
                message: "connection refused".to_string(),
            })
        }
    }

    /// Card store that records whether any lookup happened.
    #[derive(Default)]
    struct SpyCardStore {
        inner: InMemoryCardStore,
        lookups: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl CardStore for SpyCardStore {
        async fn get_by_user_and_company(
            &self,
            user_id: i64,
            company_id: i64,
        ) -> StoreResult<LoyaltyCard> {
            self.lookups
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.get_by_user_and_company(user_id, company_id).await
        }

        async fn create(&self, card: NewLoyaltyCard) -> StoreResult<LoyaltyCard> {
            self.inner.create(card).await
        }

        async fn update(&self, update: LoyaltyCardUpdate) -> StoreResult<LoyaltyCard> {
            self.inner.update(update).await
        }
    }

    fn configure(discount: f64, is_enabled: Option<bool>) -> ConfigureLoyaltyRequest {
        ConfigureLoyaltyRequest {
            discount_percentage: discount,
            is_enabled,
        }
    }

    #[tokio::test]
    async fn test_disabled_program_skips_card_lookup() {
        let service = LoyaltyService::new(
            SpyCardStore::default(),
            InMemoryConfigStore::new(),
            StaticDirectory::with_company(42, &[7]),
        );
        service
            .configure_program(42, 7, &configure(10.0, Some(false)))
            .await
            .unwrap();

        let result = service.read_card(9, 42).await;

        assert!(matches!(result, Err(LoyaltyError::ConfigDisabled)));
        assert_eq!(
            service
                .cards
                .lookups
                .load(std::sync::atomic::Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn test_unknown_company_is_reported_as_config_not_found() {
        let service = LoyaltyService::new(
            InMemoryCardStore::new(),
            InMemoryConfigStore::new(),
            StaticDirectory::with_company(42, &[7]),
        );

        let result = service
            .configure_program(999, 7, &configure(10.0, None))
            .await;

        assert!(matches!(result, Err(LoyaltyError::ConfigNotFound)));
    }

    #[tokio::test]
    async fn test_lookup_failure_is_not_access_denied() {
        let service = LoyaltyService::new(
            InMemoryCardStore::new(),
            InMemoryConfigStore::new(),
            StaticDirectory::unavailable(),
        );

        let result = service.configure_program(42, 7, &configure(10.0, None)).await;

        assert!(matches!(
            result,
            Err(LoyaltyError::SellerServiceUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_authorization_runs_before_input_validation() {
        let service = LoyaltyService::new(
            InMemoryCardStore::new(),
            InMemoryConfigStore::new(),
            StaticDirectory::with_company(42, &[7]),
        );

        let result = service.configure_program(42, 8, &configure(500.0, None)).await;

        assert!(matches!(result, Err(LoyaltyError::AccessDenied)));
    }

    #[tokio::test]
    async fn test_store_backend_failure_becomes_internal() {
        let service = LoyaltyService::new(
            InMemoryCardStore::new(),
            BrokenConfigStore,
            StaticDirectory::with_company(42, &[7]),
        );

        let read = service.read_card(9, 42).await;
        let configured = service.configure_program(42, 7, &configure(5.0, None)).await;

        match read {
            Err(err @ LoyaltyError::Internal { .. }) => {
                assert_eq!(err.user_friendly_message(), "Internal server error");
                assert!(!err.user_friendly_message().contains("connection refused"));
            }
            other => panic!("expected internal error, got {:?}", other),
        }
        assert!(matches!(configured, Err(LoyaltyError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_issued_card_is_active_with_program_discount() {
        let service = LoyaltyService::new(
            InMemoryCardStore::new(),
            InMemoryConfigStore::new(),
            StaticDirectory::with_company(42, &[7]),
        );
        service
            .configure_program(42, 7, &configure(12.5, Some(true)))
            .await
            .unwrap();

        let card = service
            .create_card(&CreateLoyaltyCardRequest {
                user_id: 9,
                company_id: 42,
            })
            .await
            .unwrap();

        assert_eq!(card.status, CardStatus::Active);
        assert_eq!(card.discount_percentage, 12.5);
    }
}
