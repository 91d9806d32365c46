use crate::core::{CardStore, ConfigStore};
use crate::domain::model::{
    CardSelector, CardType, LoyaltyCard, LoyaltyCardUpdate, LoyaltyConfig, LoyaltyConfigUpdate,
    NewLoyaltyCard, NewLoyaltyConfig,
};
use crate::utils::error::{Result, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct CardTable {
    next_id: i64,
    by_pair: HashMap<(i64, i64), LoyaltyCard>,
    pair_by_id: HashMap<i64, (i64, i64)>,
}

impl CardTable {
    fn resolve(&self, selector: CardSelector) -> Option<(i64, i64)> {
        match selector {
            CardSelector::Id(id) => self.pair_by_id.get(&id).copied(),
            CardSelector::UserAndCompany {
                user_id,
                company_id,
            } => Some((user_id, company_id)),
        }
    }
}

/// Card store kept in process memory.
///
/// Every operation takes the table lock once, so the (user, company) uniqueness check
/// and the insert happen as one atomic step.
#[derive(Default, Clone)]
pub struct InMemoryCardStore {
    table: Arc<RwLock<CardTable>>,
}

impl InMemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CardStore for InMemoryCardStore {
    async fn get_by_user_and_company(
        &self,
        user_id: i64,
        company_id: i64,
    ) -> StoreResult<LoyaltyCard> {
        let table = self.table.read().await;
        table
            .by_pair
            .get(&(user_id, company_id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, card: NewLoyaltyCard) -> StoreResult<LoyaltyCard> {
        let mut table = self.table.write().await;
        let key = (card.user_id, card.company_id);
        if table.by_pair.contains_key(&key) {
            return Err(StoreError::AlreadyExists);
        }

        table.next_id += 1;
        let now = Utc::now();
        let stored = LoyaltyCard {
            id: table.next_id,
            user_id: card.user_id,
            company_id: card.company_id,
            card_type: card.card_type,
            status: card.status,
            discount_percentage: card.discount_percentage,
            created_at: now,
            updated_at: now,
        };

        table.pair_by_id.insert(stored.id, key);
        table.by_pair.insert(key, stored.clone());
        Ok(stored)
    }

    async fn update(&self, update: LoyaltyCardUpdate) -> StoreResult<LoyaltyCard> {
        if update.is_empty() {
            return Err(StoreError::EmptyUpdate);
        }

        let mut table = self.table.write().await;
        let key = table.resolve(update.selector).ok_or(StoreError::NotFound)?;
        let card = table.by_pair.get_mut(&key).ok_or(StoreError::NotFound)?;

        if let Some(card_type) = update.card_type {
            card.card_type = card_type;
        }
        if let Some(status) = update.status {
            card.status = status;
        }
        if let Some(discount) = update.discount_percentage {
            card.discount_percentage = discount;
        }
        card.updated_at = Utc::now();

        Ok(card.clone())
    }
}

#[derive(Default)]
struct ConfigTable {
    next_id: i64,
    by_company: HashMap<i64, LoyaltyConfig>,
}

/// Program configuration store kept in process memory. Unique on company id.
#[derive(Default, Clone)]
pub struct InMemoryConfigStore {
    table: Arc<RwLock<ConfigTable>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully formed configuration, replacing any existing one for the company.
    /// Used to seed programs of card types that the configure flow cannot create.
    pub async fn seed(&self, config: LoyaltyConfig) -> Result<()> {
        config.validate()?;

        let mut table = self.table.write().await;
        table.next_id = table.next_id.max(config.id);
        table.by_company.insert(config.company_id, config);
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn get_by_company_id(&self, company_id: i64) -> StoreResult<LoyaltyConfig> {
        let table = self.table.read().await;
        table
            .by_company
            .get(&company_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, config: NewLoyaltyConfig) -> StoreResult<LoyaltyConfig> {
        let mut table = self.table.write().await;
        if table.by_company.contains_key(&config.company_id) {
            return Err(StoreError::AlreadyExists);
        }

        table.next_id += 1;
        let now = Utc::now();
        let stored = LoyaltyConfig {
            id: table.next_id,
            company_id: config.company_id,
            card_type: CardType::FixedDiscount,
            is_enabled: config.is_enabled,
            discount_percentage: Some(config.discount_percentage),
            progressive_config: None,
            points_config: None,
            created_at: now,
            updated_at: now,
        };

        table.by_company.insert(stored.company_id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, update: LoyaltyConfigUpdate) -> StoreResult<LoyaltyConfig> {
        if update.is_empty() {
            return Err(StoreError::EmptyUpdate);
        }

        let mut table = self.table.write().await;
        let config = table
            .by_company
            .get_mut(&update.company_id)
            .ok_or(StoreError::NotFound)?;

        if let Some(is_enabled) = update.is_enabled {
            config.is_enabled = is_enabled;
        }
        if let Some(discount) = update.discount_percentage {
            config.discount_percentage = Some(discount);
        }
        config.updated_at = Utc::now();

        Ok(config.clone())
    }
}
