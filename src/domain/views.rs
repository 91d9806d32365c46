use crate::domain::model::{CardStatus, CardType, LoyaltyCard, LoyaltyConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLoyaltyCardRequest {
    pub user_id: i64,
    pub company_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigureLoyaltyRequest {
    pub discount_percentage: f64,
    /// `None` keeps the stored value, or `false` for a new program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyCardView {
    pub card_id: i64,
    pub user_id: i64,
    pub company_id: i64,
    pub card_type: CardType,
    pub status: CardStatus,
    pub discount_percentage: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyConfigView {
    pub company_id: i64,
    pub card_type: CardType,
    pub is_enabled: bool,
    pub discount_percentage: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LoyaltyCard> for LoyaltyCardView {
    fn from(card: LoyaltyCard) -> Self {
        Self {
            card_id: card.id,
            user_id: card.user_id,
            company_id: card.company_id,
            card_type: card.card_type,
            status: card.status,
            discount_percentage: card.discount_percentage.value(),
            created_at: card.created_at,
            updated_at: card.updated_at,
        }
    }
}

impl From<LoyaltyConfig> for LoyaltyConfigView {
    fn from(config: LoyaltyConfig) -> Self {
        Self {
            company_id: config.company_id,
            card_type: config.card_type,
            is_enabled: config.is_enabled,
            discount_percentage: config
                .discount_percentage
                .map(|d| d.value())
                .unwrap_or(0.0),
            created_at: config.created_at,
            updated_at: config.updated_at,
        }
    }
}
