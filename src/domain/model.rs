use crate::utils::error::{LoyaltyError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of loyalty program. Only `FixedDiscount` is live; the other variants are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    FixedDiscount,
    ProgressiveDiscount,
    PointsBased,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::FixedDiscount => "fixed_discount",
            CardType::ProgressiveDiscount => "progressive_discount",
            CardType::PointsBased => "points_based",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Card lifecycle state. Cards are issued `Active`; the remaining states are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    Active,
    Disabled,
    Suspended,
    Expired,
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::Active => "active",
            CardStatus::Disabled => "disabled",
            CardStatus::Suspended => "suspended",
            CardStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flat discount in percent, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DiscountPercentage(f64);

impl DiscountPercentage {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;

    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(LoyaltyError::invalid_input(format!(
                "discount percentage must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for DiscountPercentage {
    type Error = LoyaltyError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<DiscountPercentage> for f64 {
    fn from(discount: DiscountPercentage) -> Self {
        discount.0
    }
}

/// A company's loyalty program settings. One per company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyConfig {
    pub id: i64,
    pub company_id: i64,
    pub card_type: CardType,
    pub is_enabled: bool,
    /// Required for `FixedDiscount`.
    pub discount_percentage: Option<DiscountPercentage>,
    /// Opaque settings for `ProgressiveDiscount`, unused.
    pub progressive_config: Option<serde_json::Value>,
    /// Opaque settings for `PointsBased`, unused.
    pub points_config: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoyaltyConfig {
    pub fn validate(&self) -> Result<()> {
        match self.card_type {
            CardType::FixedDiscount => match self.discount_percentage {
                Some(_) => Ok(()),
                None => Err(LoyaltyError::invalid_input(
                    "discount percentage is required for fixed_discount programs",
                )),
            },
            CardType::ProgressiveDiscount | CardType::PointsBased => Ok(()),
        }
    }
}

/// Input for creating a company's first program configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoyaltyConfig {
    pub company_id: i64,
    pub is_enabled: bool,
    pub discount_percentage: DiscountPercentage,
}

/// Partial update of an existing configuration. `None` leaves the stored value untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct LoyaltyConfigUpdate {
    pub company_id: i64,
    pub is_enabled: Option<bool>,
    pub discount_percentage: Option<DiscountPercentage>,
}

impl LoyaltyConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.is_enabled.is_none() && self.discount_percentage.is_none()
    }
}

/// A customer's loyalty card at one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyCard {
    pub id: i64,
    pub user_id: i64,
    pub company_id: i64,
    pub card_type: CardType,
    pub status: CardStatus,
    /// Copied from the program at issuance and never recomputed.
    pub discount_percentage: DiscountPercentage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A card that has not been persisted yet. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoyaltyCard {
    pub user_id: i64,
    pub company_id: i64,
    pub card_type: CardType,
    pub status: CardStatus,
    pub discount_percentage: DiscountPercentage,
}

impl NewLoyaltyCard {
    /// Builds an active card that snapshots the program's current discount.
    pub fn issue(user_id: i64, config: &LoyaltyConfig) -> Result<Self> {
        match config.card_type {
            CardType::FixedDiscount => {
                let discount_percentage = config.discount_percentage.ok_or_else(|| {
                    LoyaltyError::internal_without_source(format!(
                        "fixed_discount config for company {} has no discount percentage",
                        config.company_id
                    ))
                })?;

                Ok(Self {
                    user_id,
                    company_id: config.company_id,
                    card_type: CardType::FixedDiscount,
                    status: CardStatus::Active,
                    discount_percentage,
                })
            }
            CardType::ProgressiveDiscount | CardType::PointsBased => {
                Err(LoyaltyError::internal_without_source(format!(
                    "card type {} is not supported for issuance",
                    config.card_type
                )))
            }
        }
    }
}

/// Identifies a card either by id or by its (user, company) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSelector {
    Id(i64),
    UserAndCompany { user_id: i64, company_id: i64 },
}

/// Partial update of a card.
#[derive(Debug, Clone, PartialEq)]
pub struct LoyaltyCardUpdate {
    pub selector: CardSelector,
    pub card_type: Option<CardType>,
    pub status: Option<CardStatus>,
    pub discount_percentage: Option<DiscountPercentage>,
}

impl LoyaltyCardUpdate {
    pub fn is_empty(&self) -> bool {
        self.card_type.is_none() && self.status.is_none() && self.discount_percentage.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_config(discount: Option<f64>) -> LoyaltyConfig {
        let now = Utc::now();
        LoyaltyConfig {
            id: 1,
            company_id: 42,
            card_type: CardType::FixedDiscount,
            is_enabled: true,
            discount_percentage: discount.map(|d| DiscountPercentage::new(d).unwrap()),
            progressive_config: None,
            points_config: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_discount_bounds_are_inclusive() {
        assert!(DiscountPercentage::new(0.0).is_ok());
        assert!(DiscountPercentage::new(100.0).is_ok());
        assert!(DiscountPercentage::new(15.5).is_ok());
        assert!(matches!(
            DiscountPercentage::new(-1.0),
            Err(LoyaltyError::InvalidInput { .. })
        ));
        assert!(matches!(
            DiscountPercentage::new(101.0),
            Err(LoyaltyError::InvalidInput { .. })
        ));
        assert!(DiscountPercentage::new(f64::NAN).is_err());
    }

    #[test]
    fn test_discount_deserialization_enforces_range() {
        let ok: DiscountPercentage = serde_json::from_str("25").unwrap();
        assert_eq!(ok.value(), 25.0);
        assert!(serde_json::from_str::<DiscountPercentage>("150").is_err());
    }

    #[test]
    fn test_enums_use_snake_case_names() {
        assert_eq!(
            serde_json::to_string(&CardType::ProgressiveDiscount).unwrap(),
            "\"progressive_discount\""
        );
        assert_eq!(serde_json::to_string(&CardStatus::Active).unwrap(), "\"active\"");
        assert_eq!(CardType::PointsBased.to_string(), "points_based");
    }

    #[test]
    fn test_fixed_discount_config_requires_discount() {
        assert!(fixed_config(Some(10.0)).validate().is_ok());
        assert!(fixed_config(None).validate().is_err());

        let mut reserved = fixed_config(None);
        reserved.card_type = CardType::PointsBased;
        assert!(reserved.validate().is_ok());
    }

    #[test]
    fn test_issue_snapshots_discount_and_activates_card() {
        let card = NewLoyaltyCard::issue(9, &fixed_config(Some(15.0))).unwrap();

        assert_eq!(card.user_id, 9);
        assert_eq!(card.company_id, 42);
        assert_eq!(card.card_type, CardType::FixedDiscount);
        assert_eq!(card.status, CardStatus::Active);
        assert_eq!(card.discount_percentage.value(), 15.0);
    }

    #[test]
    fn test_issue_rejects_reserved_card_types() {
        let mut config = fixed_config(Some(15.0));
        config.card_type = CardType::ProgressiveDiscount;

        assert!(matches!(
            NewLoyaltyCard::issue(9, &config),
            Err(LoyaltyError::Internal { .. })
        ));
    }
}
