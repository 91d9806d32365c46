use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Company record as returned by the seller service. Only `manager_ids` drives decisions here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub manager_ids: Vec<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: i64,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub building: String,
}

impl Company {
    pub fn is_managed_by(&self, user_id: i64) -> bool {
        self.manager_ids.contains(&user_id)
    }
}
