use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wallet {
    pub account_id: Uuid,
    pub balance: f64,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    pub fn new(account_id: Uuid) -> Self {
        Self {
            account_id,
            balance: 0.0,
            updated_at: Utc::now(),
        }
    }
}
