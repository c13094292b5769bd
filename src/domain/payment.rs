use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Durable state of a card checkout between intent creation and
/// confirmation. No booking row exists while a payment is `Pending`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub account_id: Uuid,
    pub car_id: Uuid,
    pub pickup_at: DateTime<Utc>,
    pub dropoff_at: DateTime<Utc>,
    /// Amount the intent was created for, deposit included.
    pub amount: f64,
    pub discount_percentage: f64,
    pub discount_amount: f64,
    pub premium: bool,
    pub intent_id: Option<String>,
    pub status: PaymentRecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentRecordStatus {
    Pending,
    Succeeded,
    Failed,
    Cancelled,
}

impl PaymentRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        account_id: Uuid,
        car_id: Uuid,
        pickup_at: DateTime<Utc>,
        dropoff_at: DateTime<Utc>,
        amount: f64,
        discount_percentage: f64,
        discount_amount: f64,
        premium: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_id,
            car_id,
            pickup_at,
            dropoff_at,
            amount,
            discount_percentage,
            discount_amount,
            premium,
            intent_id: None,
            status: PaymentRecordStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}
