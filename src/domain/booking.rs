use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub renter_id: Uuid,
    pub owner_id: Uuid,
    pub car_id: Uuid,
    pub pickup_at: DateTime<Utc>,
    pub dropoff_at: DateTime<Utc>,
    /// Final charged amount, deposit included.
    pub total_price: f64,
    pub discount_percentage: f64,
    pub discount_amount: f64,
    pub payment_method: PaymentMethod,
    pub payment_status: BookingPaymentStatus,
    /// Set for luxury-category rentals.
    pub premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentMethod {
    Wallet,
    Stripe,
}

/// A booking row only exists once its payment succeeded, so the persisted
/// states are post-payment ones. `Completed` and `Refunded` are terminal:
/// the charge can no longer be reversed through cancellation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BookingPaymentStatus {
    Paid,
    Completed,
    Refunded,
}

pub struct BookingCharge {
    pub total_price: f64,
    pub discount_percentage: f64,
    pub discount_amount: f64,
}

impl Booking {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        renter_id: Uuid,
        owner_id: Uuid,
        car_id: Uuid,
        pickup_at: DateTime<Utc>,
        dropoff_at: DateTime<Utc>,
        charge: BookingCharge,
        payment_method: PaymentMethod,
        premium: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            renter_id,
            owner_id,
            car_id,
            pickup_at,
            dropoff_at,
            total_price: charge.total_price,
            discount_percentage: charge.discount_percentage,
            discount_amount: charge.discount_amount,
            payment_method,
            payment_status: BookingPaymentStatus::Paid,
            premium,
            created_at: now,
            updated_at: now,
        }
    }
}
