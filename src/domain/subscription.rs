use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Plan tiers that may not book luxury cars even while active.
pub const LUXURY_DISQUALIFIED_PLANS: &[&str] = &["DrivePlus"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionPlan {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub billing_cycle: BillingCycle,
    /// Percentage taken off the taxed subtotal, 0-100.
    pub discount_percentage: f64,
    /// Hours deducted from the billable duration of each booking.
    pub free_hours: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSubscription {
    pub id: Uuid,
    pub account_id: Uuid,
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    Completed,
}

impl SubscriptionPlan {
    pub fn new(
        name: String,
        price: f64,
        billing_cycle: BillingCycle,
        discount_percentage: f64,
        free_hours: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            price,
            billing_cycle,
            discount_percentage,
            free_hours,
        }
    }

    /// Whether an active subscription on this plan unlocks luxury bookings.
    pub fn grants_luxury_access(&self) -> bool {
        !LUXURY_DISQUALIFIED_PLANS.contains(&self.name.as_str())
    }
}

impl UserSubscription {
    pub fn new(account_id: Uuid, plan: SubscriptionPlan, period_end: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_id,
            plan,
            status: SubscriptionStatus::Active,
            current_period_start: now,
            current_period_end: period_end,
        }
    }

    /// Active means status `Active` and `at` inside the billing period.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active
            && at >= self.current_period_start
            && at < self.current_period_end
    }
}
