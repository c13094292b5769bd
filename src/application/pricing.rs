use crate::domain::UserSubscription;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed rental tax, applied to the rental cost before discounts.
pub const TAX_RATE: f64 = 0.10;

/// Discount assumed when a legacy plan advertises one that cannot be parsed.
const LEGACY_DISCOUNT_FALLBACK_PCT: f64 = 10.0;

const SECONDS_PER_HOUR: i64 = 3600;

#[derive(Error, Debug, PartialEq)]
pub enum PricingError {
    #[error("Invalid rental window: dropoff must be at least one hour after pickup")]
    InvalidWindow,
}

/// Billable hours for a rental window: the duration rounded up to whole
/// hours, never less than one. Windows shorter than an hour are rejected.
pub fn billable_hours(
    pickup_at: DateTime<Utc>,
    dropoff_at: DateTime<Utc>,
) -> Result<i64, PricingError> {
    let seconds = (dropoff_at - pickup_at).num_seconds();
    if seconds < SECONDS_PER_HOUR {
        return Err(PricingError::InvalidWindow);
    }
    let hours = (seconds + SECONDS_PER_HOUR - 1) / SECONDS_PER_HOUR;
    Ok(hours.max(1))
}

/// Benefits a renter carries into pricing. Zero unless the subscription is
/// active at quote time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Benefits {
    pub active: bool,
    pub free_hours: i64,
    pub discount_percentage: f64,
}

impl Benefits {
    pub const NONE: Benefits = Benefits {
        active: false,
        free_hours: 0,
        discount_percentage: 0.0,
    };

    pub fn resolve(subscription: Option<&UserSubscription>, at: DateTime<Utc>) -> Self {
        match subscription {
            Some(sub) if sub.is_active_at(at) => Self {
                active: true,
                free_hours: sub.plan.free_hours.max(0),
                discount_percentage: sub.plan.discount_percentage.clamp(0.0, 100.0),
            },
            _ => Self::NONE,
        }
    }

    /// Importer for pre-redesign plan rows that encoded benefits as ordered
    /// feature strings: index 1 carried the discount ("10% discount ..."),
    /// index 2 the free-hour allotment ("2 free hours ..."). A discount
    /// entry that exists but does not parse falls back to 10%; free hours
    /// fall back to zero.
    pub fn from_legacy_features(features: &[String]) -> (f64, i64) {
        let discount = match features.get(1) {
            Some(raw) => leading_number(raw).unwrap_or(LEGACY_DISCOUNT_FALLBACK_PCT),
            None => 0.0,
        };
        let free_hours = features
            .get(2)
            .and_then(|raw| leading_number(raw))
            .map(|n| n as i64)
            .unwrap_or(0);
        (discount.clamp(0.0, 100.0), free_hours.max(0))
    }
}

fn leading_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

/// Fully composed price for a rental window.
///
/// `total` is the undiscounted reference price; `discounted_total` applies
/// the subscription discount. The deposit is added in full to both and is
/// never discounted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub hours: i64,
    pub chargeable_hours: i64,
    pub rental_cost: f64,
    pub tax: f64,
    pub subtotal: f64,
    pub discount_percentage: f64,
    pub discount_amount: f64,
    pub deposit: f64,
    pub total: f64,
    pub discounted_total: f64,
}

impl Quote {
    pub fn compose(price_per_hour: f64, deposit: f64, hours: i64, benefits: &Benefits) -> Self {
        let chargeable_hours = (hours - benefits.free_hours).max(0);
        let rental_cost = price_per_hour * chargeable_hours as f64;
        let tax = rental_cost * TAX_RATE;
        let subtotal = rental_cost + tax;
        let discount_amount = subtotal * (benefits.discount_percentage / 100.0);
        Self {
            hours,
            chargeable_hours,
            rental_cost,
            tax,
            subtotal,
            discount_percentage: benefits.discount_percentage,
            discount_amount,
            deposit,
            total: subtotal + deposit,
            discounted_total: subtotal - discount_amount + deposit,
        }
    }

    /// The amount to charge: the discounted total for active subscribers,
    /// the reference total otherwise.
    pub fn payable(&self, benefits: &Benefits) -> f64 {
        if benefits.active {
            self.discounted_total
        } else {
            self.total
        }
    }
}
