use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Car {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub car_type: CarType,
    pub price_per_hour: f64,
    pub deposit: f64,
    pub location: String,
    pub status: CarStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CarStatus {
    Available,
    Booked,
    Unavailable,
    UnderMaintenance,
    PendingApproval,
    Archived,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CarType {
    Sedan,
    Suv,
    Hatchback,
    Luxury,
}

impl Car {
    /// New listings start pending admin approval.
    pub fn new(
        owner_id: Uuid,
        name: String,
        car_type: CarType,
        price_per_hour: f64,
        deposit: f64,
        location: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            car_type,
            price_per_hour,
            deposit,
            location,
            status: CarStatus::PendingApproval,
            created_at: now,
            updated_at: now,
        }
    }

    /// A car can enter a booking only from `Available`.
    pub fn is_rentable(&self) -> bool {
        self.status == CarStatus::Available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_listing_is_pending_approval_and_not_rentable() {
        let car = Car::new(
            Uuid::new_v4(),
            "Civic".to_string(),
            CarType::Sedan,
            100.0,
            50.0,
            "Austin".to_string(),
        );
        assert_eq!(car.status, CarStatus::PendingApproval);
        assert!(!car.is_rentable());
    }

    #[test]
    fn status_round_trips_through_snake_case() {
        use std::str::FromStr;
        assert_eq!(CarStatus::UnderMaintenance.to_string(), "under_maintenance");
        assert_eq!(
            CarStatus::from_str("pending_approval").unwrap(),
            CarStatus::PendingApproval
        );
        assert!(CarStatus::from_str("sold").is_err());
    }
}
