use crate::domain::{
    BillingCycle, Booking, BookingPaymentStatus, Car, CarStatus, CarType, PaymentMethod,
    PaymentRecord, PaymentRecordStatus, SubscriptionPlan, SubscriptionStatus, UserSubscription,
    Wallet,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CarRepository: Send + Sync {
    #[must_use]
    async fn create(&self, car: &Car) -> Result<(), RepositoryError>;
    #[must_use]
    async fn get_by_id(&self, id: Uuid) -> Result<Car, RepositoryError>;
    #[must_use]
    async fn update_status(&self, id: Uuid, status: CarStatus) -> Result<(), RepositoryError>;
    /// Atomic `Available -> Booked` transition. Returns false when another
    /// booking won the race, leaving the row untouched.
    #[must_use]
    async fn mark_booked(&self, id: Uuid) -> Result<bool, RepositoryError>;
    /// Atomic `Booked -> Available` transition on cancellation/completion.
    #[must_use]
    async fn release(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    #[must_use]
    async fn create_plan(&self, plan: &SubscriptionPlan) -> Result<(), RepositoryError>;
    #[must_use]
    async fn get_plan(&self, id: Uuid) -> Result<SubscriptionPlan, RepositoryError>;
    #[must_use]
    async fn create(&self, subscription: &UserSubscription) -> Result<(), RepositoryError>;
    /// Most recent subscription whose status is `active`, if any. Period
    /// bounds are checked by the caller.
    #[must_use]
    async fn get_active_for_account(
        &self,
        account_id: Uuid,
    ) -> Result<Option<UserSubscription>, RepositoryError>;
    #[must_use]
    async fn update_status(
        &self,
        id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<(), RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    #[must_use]
    async fn create(&self, booking: &Booking) -> Result<(), RepositoryError>;
    #[must_use]
    async fn get_by_id(&self, id: Uuid) -> Result<Booking, RepositoryError>;
    #[must_use]
    async fn list_by_renter_paginated(
        &self,
        renter_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, RepositoryError>;
    #[must_use]
    async fn count_by_renter(&self, renter_id: Uuid) -> Result<i64, RepositoryError>;
    #[must_use]
    async fn update_payment_status(
        &self,
        id: Uuid,
        status: BookingPaymentStatus,
    ) -> Result<(), RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    #[must_use]
    async fn create(&self, record: &PaymentRecord) -> Result<(), RepositoryError>;
    #[must_use]
    async fn get_by_id(&self, id: Uuid) -> Result<PaymentRecord, RepositoryError>;
    #[must_use]
    async fn update_intent(&self, id: Uuid, intent_id: &str) -> Result<(), RepositoryError>;
    #[must_use]
    async fn update_status(
        &self,
        id: Uuid,
        status: PaymentRecordStatus,
    ) -> Result<(), RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletRepository: Send + Sync {
    #[must_use]
    async fn get(&self, account_id: Uuid) -> Result<Wallet, RepositoryError>;
    /// Conditional debit: succeeds only when the balance covers the amount,
    /// so a balance can never go negative.
    #[must_use]
    async fn debit(&self, account_id: Uuid, amount: f64) -> Result<bool, RepositoryError>;
    #[must_use]
    async fn credit(&self, account_id: Uuid, amount: f64) -> Result<(), RepositoryError>;
}

pub struct PostgresCarRepository {
    pool: PgPool,
}

impl PostgresCarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CarRepository for PostgresCarRepository {
    async fn create(&self, car: &Car) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO cars (id, owner_id, name, car_type, price_per_hour, deposit,
                              location, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(car.id)
        .bind(car.owner_id)
        .bind(&car.name)
        .bind(car.car_type.to_string())
        .bind(car.price_per_hour)
        .bind(car.deposit)
        .bind(&car.location)
        .bind(car.status.to_string())
        .bind(car.created_at)
        .bind(car.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Car, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, name, car_type, price_per_hour, deposit,
                   location, status, created_at, updated_at
            FROM cars
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => RepositoryError::NotFound(format!("Car {}", id)),
            _ => RepositoryError::DatabaseError(e),
        })?;

        row_to_car(&row)
    }

    async fn update_status(&self, id: Uuid, status: CarStatus) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE cars
            SET status = $1, updated_at = $2
            WHERE id = $3
            "#,
        )
        .bind(status.to_string())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_booked(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE cars
            SET status = 'booked', updated_at = $1
            WHERE id = $2 AND status = 'available'
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn release(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE cars
            SET status = 'available', updated_at = $1
            WHERE id = $2 AND status = 'booked'
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

fn row_to_car(row: &sqlx::postgres::PgRow) -> Result<Car, RepositoryError> {
    let status_str: String = row.try_get("status")?;
    let type_str: String = row.try_get("car_type")?;

    Ok(Car {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
        car_type: CarType::from_str(&type_str)
            .map_err(|_| RepositoryError::InvalidData(format!("Unknown car type: {}", type_str)))?,
        price_per_hour: row.try_get("price_per_hour")?,
        deposit: row.try_get("deposit")?,
        location: row.try_get("location")?,
        status: CarStatus::from_str(&status_str)
            .map_err(|_| RepositoryError::InvalidData(format!("Unknown status: {}", status_str)))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn create_plan(&self, plan: &SubscriptionPlan) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO subscription_plans (id, name, price, billing_cycle,
                                            discount_percentage, free_hours)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(plan.id)
        .bind(&plan.name)
        .bind(plan.price)
        .bind(plan.billing_cycle.to_string())
        .bind(plan.discount_percentage)
        .bind(plan.free_hours)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_plan(&self, id: Uuid) -> Result<SubscriptionPlan, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, price, billing_cycle, discount_percentage, free_hours
            FROM subscription_plans
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => RepositoryError::NotFound(format!("Plan {}", id)),
            _ => RepositoryError::DatabaseError(e),
        })?;

        row_to_plan(&row)
    }

    async fn create(&self, subscription: &UserSubscription) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO user_subscriptions (id, account_id, plan_id, status,
                                            current_period_start, current_period_end)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(subscription.id)
        .bind(subscription.account_id)
        .bind(subscription.plan.id)
        .bind(subscription.status.to_string())
        .bind(subscription.current_period_start)
        .bind(subscription.current_period_end)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_active_for_account(
        &self,
        account_id: Uuid,
    ) -> Result<Option<UserSubscription>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT s.id, s.account_id, s.status,
                   s.current_period_start, s.current_period_end,
                   p.id AS plan_id, p.name, p.price, p.billing_cycle,
                   p.discount_percentage, p.free_hours
            FROM user_subscriptions s
            JOIN subscription_plans p ON p.id = s.plan_id
            WHERE s.account_id = $1 AND s.status = 'active'
            ORDER BY s.current_period_end DESC
            LIMIT 1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_subscription).transpose()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE user_subscriptions
            SET status = $1
            WHERE id = $2
            "#,
        )
        .bind(status.to_string())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn row_to_plan(row: &sqlx::postgres::PgRow) -> Result<SubscriptionPlan, RepositoryError> {
    let cycle_str: String = row.try_get("billing_cycle")?;

    Ok(SubscriptionPlan {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        price: row.try_get("price")?,
        billing_cycle: BillingCycle::from_str(&cycle_str).map_err(|_| {
            RepositoryError::InvalidData(format!("Unknown billing cycle: {}", cycle_str))
        })?,
        discount_percentage: row.try_get("discount_percentage")?,
        free_hours: row.try_get("free_hours")?,
    })
}

fn row_to_subscription(row: &sqlx::postgres::PgRow) -> Result<UserSubscription, RepositoryError> {
    let status_str: String = row.try_get("status")?;
    let cycle_str: String = row.try_get("billing_cycle")?;

    Ok(UserSubscription {
        id: row.try_get("id")?,
        account_id: row.try_get("account_id")?,
        plan: SubscriptionPlan {
            id: row.try_get("plan_id")?,
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            billing_cycle: BillingCycle::from_str(&cycle_str).map_err(|_| {
                RepositoryError::InvalidData(format!("Unknown billing cycle: {}", cycle_str))
            })?,
            discount_percentage: row.try_get("discount_percentage")?,
            free_hours: row.try_get("free_hours")?,
        },
        status: SubscriptionStatus::from_str(&status_str)
            .map_err(|_| RepositoryError::InvalidData(format!("Unknown status: {}", status_str)))?,
        current_period_start: row.try_get("current_period_start")?,
        current_period_end: row.try_get("current_period_end")?,
    })
}

pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn create(&self, booking: &Booking) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, renter_id, owner_id, car_id, pickup_at, dropoff_at,
                                  total_price, discount_percentage, discount_amount,
                                  payment_method, payment_status, premium,
                                  created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(booking.id)
        .bind(booking.renter_id)
        .bind(booking.owner_id)
        .bind(booking.car_id)
        .bind(booking.pickup_at)
        .bind(booking.dropoff_at)
        .bind(booking.total_price)
        .bind(booking.discount_percentage)
        .bind(booking.discount_amount)
        .bind(booking.payment_method.to_string())
        .bind(booking.payment_status.to_string())
        .bind(booking.premium)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Booking, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, renter_id, owner_id, car_id, pickup_at, dropoff_at,
                   total_price, discount_percentage, discount_amount,
                   payment_method, payment_status, premium, created_at, updated_at
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => RepositoryError::NotFound(format!("Booking {}", id)),
            _ => RepositoryError::DatabaseError(e),
        })?;

        row_to_booking(&row)
    }

    async fn list_by_renter_paginated(
        &self,
        renter_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, renter_id, owner_id, car_id, pickup_at, dropoff_at,
                   total_price, discount_percentage, discount_amount,
                   payment_method, payment_status, premium, created_at, updated_at
            FROM bookings
            WHERE renter_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(renter_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_booking).collect()
    }

    async fn count_by_renter(&self, renter_id: Uuid) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM bookings
            WHERE renter_id = $1
            "#,
        )
        .bind(renter_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        status: BookingPaymentStatus,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE bookings
            SET payment_status = $1, updated_at = $2
            WHERE id = $3
            "#,
        )
        .bind(status.to_string())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn row_to_booking(row: &sqlx::postgres::PgRow) -> Result<Booking, RepositoryError> {
    let method_str: String = row.try_get("payment_method")?;
    let status_str: String = row.try_get("payment_status")?;

    Ok(Booking {
        id: row.try_get("id")?,
        renter_id: row.try_get("renter_id")?,
        owner_id: row.try_get("owner_id")?,
        car_id: row.try_get("car_id")?,
        pickup_at: row.try_get("pickup_at")?,
        dropoff_at: row.try_get("dropoff_at")?,
        total_price: row.try_get("total_price")?,
        discount_percentage: row.try_get("discount_percentage")?,
        discount_amount: row.try_get("discount_amount")?,
        payment_method: PaymentMethod::from_str(&method_str).map_err(|_| {
            RepositoryError::InvalidData(format!("Unknown payment method: {}", method_str))
        })?,
        payment_status: BookingPaymentStatus::from_str(&status_str)
            .map_err(|_| RepositoryError::InvalidData(format!("Unknown status: {}", status_str)))?,
        premium: row.try_get("premium")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn create(&self, record: &PaymentRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO payments (id, account_id, car_id, pickup_at, dropoff_at, amount,
                                  discount_percentage, discount_amount, premium,
                                  intent_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(record.id)
        .bind(record.account_id)
        .bind(record.car_id)
        .bind(record.pickup_at)
        .bind(record.dropoff_at)
        .bind(record.amount)
        .bind(record.discount_percentage)
        .bind(record.discount_amount)
        .bind(record.premium)
        .bind(&record.intent_id)
        .bind(record.status.to_string())
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<PaymentRecord, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, account_id, car_id, pickup_at, dropoff_at, amount,
                   discount_percentage, discount_amount, premium,
                   intent_id, status, created_at, updated_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => RepositoryError::NotFound(format!("Payment {}", id)),
            _ => RepositoryError::DatabaseError(e),
        })?;

        row_to_payment(&row)
    }

    async fn update_intent(&self, id: Uuid, intent_id: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE payments
            SET intent_id = $1, updated_at = $2
            WHERE id = $3
            "#,
        )
        .bind(intent_id)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: PaymentRecordStatus,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE payments
            SET status = $1, updated_at = $2
            WHERE id = $3
            "#,
        )
        .bind(status.to_string())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn row_to_payment(row: &sqlx::postgres::PgRow) -> Result<PaymentRecord, RepositoryError> {
    let status_str: String = row.try_get("status")?;

    Ok(PaymentRecord {
        id: row.try_get("id")?,
        account_id: row.try_get("account_id")?,
        car_id: row.try_get("car_id")?,
        pickup_at: row.try_get("pickup_at")?,
        dropoff_at: row.try_get("dropoff_at")?,
        amount: row.try_get("amount")?,
        discount_percentage: row.try_get("discount_percentage")?,
        discount_amount: row.try_get("discount_amount")?,
        premium: row.try_get("premium")?,
        intent_id: row.try_get("intent_id")?,
        status: PaymentRecordStatus::from_str(&status_str)
            .map_err(|_| RepositoryError::InvalidData(format!("Unknown status: {}", status_str)))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub struct PostgresWalletRepository {
    pool: PgPool,
}

impl PostgresWalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WalletRepository for PostgresWalletRepository {
    async fn get(&self, account_id: Uuid) -> Result<Wallet, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT account_id, balance, updated_at
            FROM wallets
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Wallet {
                account_id: row.try_get("account_id")?,
                balance: row.try_get("balance")?,
                updated_at: row.try_get("updated_at")?,
            }),
            None => Ok(Wallet::new(account_id)),
        }
    }

    async fn debit(&self, account_id: Uuid, amount: f64) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE wallets
            SET balance = balance - $1, updated_at = $2
            WHERE account_id = $3 AND balance >= $1
            "#,
        )
        .bind(amount)
        .bind(Utc::now())
        .bind(account_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn credit(&self, account_id: Uuid, amount: f64) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO wallets (account_id, balance, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (account_id)
            DO UPDATE SET balance = wallets.balance + $2, updated_at = $3
            "#,
        )
        .bind(account_id)
        .bind(amount)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
