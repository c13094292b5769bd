use crate::application::{BookingLifecycleService, CheckoutService};
use crate::infrastructure::{
    AppConfig, PostgresBookingRepository, PostgresCarRepository, PostgresPaymentRepository,
    PostgresSubscriptionRepository, PostgresWalletRepository, StripeClient,
};
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;

pub type CheckoutServiceType = CheckoutService<
    PostgresCarRepository,
    PostgresSubscriptionRepository,
    PostgresBookingRepository,
    PostgresPaymentRepository,
    PostgresWalletRepository,
>;

pub type BookingLifecycleServiceType = BookingLifecycleService<
    PostgresBookingRepository,
    PostgresCarRepository,
    PostgresWalletRepository,
>;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub admin_token: String,
    pub car_repo: Arc<PostgresCarRepository>,
    pub subscription_repo: Arc<PostgresSubscriptionRepository>,
    pub wallet_repo: Arc<PostgresWalletRepository>,
    pub checkout: Arc<CheckoutServiceType>,
    pub lifecycle: Arc<BookingLifecycleServiceType>,
}

/// Build full state from config + an existing pool.
///
/// Intended for embedding into a larger service that already manages a `PgPool`.
pub async fn build_state_with_pool(
    config: AppConfig,
    pool: PgPool,
    run_migrations: bool,
) -> anyhow::Result<AppState> {
    if run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("run migrations")?;
    }

    let gateway = Arc::new(StripeClient::new(config.stripe_secret_key).context("init Stripe client")?);

    let car_repo = Arc::new(PostgresCarRepository::new(pool.clone()));
    let subscription_repo = Arc::new(PostgresSubscriptionRepository::new(pool.clone()));
    let booking_repo = Arc::new(PostgresBookingRepository::new(pool.clone()));
    let payment_repo = Arc::new(PostgresPaymentRepository::new(pool.clone()));
    let wallet_repo = Arc::new(PostgresWalletRepository::new(pool.clone()));

    let checkout = Arc::new(CheckoutService::new(
        car_repo.clone(),
        subscription_repo.clone(),
        booking_repo.clone(),
        payment_repo.clone(),
        wallet_repo.clone(),
        gateway,
        config.currency,
    ));

    let lifecycle = Arc::new(BookingLifecycleService::new(
        booking_repo.clone(),
        car_repo.clone(),
        wallet_repo.clone(),
    ));

    Ok(AppState {
        pool,
        admin_token: config.admin_token,
        car_repo,
        subscription_repo,
        wallet_repo,
        checkout,
        lifecycle,
    })
}

/// Build state for the standalone server.
///
/// Creates the `PgPool`, runs migrations, and wires repositories/services.
pub async fn build_state_from_env(config: AppConfig) -> anyhow::Result<AppState> {
    let pool = PgPool::connect(&config.database_url)
        .await
        .context("connect database")?;
    build_state_with_pool(config, pool, true).await
}
