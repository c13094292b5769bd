use crate::application::pricing::{billable_hours, Benefits, PricingError, Quote};
use crate::domain::{
    Booking, BookingCharge, Car, CarType, PaymentMethod, PaymentRecord, PaymentRecordStatus,
    UserSubscription,
};
use crate::infrastructure::{
    to_minor_units, BookingRepository, CarRepository, PaymentGateway, PaymentIntentStatus,
    PaymentRepository, RepositoryError, StripeError, SubscriptionRepository, WalletRepository,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Payment provider error: {0}")]
    Stripe(#[from] StripeError),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error("Car {0} is not available for booking")]
    CarUnavailable(Uuid),
    #[error("An active subscription is required: {0}")]
    SubscriptionRequired(String),
    #[error("Insufficient wallet balance")]
    InsufficientFunds,
    #[error("Payment not settled: {0}")]
    PaymentNotSettled(String),
    #[error("Payment already {0}")]
    PaymentAlreadyResolved(PaymentRecordStatus),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub renter_id: Uuid,
    pub car_id: Uuid,
    pub pickup_at: DateTime<Utc>,
    pub dropoff_at: DateTime<Utc>,
    pub payment_method: PaymentMethod,
}

/// Result of a checkout: wallet payments settle inline, card payments come
/// back with the provider handle the client confirms against. No booking
/// exists until the card payment is confirmed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckoutOutcome {
    Booked { booking: Booking },
    PaymentRequired { payment_id: Uuid, client_secret: String, amount: f64 },
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteOutcome {
    pub quote: Quote,
    pub subscription_active: bool,
    pub payable: f64,
}

pub struct CheckoutService<C, S, B, P, W>
where
    C: CarRepository,
    S: SubscriptionRepository,
    B: BookingRepository,
    P: PaymentRepository,
    W: WalletRepository,
{
    car_repo: Arc<C>,
    subscription_repo: Arc<S>,
    booking_repo: Arc<B>,
    payment_repo: Arc<P>,
    wallet_repo: Arc<W>,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
}

struct PricedCar {
    car: Car,
    benefits: Benefits,
    quote: Quote,
}

impl<C, S, B, P, W> CheckoutService<C, S, B, P, W>
where
    C: CarRepository,
    S: SubscriptionRepository,
    B: BookingRepository,
    P: PaymentRepository,
    W: WalletRepository,
{
    pub fn new(
        car_repo: Arc<C>,
        subscription_repo: Arc<S>,
        booking_repo: Arc<B>,
        payment_repo: Arc<P>,
        wallet_repo: Arc<W>,
        gateway: Arc<dyn PaymentGateway>,
        currency: String,
    ) -> Self {
        Self {
            car_repo,
            subscription_repo,
            booking_repo,
            payment_repo,
            wallet_repo,
            gateway,
            currency,
        }
    }

    /// Availability + entitlement + pricing with no side effects, for the
    /// pre-submit preview.
    pub async fn quote(
        &self,
        renter_id: Uuid,
        car_id: Uuid,
        pickup_at: DateTime<Utc>,
        dropoff_at: DateTime<Utc>,
    ) -> Result<QuoteOutcome, CheckoutError> {
        let priced = self.price_car(renter_id, car_id, pickup_at, dropoff_at).await?;
        Ok(QuoteOutcome {
            payable: priced.quote.payable(&priced.benefits),
            subscription_active: priced.benefits.active,
            quote: priced.quote,
        })
    }

    /// The booking flow: availability gate, luxury entitlement gate,
    /// pricing, then payment dispatch. Each gate aborts with its own error;
    /// nothing is persisted before the payment step.
    pub async fn checkout(&self, req: CheckoutRequest) -> Result<CheckoutOutcome, CheckoutError> {
        let priced = self
            .price_car(req.renter_id, req.car_id, req.pickup_at, req.dropoff_at)
            .await?;

        match req.payment_method {
            PaymentMethod::Wallet => self.settle_with_wallet(&req, priced).await,
            PaymentMethod::Stripe => self.start_card_payment(&req, priced).await,
        }
    }

    async fn price_car(
        &self,
        renter_id: Uuid,
        car_id: Uuid,
        pickup_at: DateTime<Utc>,
        dropoff_at: DateTime<Utc>,
    ) -> Result<PricedCar, CheckoutError> {
        let car = self.car_repo.get_by_id(car_id).await?;
        if !car.is_rentable() {
            return Err(CheckoutError::CarUnavailable(car_id));
        }

        let subscription = self.subscription_repo.get_active_for_account(renter_id).await?;
        let now = Utc::now();
        self.check_luxury_access(&car, subscription.as_ref(), now)?;

        let hours = billable_hours(pickup_at, dropoff_at)?;
        let benefits = Benefits::resolve(subscription.as_ref(), now);
        let quote = Quote::compose(car.price_per_hour, car.deposit, hours, &benefits);

        Ok(PricedCar { car, benefits, quote })
    }

    fn check_luxury_access(
        &self,
        car: &Car,
        subscription: Option<&UserSubscription>,
        now: DateTime<Utc>,
    ) -> Result<(), CheckoutError> {
        if car.car_type != CarType::Luxury {
            return Ok(());
        }

        match subscription {
            Some(sub) if sub.is_active_at(now) => {
                if sub.plan.grants_luxury_access() {
                    Ok(())
                } else {
                    Err(CheckoutError::SubscriptionRequired(format!(
                        "plan {} does not cover luxury cars",
                        sub.plan.name
                    )))
                }
            }
            _ => Err(CheckoutError::SubscriptionRequired(
                "luxury cars require an active subscription".to_string(),
            )),
        }
    }

    async fn settle_with_wallet(
        &self,
        req: &CheckoutRequest,
        priced: PricedCar,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let payable = priced.quote.payable(&priced.benefits);

        if !self.wallet_repo.debit(req.renter_id, payable).await? {
            return Err(CheckoutError::InsufficientFunds);
        }

        if !self.car_repo.mark_booked(req.car_id).await? {
            // Lost the race after the debit: put the money back.
            warn!(car_id = %req.car_id, "Car booked concurrently, refunding wallet debit");
            self.wallet_repo.credit(req.renter_id, payable).await?;
            return Err(CheckoutError::CarUnavailable(req.car_id));
        }

        let booking = Booking::new(
            req.renter_id,
            priced.car.owner_id,
            req.car_id,
            req.pickup_at,
            req.dropoff_at,
            BookingCharge {
                total_price: payable,
                discount_percentage: priced.quote.discount_percentage,
                discount_amount: priced.quote.discount_amount,
            },
            PaymentMethod::Wallet,
            priced.car.car_type == CarType::Luxury,
        );

        if let Err(e) = self.booking_repo.create(&booking).await {
            error!(car_id = %req.car_id, error = %e, "Failed to persist booking, rolling back");
            self.car_repo.release(req.car_id).await?;
            self.wallet_repo.credit(req.renter_id, payable).await?;
            return Err(e.into());
        }

        info!(booking_id = %booking.id, car_id = %req.car_id, amount = payable, "Wallet booking created");
        Ok(CheckoutOutcome::Booked { booking })
    }

    async fn start_card_payment(
        &self,
        req: &CheckoutRequest,
        priced: PricedCar,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let payable = priced.quote.payable(&priced.benefits);

        let record = PaymentRecord::new(
            req.renter_id,
            req.car_id,
            req.pickup_at,
            req.dropoff_at,
            payable,
            priced.quote.discount_percentage,
            priced.quote.discount_amount,
            priced.car.car_type == CarType::Luxury,
        );
        self.payment_repo.create(&record).await?;

        // The record id doubles as the idempotency key, so a client retry
        // of the same checkout cannot create a second charge.
        let intent = match self
            .gateway
            .create_payment_intent(
                to_minor_units(payable),
                &self.currency,
                &record.id.to_string(),
            )
            .await
        {
            Ok(intent) => intent,
            Err(e) => {
                error!(payment_id = %record.id, error = %e, "Payment intent creation failed");
                self.payment_repo
                    .update_status(record.id, PaymentRecordStatus::Failed)
                    .await?;
                return Err(e.into());
            }
        };

        self.payment_repo.update_intent(record.id, &intent.id).await?;

        let client_secret = intent.client_secret.ok_or_else(|| {
            StripeError::InvalidResponse("payment intent missing client_secret".to_string())
        })?;

        info!(payment_id = %record.id, intent_id = %intent.id, amount = payable, "Payment intent created");
        Ok(CheckoutOutcome::PaymentRequired {
            payment_id: record.id,
            client_secret,
            amount: payable,
        })
    }

    /// Completes a card checkout after the client confirmed the payment.
    /// The intent status is re-fetched from the provider; the booking is
    /// only created once the provider reports `succeeded`.
    pub async fn confirm_card_payment(&self, payment_id: Uuid) -> Result<Booking, CheckoutError> {
        let record = self.payment_repo.get_by_id(payment_id).await?;
        if record.status != PaymentRecordStatus::Pending {
            return Err(CheckoutError::PaymentAlreadyResolved(record.status));
        }

        let intent_id = record.intent_id.clone().ok_or_else(|| {
            CheckoutError::PaymentNotSettled("no payment intent on record".to_string())
        })?;

        let intent = self.gateway.retrieve_payment_intent(&intent_id).await?;
        if intent.status != PaymentIntentStatus::Succeeded {
            warn!(payment_id = %payment_id, status = ?intent.status, "Card payment not settled");
            self.payment_repo
                .update_status(payment_id, PaymentRecordStatus::Failed)
                .await?;
            return Err(CheckoutError::PaymentNotSettled(format!(
                "payment intent status is {:?}",
                intent.status
            )));
        }

        let car = self.car_repo.get_by_id(record.car_id).await?;

        if !self.car_repo.mark_booked(record.car_id).await? {
            // Charged but raced out of the car. Flag the record so support
            // can refund; the charge itself is reversible provider-side.
            error!(payment_id = %payment_id, car_id = %record.car_id, "Car booked concurrently after card charge, refund required");
            self.payment_repo
                .update_status(payment_id, PaymentRecordStatus::Cancelled)
                .await?;
            return Err(CheckoutError::CarUnavailable(record.car_id));
        }

        let booking = Booking::new(
            record.account_id,
            car.owner_id,
            record.car_id,
            record.pickup_at,
            record.dropoff_at,
            BookingCharge {
                total_price: record.amount,
                discount_percentage: record.discount_percentage,
                discount_amount: record.discount_amount,
            },
            PaymentMethod::Stripe,
            record.premium,
        );

        if let Err(e) = self.booking_repo.create(&booking).await {
            error!(payment_id = %payment_id, error = %e, "Failed to persist booking, releasing car");
            self.car_repo.release(record.car_id).await?;
            return Err(e.into());
        }

        self.payment_repo
            .update_status(payment_id, PaymentRecordStatus::Succeeded)
            .await?;

        info!(booking_id = %booking.id, payment_id = %payment_id, "Card booking created");
        Ok(booking)
    }
}
