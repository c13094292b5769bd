use crate::domain::{Booking, BookingPaymentStatus, PaymentMethod};
use crate::infrastructure::{BookingRepository, CarRepository, RepositoryError, WalletRepository};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Booking not in valid state: {0:?}")]
    InvalidState(BookingPaymentStatus),
}

pub struct BookingLifecycleService<B, C, W>
where
    B: BookingRepository,
    C: CarRepository,
    W: WalletRepository,
{
    booking_repo: Arc<B>,
    car_repo: Arc<C>,
    wallet_repo: Arc<W>,
}

impl<B, C, W> BookingLifecycleService<B, C, W>
where
    B: BookingRepository,
    C: CarRepository,
    W: WalletRepository,
{
    pub fn new(booking_repo: Arc<B>, car_repo: Arc<C>, wallet_repo: Arc<W>) -> Self {
        Self {
            booking_repo,
            car_repo,
            wallet_repo,
        }
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> Result<Booking, LifecycleError> {
        Ok(self.booking_repo.get_by_id(booking_id).await?)
    }

    pub async fn list_renter_bookings(
        &self,
        renter_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, LifecycleError> {
        Ok(self
            .booking_repo
            .list_by_renter_paginated(renter_id, limit, offset)
            .await?)
    }

    pub async fn count_renter_bookings(&self, renter_id: Uuid) -> Result<i64, LifecycleError> {
        Ok(self.booking_repo.count_by_renter(renter_id).await?)
    }

    /// Cancel a paid booking: the car goes back to `Available` and wallet
    /// payments are refunded in full. Card refunds run provider-side and
    /// are out of scope here.
    pub async fn cancel_booking(&self, booking_id: Uuid) -> Result<(), LifecycleError> {
        let booking = self.booking_repo.get_by_id(booking_id).await?;

        if booking.payment_status != BookingPaymentStatus::Paid {
            return Err(LifecycleError::InvalidState(booking.payment_status));
        }

        if !self.car_repo.release(booking.car_id).await? {
            // Status drifted (e.g. manual moderation); log and carry on.
            warn!(car_id = %booking.car_id, "Car was not in booked state at cancellation");
        }

        if booking.payment_method == PaymentMethod::Wallet {
            self.wallet_repo
                .credit(booking.renter_id, booking.total_price)
                .await?;
        }

        self.booking_repo
            .update_payment_status(booking_id, BookingPaymentStatus::Refunded)
            .await?;

        info!(booking_id = %booking_id, car_id = %booking.car_id, "Booking cancelled");
        Ok(())
    }

    /// Complete a rental: the car is released and the booking moves to the
    /// terminal `Completed` state, so a finished rental can no longer be
    /// cancelled and refunded.
    pub async fn complete_booking(&self, booking_id: Uuid) -> Result<(), LifecycleError> {
        let booking = self.booking_repo.get_by_id(booking_id).await?;

        if booking.payment_status != BookingPaymentStatus::Paid {
            return Err(LifecycleError::InvalidState(booking.payment_status));
        }

        if !self.car_repo.release(booking.car_id).await? {
            warn!(car_id = %booking.car_id, "Car was not in booked state at completion");
        }

        self.booking_repo
            .update_payment_status(booking_id, BookingPaymentStatus::Completed)
            .await?;

        info!(booking_id = %booking_id, car_id = %booking.car_id, "Booking completed");
        Ok(())
    }
}
