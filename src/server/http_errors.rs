use crate::application::{CheckoutError, LifecycleError, PricingError};
use crate::infrastructure::{RepositoryError, StripeError};
use axum::http::StatusCode;

pub(super) fn map_checkout_error(err: &CheckoutError) -> (StatusCode, serde_json::Value) {
    match err {
        CheckoutError::Repository(RepositoryError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            serde_json::json!({ "error": "Car not found" }),
        ),
        CheckoutError::CarUnavailable(_) => (
            StatusCode::CONFLICT,
            serde_json::json!({ "error": "Car is no longer available" }),
        ),
        CheckoutError::SubscriptionRequired(msg) => (
            StatusCode::FORBIDDEN,
            serde_json::json!({ "error": msg }),
        ),
        CheckoutError::Pricing(PricingError::InvalidWindow) => (
            StatusCode::BAD_REQUEST,
            serde_json::json!({ "error": "Dropoff must be at least one hour after pickup" }),
        ),
        CheckoutError::InsufficientFunds => (
            StatusCode::PAYMENT_REQUIRED,
            serde_json::json!({ "error": "Insufficient wallet balance" }),
        ),
        CheckoutError::Stripe(StripeError::CardDeclined(msg)) => (
            StatusCode::PAYMENT_REQUIRED,
            serde_json::json!({ "error": msg }),
        ),
        CheckoutError::Stripe(StripeError::RateLimited) => (
            StatusCode::TOO_MANY_REQUESTS,
            serde_json::json!({ "error": "Rate limited by payment provider, please retry" }),
        ),
        CheckoutError::PaymentNotSettled(msg) => (
            StatusCode::PAYMENT_REQUIRED,
            serde_json::json!({ "error": msg }),
        ),
        CheckoutError::PaymentAlreadyResolved(status) => (
            StatusCode::CONFLICT,
            serde_json::json!({ "error": format!("Payment already {}", status) }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({ "error": "Checkout failed" }),
        ),
    }
}

pub(super) fn map_lifecycle_error(err: &LifecycleError) -> (StatusCode, serde_json::Value) {
    match err {
        LifecycleError::Repository(RepositoryError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            serde_json::json!({ "error": "Booking not found" }),
        ),
        LifecycleError::InvalidState(status) => (
            StatusCode::CONFLICT,
            serde_json::json!({ "error": format!("Booking is already {}", status) }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({ "error": "Booking action failed" }),
        ),
    }
}

pub(super) fn map_repository_read_error(
    err: &RepositoryError,
    entity: &str,
) -> (StatusCode, serde_json::Value) {
    match err {
        RepositoryError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            serde_json::json!({ "error": format!("{} not found", entity) }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({ "error": format!("Failed to fetch {}", entity.to_lowercase()) }),
        ),
    }
}
