use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

#[derive(Error, Debug)]
pub enum StripeError {
    #[error("API request failed: {0}")]
    RequestFailed(String),
    #[error("Card declined: {0}")]
    CardDeclined(String),
    #[error("Payment intent not found: {0}")]
    NotFound(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Check if status code is retryable (500, 502, 503)
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 500 | 502 | 503)
}

/// Stripe charges in the currency's minor unit (cents).
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
    pub status: PaymentIntentStatus,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    Succeeded,
    Canceled,
}

/// Seam for the card-charge provider so checkout logic can be exercised
/// without network access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment intent for `amount_minor` in `currency`. The
    /// idempotency key makes client retries safe against double-charging.
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        idempotency_key: &str,
    ) -> Result<PaymentIntent, StripeError>;

    async fn retrieve_payment_intent(&self, intent_id: &str) -> Result<PaymentIntent, StripeError>;
}

pub struct StripeClient {
    client: Client,
    base_url: String,
}

impl StripeClient {
    pub fn new(secret_key: String) -> Result<Self, StripeError> {
        let mut headers = header::HeaderMap::new();
        let auth_value = match header::HeaderValue::from_str(&format!("Bearer {}", secret_key)) {
            Ok(val) => val,
            Err(e) => {
                return Err(StripeError::InvalidConfig(format!(
                    "Invalid secret key format: {}",
                    e
                )))
            }
        };
        headers.insert(header::AUTHORIZATION, auth_value);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| {
                StripeError::InvalidConfig(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: "https://api.stripe.com/v1".to_string(),
        })
    }

    async fn send_with_retry<F>(
        &self,
        mut request_builder: F,
        not_found_id: Option<&str>,
    ) -> Result<reqwest::Response, StripeError>
    where
        F: FnMut() -> reqwest::RequestBuilder,
    {
        let mut last_error: Option<String> = None;

        for attempt in 0..MAX_RETRIES {
            let response = request_builder().send().await;

            match response {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    if status == 429 {
                        return Err(StripeError::RateLimited);
                    }

                    if status == 404 {
                        if let Some(id) = not_found_id {
                            return Err(StripeError::NotFound(id.to_string()));
                        }
                    }

                    if is_retryable_status(status) && attempt < MAX_RETRIES - 1 {
                        let backoff = INITIAL_BACKOFF_MS * 2_u64.pow(attempt);
                        sleep(Duration::from_millis(backoff)).await;
                        continue;
                    }

                    return Ok(resp);
                }
                Err(e) => {
                    last_error = Some(e.to_string());
                    if attempt < MAX_RETRIES - 1 {
                        let backoff = INITIAL_BACKOFF_MS * 2_u64.pow(attempt);
                        sleep(Duration::from_millis(backoff)).await;
                    }
                }
            }
        }

        Err(StripeError::RequestFailed(
            last_error.unwrap_or_else(|| "Max retries exceeded".to_string()),
        ))
    }

    async fn parse_intent(resp: reqwest::Response) -> Result<PaymentIntent, StripeError> {
        let status = resp.status().as_u16();

        if status == 402 {
            let body: serde_json::Value = resp
                .json()
                .await
                .map_err(|e| StripeError::InvalidResponse(e.to_string()))?;
            let message = body
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .unwrap_or("Your card was declined");
            return Err(StripeError::CardDeclined(message.to_string()));
        }

        if !(200..300).contains(&status) {
            let error_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StripeError::RequestFailed(error_text));
        }

        resp.json::<PaymentIntent>()
            .await
            .map_err(|e| StripeError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        idempotency_key: &str,
    ) -> Result<PaymentIntent, StripeError> {
        let amount = amount_minor.to_string();
        let params = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("automatic_payment_methods[enabled]", "true"),
        ];

        let resp = self
            .send_with_retry(
                || {
                    self.client
                        .post(format!("{}/payment_intents", self.base_url))
                        .header("Idempotency-Key", idempotency_key)
                        .form(&params)
                },
                None,
            )
            .await?;

        Self::parse_intent(resp).await
    }

    async fn retrieve_payment_intent(&self, intent_id: &str) -> Result<PaymentIntent, StripeError> {
        let resp = self
            .send_with_retry(
                || {
                    self.client
                        .get(format!("{}/payment_intents/{}", self.base_url, intent_id))
                },
                Some(intent_id),
            )
            .await?;

        Self::parse_intent(resp).await
    }
}
