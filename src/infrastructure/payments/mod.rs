//! Payment processor integration.
//!
//! Checkout only needs two calls: create a payment intent for the cart total,
//! and later retrieve it to confirm the charge went through.

mod stripe;

pub use stripe::StripeGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Intent status that marks a completed charge.
pub const STATUS_SUCCEEDED: &str = "succeeded";

/// A payment intent as returned to the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub id: String,
    /// Handed to the browser to confirm the payment; never stored
    pub client_secret: Option<String>,
    /// Amount in the smallest currency unit
    pub amount: i64,
    pub currency: String,
    pub status: String,
}

impl PaymentIntent {
    pub fn is_succeeded(&self) -> bool {
        self.status == STATUS_SUCCEEDED
    }
}

/// Errors that can occur when talking to the payment processor.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Payment processor seam; implemented by [`StripeGateway`].
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an intent for `amount` (smallest currency unit).
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
        metadata: &[(&str, String)],
    ) -> Result<PaymentIntent, PaymentError>;

    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError>;
}
