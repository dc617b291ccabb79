//! Stripe API client.
//!
//! - Base URL: `https://api.stripe.com`
//! - Authentication: secret key via `Authorization: Bearer <key>`
//! - Request bodies are form-encoded; responses are JSON

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;

use super::{PaymentError, PaymentGateway, PaymentIntent};
use crate::config::PaymentSettings;

#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    base_url: String,
}

impl StripeGateway {
    /// Create a Stripe client from settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(settings: &PaymentSettings, secret_key: &str) -> Result<Self, PaymentError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", secret_key))
                .map_err(|e| PaymentError::Parse(format!("Invalid secret key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn handle_response(&self, response: reqwest::Response) -> Result<PaymentIntent, PaymentError> {
        let status = response.status();

        if status.is_success() {
            let intent: StripeIntent = response
                .json()
                .await
                .map_err(|e| PaymentError::Parse(format!("Failed to parse response: {e}")))?;
            return Ok(intent.into());
        }

        let body: StripeErrorBody = response.json().await.unwrap_or_default();
        Err(PaymentError::Api {
            status: status.as_u16(),
            message: body
                .error
                .and_then(|e| e.message)
                .unwrap_or_else(|| status.to_string()),
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
        metadata: &[(&str, String)],
    ) -> Result<PaymentIntent, PaymentError> {
        let mut form: Vec<(String, String)> = vec![
            ("amount".into(), amount.to_string()),
            ("currency".into(), currency.to_lowercase()),
            ("automatic_payment_methods[enabled]".into(), "true".into()),
        ];
        form.extend(
            metadata
                .iter()
                .map(|(key, value)| (format!("metadata[{}]", key), value.clone())),
        );

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .form(&form)
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError> {
        let response = self
            .client
            .get(format!("{}/v1/payment_intents/{}", self.base_url, id))
            .send()
            .await?;

        self.handle_response(response).await
    }
}

#[derive(Deserialize)]
struct StripeIntent {
    id: String,
    client_secret: Option<String>,
    amount: i64,
    currency: String,
    status: String,
}

impl From<StripeIntent> for PaymentIntent {
    fn from(intent: StripeIntent) -> Self {
        Self {
            id: intent.id,
            client_secret: intent.client_secret,
            amount: intent.amount,
            currency: intent.currency,
            status: intent.status,
        }
    }
}

#[derive(Deserialize, Default)]
struct StripeErrorBody {
    error: Option<StripeErrorDetail>,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_from_stripe_body() {
        let body = r#"{
            "id": "pi_123",
            "object": "payment_intent",
            "amount": 6375,
            "currency": "usd",
            "client_secret": "pi_123_secret_abc",
            "status": "requires_payment_method"
        }"#;
        let intent: PaymentIntent = serde_json::from_str::<StripeIntent>(body).unwrap().into();

        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.amount, 6375);
        assert_eq!(intent.client_secret.as_deref(), Some("pi_123_secret_abc"));
        assert!(!intent.is_succeeded());
    }
}
