/// Stripe client: the only module that talks to the Stripe API.
///
/// Uses the REST endpoints directly (form-encoded requests, JSON responses).
/// Only Checkout Sessions are needed: create one per purchase, read it back on return.
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::payment::{CheckoutRequest, PaymentProvider};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum StripeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Stripe unavailable after {retries} retries")]
    Unavailable { retries: u32 },

    #[error("Checkout session has no URL")]
    MissingUrl,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
    pub payment_status: String,
    pub client_reference_id: Option<String>,
}

impl CheckoutSession {
    /// The portfolio this session paid for, if payment completed.
    pub fn paid_portfolio(&self) -> Option<Uuid> {
        if self.payment_status != "paid" {
            return None;
        }
        self.client_reference_id.as_deref()?.parse().ok()
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
    price_id: String,
    api_base: String,
}

impl StripeClient {
    pub fn new(secret_key: String, price_id: String) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            secret_key,
            price_id,
            api_base: STRIPE_API_BASE.to_string(),
        })
    }

    /// Form fields for a one-time payment session for a single portfolio.
    fn checkout_form(&self, request: &CheckoutRequest) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("mode", "payment".to_string()),
            ("line_items[0][price]", self.price_id.clone()),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", request.success_url.clone()),
            ("cancel_url", request.cancel_url.clone()),
            ("client_reference_id", request.portfolio_id.to_string()),
            ("metadata[portfolio_id]", request.portfolio_id.to_string()),
            ("metadata[owner_id]", request.owner_id.clone()),
        ];
        if let Some(email) = request.customer_email.as_deref().filter(|e| !e.is_empty()) {
            form.push(("customer_email", email.to_string()));
        }
        form
    }

    /// Sends a request, retrying on 429 and 5xx with exponential backoff.
    async fn send<T: DeserializeOwned>(
        &self,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<T, StripeError> {
        let mut last_error: Option<StripeError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "Stripe call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match build().bearer_auth(&self.secret_key).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(StripeError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Stripe returned {}: {}", status, body);
                last_error = Some(StripeError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<StripeErrorEnvelope>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(StripeError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response.json().await?);
        }

        Err(last_error.unwrap_or(StripeError::Unavailable {
            retries: MAX_RETRIES,
        }))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{path}", self.api_base))
    }

    pub async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, StripeError> {
        let form = self.checkout_form(request);
        let session: CheckoutSession = self
            .send(|| self.request(Method::POST, "checkout/sessions").form(&form))
            .await?;
        info!(
            "Created checkout session {} for portfolio {}",
            session.id, request.portfolio_id
        );
        Ok(session)
    }

    pub async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, StripeError> {
        let path = format!("checkout/sessions/{session_id}");
        let session: CheckoutSession = self.send(|| self.request(Method::GET, &path)).await?;
        debug!(
            "Checkout session {} payment_status={}",
            session.id, session.payment_status
        );
        Ok(session)
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_checkout(&self, request: &CheckoutRequest) -> Result<String> {
        let session = self.create_session(request).await?;
        Ok(session.url.ok_or(StripeError::MissingUrl)?)
    }

    async fn paid_portfolio(&self, session_id: &str) -> Result<Option<Uuid>> {
        Ok(self.retrieve_session(session_id).await?.paid_portfolio())
    }
}
