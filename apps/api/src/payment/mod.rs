//! Payment gate: a portfolio is viewable once paid for.

pub mod handlers;
pub mod stripe;

#[cfg(test)]
pub mod fake;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::PaymentStatus;

pub use stripe::StripeClient;

/// Everything needed to open a checkout for one portfolio.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub portfolio_id: Uuid,
    pub owner_id: String,
    pub customer_email: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

/// Pluggable payment provider. Default: Stripe Checkout.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Opens a one-time checkout and returns the URL to send the buyer to.
    async fn create_checkout(&self, request: &CheckoutRequest) -> Result<String>;

    /// Resolves a completed session to the portfolio it paid for.
    /// `None` when the session exists but is not paid.
    async fn paid_portfolio(&self, session_id: &str) -> Result<Option<Uuid>>;
}

/// Whether the public viewer may show a portfolio.
pub fn can_view(status: PaymentStatus, bypass_payment: bool) -> bool {
    bypass_payment || status == PaymentStatus::Paid
}
