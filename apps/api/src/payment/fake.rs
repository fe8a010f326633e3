use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use uuid::Uuid;

use crate::payment::{CheckoutRequest, PaymentProvider};

/// Records checkouts and answers session lookups from a fixed table.
#[derive(Default)]
pub struct FakePaymentProvider {
    pub checkouts: Mutex<Vec<CheckoutRequest>>,
    /// session id → paid portfolio (`None` = session exists, unpaid).
    pub sessions: Mutex<HashMap<String, Option<Uuid>>>,
}

impl FakePaymentProvider {
    pub fn with_paid_session(session_id: &str, portfolio_id: Uuid) -> Self {
        let fake = Self::default();
        fake.sessions
            .lock()
            .unwrap()
            .insert(session_id.to_string(), Some(portfolio_id));
        fake
    }
}

#[async_trait]
impl PaymentProvider for FakePaymentProvider {
    async fn create_checkout(&self, request: &CheckoutRequest) -> Result<String> {
        self.checkouts.lock().unwrap().push(request.clone());
        Ok(format!("https://pay.test/checkout/{}", request.portfolio_id))
    }

    async fn paid_portfolio(&self, session_id: &str) -> Result<Option<Uuid>> {
        match self.sessions.lock().unwrap().get(session_id) {
            Some(paid) => Ok(*paid),
            None => bail!("no such session {session_id}"),
        }
    }
}
