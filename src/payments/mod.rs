mod asaas;
mod card;

pub use asaas::*;
pub use card::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Order, OrderStatus};

/// Result of asking the processor whether an order has been paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationOutcome {
    Pending,
    Paid,
    Failed,
    Cancelled,
}

impl VerificationOutcome {
    pub fn order_status(self) -> OrderStatus {
        match self {
            VerificationOutcome::Pending => OrderStatus::Pendente,
            VerificationOutcome::Paid => OrderStatus::Pago,
            VerificationOutcome::Failed => OrderStatus::Falhou,
            VerificationOutcome::Cancelled => OrderStatus::Cancelado,
        }
    }
}

/// Checks an order's payment status with whoever actually holds the money.
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    async fn verify(&self, order: &Order) -> Result<VerificationOutcome>;
}

/// Verifier that always answers with the same outcome. Used in tests and
/// for local development without processor credentials.
#[derive(Debug, Clone, Copy)]
pub struct FixedVerifier(pub VerificationOutcome);

#[async_trait]
impl PaymentVerifier for FixedVerifier {
    async fn verify(&self, _order: &Order) -> Result<VerificationOutcome> {
        Ok(self.0)
    }
}
