use serde::{Deserialize, Serialize};

/// Card details kept for an order.
///
/// The full card number and CVV are never stored. `fingerprint` is a keyed
/// hash of the number and `processor_token` is whatever the processor returned
/// for reuse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub id: String,
    pub order_id: String,
    pub holder_name: String,
    pub card_brand: String,
    pub card_last4: String,
    pub expiry_month: u32,
    pub expiry_year: u32,
    #[serde(skip_serializing)]
    pub fingerprint: String,
    #[serde(skip_serializing)]
    pub processor_token: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone)]
pub struct CreatePaymentInfo {
    pub order_id: String,
    pub holder_name: String,
    pub card_brand: String,
    pub card_last4: String,
    pub expiry_month: u32,
    pub expiry_year: u32,
    pub fingerprint: String,
    pub processor_token: Option<String>,
}

/// Joined row for the admin payment records list and CSV export.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRecord {
    pub order_id: String,
    pub created_at: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub amount_cents: i64,
    pub payment_method: String,
    pub status: String,
    pub card_brand: Option<String>,
    pub card_last4: Option<String>,
    pub holder_name: Option<String>,
}
