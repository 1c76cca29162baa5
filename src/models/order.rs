use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentMethod {
    Pix,
    Cartao,
    Boleto,
}

/// Order status. Any status may be set from any other; there is no state machine.
///
/// `Falhou` keeps its capitalised wire spelling from the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString)]
pub enum OrderStatus {
    #[serde(rename = "pendente")]
    #[strum(serialize = "pendente")]
    Pendente,
    #[serde(rename = "pago")]
    #[strum(serialize = "pago")]
    Pago,
    #[serde(rename = "cancelado")]
    #[strum(serialize = "cancelado")]
    Cancelado,
    #[serde(rename = "Falhou", alias = "falhou")]
    #[strum(to_string = "Falhou", serialize = "falhou")]
    Falhou,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pendente,
        OrderStatus::Pago,
        OrderStatus::Cancelado,
        OrderStatus::Falhou,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub product_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub customer_cpf: Option<String>,
    pub amount_cents: i64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    /// Charge id at the payment processor, when one was created
    pub processor_payment_id: Option<String>,
    /// PIX copy-paste code shown to the buyer
    pub pix_code: Option<String>,
    /// Base64 PNG of the PIX QR code, when the processor returned one
    pub pix_qr_image: Option<String>,
    /// Server-issued absolute PIX expiration (Unix seconds)
    pub pix_expires_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Server-side PIX expiration check. The only authoritative one.
    pub fn pix_expired_at(&self, now: i64) -> bool {
        self.status == OrderStatus::Pendente
            && matches!(self.pix_expires_at, Some(exp) if now >= exp)
    }

    /// Seconds until the PIX code expires, clamped at zero. None for non-PIX orders.
    pub fn pix_seconds_remaining(&self, now: i64) -> Option<i64> {
        self.pix_expires_at.map(|exp| (exp - now).max(0))
    }
}

/// Fields needed to insert an order. Processor fields are filled in afterwards.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub product_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub customer_cpf: Option<String>,
    pub amount_cents: i64,
    pub payment_method: PaymentMethod,
    pub pix_code: Option<String>,
    pub pix_expires_at: Option<i64>,
}

/// Processor-side details attached to an order after the charge is created.
#[derive(Debug, Clone, Default)]
pub struct OrderProcessorDetails {
    pub processor_payment_id: Option<String>,
    pub pix_code: Option<String>,
    pub pix_qr_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub product_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_wire_spelling() {
        assert_eq!(serde_json::to_string(&OrderStatus::Falhou).unwrap(), "\"Falhou\"");
        assert_eq!(serde_json::to_string(&OrderStatus::Pago).unwrap(), "\"pago\"");
        let parsed: OrderStatus = serde_json::from_str("\"falhou\"").unwrap();
        assert_eq!(parsed, OrderStatus::Falhou);
    }

    #[test]
    fn test_status_db_spelling() {
        assert_eq!(OrderStatus::Falhou.as_ref(), "Falhou");
        assert_eq!(OrderStatus::from_str("cancelado").unwrap(), OrderStatus::Cancelado);
        assert!(OrderStatus::from_str("shipped").is_err());
    }

    #[test]
    fn test_pix_expiration_is_server_side() {
        let order = Order {
            id: "o".into(),
            product_id: "p".into(),
            customer_name: "Ana".into(),
            customer_email: "ana@example.com".into(),
            customer_phone: None,
            customer_cpf: None,
            amount_cents: 1000,
            payment_method: PaymentMethod::Pix,
            status: OrderStatus::Pendente,
            processor_payment_id: None,
            pix_code: Some("000201".into()),
            pix_qr_image: None,
            pix_expires_at: Some(1_000),
            created_at: 100,
            updated_at: 100,
        };
        assert!(!order.pix_expired_at(999));
        assert!(order.pix_expired_at(1_000));
        assert_eq!(order.pix_seconds_remaining(400), Some(600));
        assert_eq!(order.pix_seconds_remaining(5_000), Some(0));

        let paid = Order { status: OrderStatus::Pago, ..order };
        assert!(!paid.pix_expired_at(5_000));
    }
}
