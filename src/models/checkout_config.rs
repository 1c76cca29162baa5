use serde::{Deserialize, Serialize};

use super::PaymentMethod;

/// Per-product checkout page configuration as stored.
///
/// Every field is optional; anything left unset falls through to the
/// default table when the effective configuration is resolved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutConfig {
    pub product_id: String,
    pub background_color: Option<String>,
    pub button_color: Option<String>,
    pub button_text_color: Option<String>,
    pub button_text: Option<String>,
    pub show_visitor_counter: Option<bool>,
    pub visitor_count_min: Option<i32>,
    pub visitor_count_max: Option<i32>,
    pub show_timer: Option<bool>,
    pub timer_minutes: Option<i32>,
    pub timer_text: Option<String>,
    pub discount_enabled: Option<bool>,
    pub discount_amount_cents: Option<i64>,
    pub discount_badge_text: Option<String>,
    pub banner_url: Option<String>,
    pub header_text: Option<String>,
    pub footer_text: Option<String>,
    pub pix_key: Option<String>,
    pub payment_methods: Option<Vec<PaymentMethod>>,
    pub updated_at: i64,
}

/// Upsert body for the checkout config. Absent fields are stored as NULL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpsertCheckoutConfig {
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub button_color: Option<String>,
    #[serde(default)]
    pub button_text_color: Option<String>,
    #[serde(default)]
    pub button_text: Option<String>,
    #[serde(default)]
    pub show_visitor_counter: Option<bool>,
    #[serde(default)]
    pub visitor_count_min: Option<i32>,
    #[serde(default)]
    pub visitor_count_max: Option<i32>,
    #[serde(default)]
    pub show_timer: Option<bool>,
    #[serde(default)]
    pub timer_minutes: Option<i32>,
    #[serde(default)]
    pub timer_text: Option<String>,
    #[serde(default)]
    pub discount_enabled: Option<bool>,
    #[serde(default)]
    pub discount_amount_cents: Option<i64>,
    #[serde(default)]
    pub discount_badge_text: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub header_text: Option<String>,
    #[serde(default)]
    pub footer_text: Option<String>,
    #[serde(default)]
    pub pix_key: Option<String>,
    #[serde(default)]
    pub payment_methods: Option<Vec<PaymentMethod>>,
}

/// Per-product PIX page configuration as stored (`pix_page_config`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PixConfig {
    pub product_id: String,
    /// PIX copy-paste ("copia e cola") code
    pub copy_paste_code: Option<String>,
    pub qr_code_url: Option<String>,
    pub beneficiary_name: Option<String>,
    pub expiration_minutes: Option<i32>,
    pub page_title: Option<String>,
    pub instructions: Option<String>,
    pub success_message: Option<String>,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpsertPixConfig {
    #[serde(default)]
    pub copy_paste_code: Option<String>,
    #[serde(default)]
    pub qr_code_url: Option<String>,
    #[serde(default)]
    pub beneficiary_name: Option<String>,
    #[serde(default)]
    pub expiration_minutes: Option<i32>,
    #[serde(default)]
    pub page_title: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub success_message: Option<String>,
}
