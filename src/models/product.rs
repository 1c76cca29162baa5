use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Price in BRL cents
    pub price_cents: i64,
    /// Max installments offered for card payments
    pub installments: i32,
    /// Units left (None = unlimited)
    pub stock: Option<i64>,
    pub active: bool,
    pub slug: String,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Product {
    pub fn is_sold_out(&self) -> bool {
        matches!(self.stock, Some(n) if n <= 0)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    #[serde(default = "default_installments")]
    pub installments: i32,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Derived from `name` when absent
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_installments() -> i32 {
    1
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub description: Option<Option<String>>,
    pub price_cents: Option<i64>,
    pub installments: Option<i32>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub stock: Option<Option<i64>>,
    pub active: Option<bool>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub image_url: Option<Option<String>>,
}
