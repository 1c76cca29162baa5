use serde::{Deserialize, Serialize};

const DEFAULT_GUARANTEE_DAYS: i32 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// Display-only checkout customization (benefits, FAQ, guarantee, testimonials).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutCustomization {
    pub product_id: String,
    pub benefits: Vec<String>,
    pub faqs: Vec<Faq>,
    pub show_guarantee: bool,
    pub guarantee_days: i32,
    pub guarantee_text: Option<String>,
    pub show_testimonials: bool,
    pub updated_at: i64,
}

impl CheckoutCustomization {
    /// What a product without a stored customization row renders with.
    pub fn default_for(product_id: &str) -> Self {
        Self {
            product_id: product_id.to_string(),
            benefits: Vec::new(),
            faqs: Vec::new(),
            show_guarantee: false,
            guarantee_days: DEFAULT_GUARANTEE_DAYS,
            guarantee_text: None,
            show_testimonials: false,
            updated_at: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertCustomization {
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub faqs: Vec<Faq>,
    #[serde(default)]
    pub show_guarantee: bool,
    #[serde(default = "default_guarantee_days")]
    pub guarantee_days: i32,
    #[serde(default)]
    pub guarantee_text: Option<String>,
    #[serde(default)]
    pub show_testimonials: bool,
}

fn default_guarantee_days() -> i32 {
    DEFAULT_GUARANTEE_DAYS
}
