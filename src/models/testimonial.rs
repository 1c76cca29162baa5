use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: String,
    pub product_id: String,
    pub author_name: String,
    pub text: String,
    /// 1..=5
    pub rating: i32,
    pub avatar_url: Option<String>,
    pub active: bool,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateTestimonial {
    pub author_name: String,
    pub text: String,
    #[serde(default = "default_rating")]
    pub rating: i32,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTestimonial {
    pub author_name: Option<String>,
    pub text: Option<String>,
    pub rating: Option<i32>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub avatar_url: Option<Option<String>>,
    pub active: Option<bool>,
}

fn default_rating() -> i32 {
    5
}

fn default_true() -> bool {
    true
}
