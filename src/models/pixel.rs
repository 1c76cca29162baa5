use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PixelKind {
    Facebook,
    GoogleTagManager,
    GoogleAds,
    Tiktok,
}

/// Marketing tracking pixel injected on a product's checkout page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pixel {
    pub id: String,
    pub product_id: String,
    pub kind: PixelKind,
    pub pixel_id: String,
    pub active: bool,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreatePixel {
    pub kind: PixelKind,
    pub pixel_id: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}
