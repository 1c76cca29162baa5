mod asaas_settings;
mod checkout_config;
mod customization;
mod order;
mod payment_info;
mod pixel;
mod product;
mod testimonial;

pub use asaas_settings::*;
pub use checkout_config::*;
pub use customization::*;
pub use order::*;
pub use payment_info::*;
pub use pixel::*;
pub use product::*;
pub use testimonial::*;

use serde::{Deserialize, Deserializer};

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let absent: UpdateProduct = serde_json::from_str(r#"{"name": "Novo"}"#).unwrap();
        assert_eq!(absent.stock, None);

        let cleared: UpdateProduct = serde_json::from_str(r#"{"stock": null}"#).unwrap();
        assert_eq!(cleared.stock, Some(None));

        let set: UpdateProduct = serde_json::from_str(r#"{"stock": 3}"#).unwrap();
        assert_eq!(set.stock, Some(Some(3)));
    }
}
