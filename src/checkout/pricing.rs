use crate::models::Product;

use super::effective::EffectiveCheckoutConfig;

/// Price after subtracting a fixed discount, never below zero.
pub fn final_price_cents(original_cents: i64, discount_cents: i64) -> i64 {
    (original_cents - discount_cents.max(0)).max(0)
}

/// What the buyer is charged for `product` under `config`.
pub fn checkout_price_cents(product: &Product, config: &EffectiveCheckoutConfig) -> i64 {
    if config.discount_enabled {
        final_price_cents(product.price_cents, config.discount_amount_cents)
    } else {
        product.price_cents
    }
}

/// Per-installment display value, rounded up so installments cover the total.
pub fn installment_value_cents(total_cents: i64, installments: i32) -> i64 {
    let n = i64::from(installments.max(1));
    (total_cents + n - 1) / n
}
