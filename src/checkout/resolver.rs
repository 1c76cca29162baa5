use crate::db::{DbPool, queries};
use crate::error::Result;

use super::effective::{EffectiveCheckoutConfig, merge};

/// Resolve the effective checkout configuration for a product.
///
/// Never fails: each stored source that cannot be read is logged and skipped,
/// and a missing or empty product id returns the defaults without a lookup.
pub fn resolve_checkout_config(pool: &DbPool, product_id: Option<&str>) -> EffectiveCheckoutConfig {
    let Some(product_id) = product_id.map(str::trim).filter(|id| !id.is_empty()) else {
        return EffectiveCheckoutConfig::default();
    };

    let checkout = load_source(pool, product_id, "checkout_config", |conn| {
        queries::get_checkout_config(conn, product_id)
    });
    let pix = load_source(pool, product_id, "pix_page_config", |conn| {
        queries::get_pix_config(conn, product_id)
    });

    merge(checkout.as_ref(), pix.as_ref())
}

fn load_source<T>(
    pool: &DbPool,
    product_id: &str,
    source: &'static str,
    fetch: impl FnOnce(&rusqlite::Connection) -> Result<Option<T>>,
) -> Option<T> {
    let result = pool
        .get()
        .map_err(Into::into)
        .and_then(|conn| fetch(&conn));

    match result {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(
                product_id = %product_id,
                source,
                error = %e,
                "Failed to load checkout config source, using defaults for it"
            );
            None
        }
    }
}

