mod config;
mod content;
mod dashboard;
mod orders;
mod payments;
mod products;
mod settings;

pub use config::*;
pub use content::*;
pub use dashboard::*;
pub use orders::*;
pub use payments::*;
pub use products::*;
pub use settings::*;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::db::AppState;
use crate::middleware::admin_auth;

/// Back-office routes, mounted under `/admin`.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        // Products
        .route("/products", post(create_product).get(list_products))
        .route("/products/by-slug/{slug}", get(get_product_by_slug))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        // Checkout page configuration
        .route(
            "/products/{id}/checkout-config",
            get(get_checkout_config).put(put_checkout_config),
        )
        .route(
            "/products/{id}/checkout-config/effective",
            get(get_effective_config),
        )
        .route(
            "/products/{id}/pix-config",
            get(get_pix_config).put(put_pix_config),
        )
        .route(
            "/products/{id}/customization",
            get(get_customization).put(put_customization),
        )
        // Pixels and testimonials
        .route("/products/{id}/pixels", post(create_pixel).get(list_pixels))
        .route("/pixels/{id}", delete(delete_pixel))
        .route(
            "/products/{id}/testimonials",
            post(create_testimonial).get(list_testimonials),
        )
        .route(
            "/testimonials/{id}",
            put(update_testimonial).delete(delete_testimonial),
        )
        // Orders and payments
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", put(update_order_status))
        .route("/payments", get(list_payments))
        .route("/payments/export.csv", get(export_payments_csv))
        // Settings and overview
        .route(
            "/settings/asaas",
            get(get_asaas_settings).put(put_asaas_settings),
        )
        .route("/dashboard", get(get_dashboard))
        .route_layer(middleware::from_fn_with_state(state, admin_auth))
}
