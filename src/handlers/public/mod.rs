mod checkout;
mod orders;

pub use checkout::*;
pub use orders::*;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::db::AppState;
use crate::extractors::Json;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/checkout/{slug}", get(get_checkout_page))
        .route("/checkout/{slug}/orders", post(create_order))
        .route("/orders/{id}", get(get_order_status))
        .route("/orders/{id}/verify", post(verify_order))
}
