mod asaas;

pub use asaas::*;

use axum::{Router, routing::post};

use crate::db::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/webhook/asaas", post(handle_asaas_webhook))
}
