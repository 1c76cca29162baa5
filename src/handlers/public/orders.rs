use axum::extract::State;
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::models::{Order, OrderStatus, PaymentMethod};
use crate::orders::apply_verification;

/// Order as the buyer sees it. Customer details are left out.
#[derive(Debug, Serialize)]
pub struct PublicOrder {
    pub id: String,
    pub product_id: String,
    pub amount_cents: i64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub pix_code: Option<String>,
    pub pix_qr_image: Option<String>,
    pub pix_expires_at: Option<i64>,
    /// Countdown hint for display; `pix_expired` is the authoritative flag
    pub seconds_remaining: Option<i64>,
    pub pix_expired: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl PublicOrder {
    pub fn new(order: Order, now: i64) -> Self {
        Self {
            seconds_remaining: order.pix_seconds_remaining(now),
            pix_expired: order.pix_expired_at(now),
            id: order.id,
            product_id: order.product_id,
            amount_cents: order.amount_cents,
            payment_method: order.payment_method,
            status: order.status,
            pix_code: order.pix_code,
            pix_qr_image: order.pix_qr_image,
            pix_expires_at: order.pix_expires_at,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

fn load_order(state: &AppState, id: &str) -> Result<Order> {
    let conn = state.db.get()?;
    queries::get_order_by_id(&conn, id)?
        .ok_or_else(|| AppError::NotFound("Pedido não encontrado".into()))
}

pub async fn get_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicOrder>> {
    let order = load_order(&state, &id)?;
    Ok(Json(PublicOrder::new(order, queries::now())))
}

/// Ask the payment verifier about the order and apply any status change.
pub async fn verify_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicOrder>> {
    let order = load_order(&state, &id)?;
    let outcome = state.verifier.verify(&order).await?;

    let conn = state.db.get()?;
    let order = apply_verification(&conn, order, outcome)?;
    Ok(Json(PublicOrder::new(order, queries::now())))
}
