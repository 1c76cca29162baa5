use axum::extract::State;
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path, Query};
use crate::models::{Order, OrderFilter, PaymentInfo, UpdateOrderStatus};
use crate::orders::transition_order_status;

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub payment_info: Option<PaymentInfo>,
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<Order>>> {
    let conn = state.db.get()?;
    Ok(Json(queries::list_orders(&conn, &filter)?))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderDetail>> {
    let conn = state.db.get()?;
    let order = queries::get_order_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Pedido não encontrado".into()))?;
    let payment_info = queries::get_payment_info_for_order(&conn, &id)?;
    Ok(Json(OrderDetail { order, payment_info }))
}

/// Set an order's status directly. Any status is accepted from any other.
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateOrderStatus>,
) -> Result<Json<Order>> {
    let conn = state.db.get()?;
    let order = transition_order_status(&conn, &id, input.status)?.ok_or_else(|| {
        AppError::NotFound("Não foi possível atualizar o status: pedido não encontrado".into())
    })?;
    Ok(Json(order))
}
