use std::collections::BTreeMap;

use axum::extract::State;
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::Result;
use crate::extractors::Json;
use crate::models::OrderStatus;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub products: usize,
    pub orders_by_status: BTreeMap<String, i64>,
    pub total_orders: i64,
    /// Sum of paid orders, in cents
    pub revenue_cents: i64,
}

pub async fn get_dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>> {
    let conn = state.db.get()?;
    let (counts, revenue_cents) = queries::order_stats(&conn)?;
    let products = queries::list_products(&conn)?.len();

    let mut orders_by_status: BTreeMap<String, i64> = OrderStatus::ALL
        .iter()
        .map(|s| (s.as_ref().to_string(), 0))
        .collect();
    for (status, count) in counts {
        orders_by_status.insert(status, count);
    }

    Ok(Json(Dashboard {
        products,
        total_orders: orders_by_status.values().sum(),
        orders_by_status,
        revenue_cents,
    }))
}
