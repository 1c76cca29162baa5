use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::db::{AppState, queries};
use crate::error::Result;
use crate::extractors::Json;
use crate::models::PaymentRecord;
use crate::util::payments_csv;

pub async fn list_payments(State(state): State<AppState>) -> Result<Json<Vec<PaymentRecord>>> {
    let conn = state.db.get()?;
    Ok(Json(queries::list_payment_records(&conn)?))
}

pub async fn export_payments_csv(State(state): State<AppState>) -> Result<Response> {
    let conn = state.db.get()?;
    let records = queries::list_payment_records(&conn)?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"pagamentos.csv\"",
        ),
    ];
    Ok((headers, payments_csv(&records)).into_response())
}
