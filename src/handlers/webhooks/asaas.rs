use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::db::{AppState, queries};
use crate::orders::apply_verification;
use crate::payments::{AsaasWebhookEvent, outcome_for_webhook_event, verify_webhook_token};

const PROVIDER: &str = "asaas";

/// Payment status notifications from Asaas.
///
/// Anything that is not an actionable, authenticated, first-seen event is
/// acknowledged with 200 so the processor stops retrying it.
pub async fn handle_asaas_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let event: AsaasWebhookEvent = match serde_json::from_slice(&body) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to parse Asaas webhook: {}", e);
            return (StatusCode::BAD_REQUEST, "Invalid JSON");
        }
    };

    let conn = match state.db.get() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("DB connection error: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        }
    };

    let settings = match queries::get_asaas_settings(&conn, &state.master_key) {
        Ok(Some(s)) if s.webhook_token.is_some() => s,
        Ok(_) => {
            tracing::warn!(event_id = %event.id, "Asaas webhook received but no webhook token is configured");
            return (StatusCode::OK, "Webhook not configured");
        }
        Err(e) => {
            tracing::error!("Failed to load Asaas settings: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error");
        }
    };

    let provided = headers
        .get("asaas-access-token")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !verify_webhook_token(&settings, provided) {
        tracing::warn!(event_id = %event.id, "Asaas webhook with invalid access token");
        return (StatusCode::UNAUTHORIZED, "Invalid access token");
    }

    let Some(outcome) = outcome_for_webhook_event(&event.event) else {
        return (StatusCode::OK, "Event ignored");
    };
    let Some(payment) = &event.payment else {
        return (StatusCode::OK, "No payment in event");
    };

    // Dedup row and status write commit together
    let tx = match conn.unchecked_transaction() {
        Ok(tx) => tx,
        Err(e) => {
            tracing::error!("Failed to start webhook transaction: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        }
    };

    match queries::try_record_webhook_event(&tx, PROVIDER, &event.id) {
        Ok(true) => {}
        Ok(false) => return (StatusCode::OK, "Already processed"),
        Err(e) => {
            tracing::error!("Failed to record webhook event: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        }
    }

    let by_reference = match payment.external_reference.as_deref() {
        Some(order_id) => queries::get_order_by_id(&tx, order_id),
        None => Ok(None),
    };
    let order = match by_reference {
        Ok(Some(order)) => Ok(Some(order)),
        Ok(None) => queries::get_order_by_processor_payment_id(&tx, &payment.id),
        Err(e) => Err(e),
    };

    let order = match order {
        Ok(Some(order)) => order,
        Ok(None) => {
            tracing::warn!(
                event_id = %event.id,
                payment_id = %payment.id,
                "Asaas webhook for unknown order"
            );
            if let Err(e) = tx.commit() {
                tracing::error!("Failed to commit webhook event: {}", e);
                return (StatusCode::INTERNAL_SERVER_ERROR, "Database error");
            }
            return (StatusCode::OK, "Order not found");
        }
        Err(e) => {
            tracing::error!("Failed to look up order: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        }
    };

    let order_id = order.id.clone();
    let applied = apply_verification(&tx, order, outcome)
        .and_then(|order| tx.commit().map(|_| order).map_err(Into::into));
    match applied {
        Ok(order) => {
            tracing::info!(
                order_id = %order_id,
                event = %event.event,
                status = order.status.as_ref(),
                "Applied Asaas webhook"
            );
            (StatusCode::OK, "OK")
        }
        Err(e) => {
            tracing::error!(order_id = %order_id, "Failed to update order from webhook: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        }
    }
}
