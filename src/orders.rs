//! Order status changes shared by the admin surface, the verify endpoint and webhooks.

use rusqlite::Connection;

use crate::db::queries;
use crate::error::Result;
use crate::models::{Order, OrderStatus};
use crate::payments::VerificationOutcome;

/// Set an order's status, whatever it currently is.
///
/// Returns the order as stored after the write, or `Ok(None)` if no order has
/// this id. `updated_at` on the returned order is strictly newer than before.
pub fn transition_order_status(
    conn: &Connection,
    order_id: &str,
    status: OrderStatus,
) -> Result<Option<Order>> {
    if !queries::set_order_status(conn, order_id, status)? {
        tracing::warn!(order_id, status = status.as_ref(), "Status update for unknown order");
        return Ok(None);
    }

    tracing::info!(order_id, status = status.as_ref(), "Order status updated");
    queries::get_order_by_id(conn, order_id)
}

/// Apply a verification outcome. Writes only when the outcome differs from
/// the stored status; `Pending` never overwrites anything.
pub fn apply_verification(
    conn: &Connection,
    order: Order,
    outcome: VerificationOutcome,
) -> Result<Order> {
    let status = outcome.order_status();
    if outcome == VerificationOutcome::Pending || status == order.status {
        return Ok(order);
    }

    Ok(transition_order_status(conn, &order.id, status)?.unwrap_or(order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::models::{CreateOrder, CreateProduct, PaymentMethod};

    fn setup() -> (Connection, Order) {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        let product = queries::create_product(
            &conn,
            &CreateProduct {
                name: "Ebook".into(),
                description: None,
                price_cents: 4990,
                installments: 1,
                stock: None,
                active: true,
                slug: None,
                image_url: None,
            },
            "ebook",
        )
        .unwrap();
        let order = queries::create_order(
            &conn,
            &CreateOrder {
                product_id: product.id,
                customer_name: "Ana".into(),
                customer_email: "ana@example.com".into(),
                customer_phone: None,
                customer_cpf: None,
                amount_cents: 4990,
                payment_method: PaymentMethod::Pix,
                pix_code: None,
                pix_expires_at: None,
            },
            queries::now(),
        )
        .unwrap();
        (conn, order)
    }

    #[test]
    fn test_transition_moves_updated_at_forward() {
        let (conn, order) = setup();

        let paid = transition_order_status(&conn, &order.id, OrderStatus::Pago)
            .unwrap()
            .unwrap();
        assert_eq!(paid.status, OrderStatus::Pago);
        assert!(paid.updated_at > order.updated_at);

        // No state machine: a paid order can go back to pending
        let back = transition_order_status(&conn, &order.id, OrderStatus::Pendente)
            .unwrap()
            .unwrap();
        assert_eq!(back.status, OrderStatus::Pendente);
        assert!(back.updated_at > paid.updated_at);
    }

    #[test]
    fn test_transition_missing_order() {
        let (conn, _) = setup();
        let result = transition_order_status(&conn, "missing", OrderStatus::Pago).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_pending_outcome_does_not_write() {
        let (conn, order) = setup();
        let paid = transition_order_status(&conn, &order.id, OrderStatus::Pago)
            .unwrap()
            .unwrap();

        let unchanged = apply_verification(&conn, paid.clone(), VerificationOutcome::Pending).unwrap();
        assert_eq!(unchanged.status, OrderStatus::Pago);
        assert_eq!(unchanged.updated_at, paid.updated_at);

        let failed = apply_verification(&conn, paid, VerificationOutcome::Failed).unwrap();
        assert_eq!(failed.status, OrderStatus::Falhou);
    }
}
