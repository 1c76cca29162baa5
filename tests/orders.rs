//! Order status transitions, polling and payment verification.

use axum::http::StatusCode;

mod common;
use common::*;

use vitrine::orders::transition_order_status;

#[test]
fn test_transition_to_paid_is_visible_with_newer_timestamp() {
    let app = create_test_app();
    let conn = app.conn();
    let product = create_test_product(&conn, "Transição", 1000);
    let order = create_test_order(&conn, &product.id, PaymentMethod::Pix);

    let updated = transition_order_status(&conn, &order.id, OrderStatus::Pago)
        .unwrap()
        .expect("order exists");
    assert_eq!(updated.status, OrderStatus::Pago);

    let reread = queries::get_order_by_id(&conn, &order.id).unwrap().unwrap();
    assert_eq!(reread.status, OrderStatus::Pago);
    assert!(reread.updated_at > order.updated_at);
}

#[test]
fn test_transition_on_missing_order_signals_failure() {
    let app = create_test_app();
    let conn = app.conn();
    let result = transition_order_status(&conn, "00000000-0000-0000-0000-000000000000", OrderStatus::Cancelado);
    assert!(matches!(result, Ok(None)));
}

#[tokio::test]
async fn test_get_order_status_not_found() {
    let app = create_test_app();
    let (status, _) = send(app.router(), get("/orders/nao-existe")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expired_pix_is_reported_by_server() {
    let app = create_test_app();
    let order = {
        let conn = app.conn();
        let product = create_test_product(&conn, "Expirado", 1000);
        queries::create_order(
            &conn,
            &CreateOrder {
                product_id: product.id,
                customer_name: "Ana".into(),
                customer_email: "ana@example.com".into(),
                customer_phone: None,
                customer_cpf: None,
                amount_cents: 1000,
                payment_method: PaymentMethod::Pix,
                pix_code: Some("pix".into()),
                pix_expires_at: Some(queries::now() - 60),
            },
            queries::now(),
        )
        .unwrap()
    };

    let (status, body) = send(app.router(), get(&format!("/orders/{}", order.id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pix_expired"], true);
    assert_eq!(body["seconds_remaining"], 0);
}

#[tokio::test]
async fn test_verify_applies_paid_outcome() {
    let app = create_test_app_with(VerificationOutcome::Paid, 100);
    let order = {
        let conn = app.conn();
        let product = create_test_product(&conn, "Verificar", 1000);
        create_test_order(&conn, &product.id, PaymentMethod::Pix)
    };

    let request = json_request("POST", &format!("/orders/{}/verify", order.id), serde_json::json!({}));
    let (status, body) = send(app.router(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pago");
    assert_eq!(body["pix_expired"], false);

    let stored = queries::get_order_by_id(&app.conn(), &order.id).unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Pago);
}

#[tokio::test]
async fn test_verify_pending_leaves_order_untouched() {
    let app = create_test_app_with(VerificationOutcome::Pending, 100);
    let order = {
        let conn = app.conn();
        let product = create_test_product(&conn, "Pendente", 1000);
        create_test_order(&conn, &product.id, PaymentMethod::Pix)
    };

    let request = json_request("POST", &format!("/orders/{}/verify", order.id), serde_json::json!({}));
    let (status, body) = send(app.router(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pendente");
    assert_eq!(body["updated_at"], order.updated_at);
}

#[tokio::test]
async fn test_verify_missing_order() {
    let app = create_test_app_with(VerificationOutcome::Paid, 100);
    let request = json_request("POST", "/orders/nao-existe/verify", serde_json::json!({}));
    let (status, _) = send(app.router(), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
