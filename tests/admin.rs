//! Admin surface: auth, products and slugs, configuration, orders, exports.

use axum::{body::Body, http::{Request, StatusCode}};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::*;

#[tokio::test]
async fn test_admin_requires_bearer_key() {
    let app = create_test_app();

    let (status, _) = send(app.router(), get("/admin/products")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong = Request::builder()
        .uri("/admin/products")
        .header("Authorization", "Bearer not-the-key")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app.router(), wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = send(app.router(), admin_get("/admin/products")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_product_derives_slug_and_fetches_by_it() {
    let app = create_test_app();

    let (status, created) = send(
        app.router(),
        admin_json("POST", "/admin/products", json!({ "name": "Teste Produto", "price_cents": 4990 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["slug"], "teste-produto");
    assert_eq!(created["installments"], 1);
    assert_eq!(created["active"], true);

    let (status, fetched) = send(app.router(), admin_get("/admin/products/by-slug/teste-produto")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], created["id"]);
}

#[tokio::test]
async fn test_slug_collisions() {
    let app = create_test_app();
    let create = |body: serde_json::Value| admin_json("POST", "/admin/products", body);

    let (_, first) = send(app.router(), create(json!({ "name": "Olá Mundo", "price_cents": 100 }))).await;
    assert_eq!(first["slug"], "ola-mundo");

    // Derived slugs get a numeric suffix
    let (status, second) = send(app.router(), create(json!({ "name": "Ola mundo", "price_cents": 100 }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["slug"], "ola-mundo-2");

    // Explicit slugs are normalized but never rewritten
    let (status, _) = send(
        app.router(),
        create(json!({ "name": "Outro", "price_cents": 100, "slug": "Olá Mundo" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        app.router(),
        create(json!({ "name": "Outro", "price_cents": 100, "slug": "!!!" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_product_and_clear_stock() {
    let app = create_test_app();
    let product = create_test_product_with_stock(&app.conn(), "Workshop", 2000, Some(10));

    let (status, updated) = send(
        app.router(),
        admin_json(
            "PUT",
            &format!("/admin/products/{}", product.id),
            json!({ "price_cents": 2500, "stock": null, "slug": "Workshop Ao Vivo" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price_cents"], 2500);
    assert!(updated["stock"].is_null());
    assert_eq!(updated["slug"], "workshop-ao-vivo");
    assert_eq!(updated["name"], "Workshop");
}

#[tokio::test]
async fn test_delete_product_with_orders_conflicts() {
    let app = create_test_app();
    let (sold, unsold) = {
        let conn = app.conn();
        let sold = create_test_product(&conn, "Vendido", 1000);
        create_test_order(&conn, &sold.id, PaymentMethod::Pix);
        (sold, create_test_product(&conn, "Parado", 1000))
    };

    let delete = |id: &str| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/admin/products/{}", id))
            .header("Authorization", format!("Bearer {}", ADMIN_KEY))
            .body(Body::empty())
            .unwrap()
    };

    assert_eq!(send(app.router(), delete(&sold.id)).await.0, StatusCode::CONFLICT);
    assert_eq!(send(app.router(), delete(&unsold.id)).await.0, StatusCode::NO_CONTENT);
    assert_eq!(send(app.router(), delete(&unsold.id)).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_effective_config_layers_pix_over_checkout() {
    let app = create_test_app();
    let product = create_test_product(&app.conn(), "Camadas", 1000);
    let base = format!("/admin/products/{}", product.id);

    let (status, _) = send(
        app.router(),
        admin_json(
            "PUT",
            &format!("{}/checkout-config", base),
            json!({ "pix_key": "checkout-key", "button_color": "#000000" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        app.router(),
        admin_json(
            "PUT",
            &format!("{}/pix-config", base),
            json!({ "copy_paste_code": "pix-page-key", "expiration_minutes": 10 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, effective) = send(app.router(), admin_get(&format!("{}/checkout-config/effective", base))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(effective["pix_key"], "pix-page-key");
    assert_eq!(effective["pix_expiration_minutes"], 10);
    assert_eq!(effective["button_color"], "#000000");
    assert_eq!(effective["button_text"], "Finalizar compra");
}

#[tokio::test]
async fn test_checkout_config_rejects_negative_discount() {
    let app = create_test_app();
    let product = create_test_product(&app.conn(), "Desconto", 1000);

    let (status, _) = send(
        app.router(),
        admin_json(
            "PUT",
            &format!("/admin/products/{}/checkout-config", product.id),
            json!({ "discount_enabled": true, "discount_amount_cents": -1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_customization_defaults_and_upsert() {
    let app = create_test_app();
    let product = create_test_product(&app.conn(), "Custom", 1000);
    let uri = format!("/admin/products/{}/customization", product.id);

    let (_, defaults) = send(app.router(), admin_get(&uri)).await;
    assert_eq!(defaults["show_guarantee"], false);
    assert_eq!(defaults["faqs"], json!([]));

    let (status, saved) = send(
        app.router(),
        admin_json(
            "PUT",
            &uri,
            json!({
                "benefits": ["Acesso vitalício"],
                "faqs": [{ "question": "Tem certificado?", "answer": "Sim" }],
                "show_guarantee": true,
                "guarantee_days": 30
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["guarantee_days"], 30);

    let (_, reloaded) = send(app.router(), admin_get(&uri)).await;
    assert_eq!(reloaded["faqs"][0]["answer"], "Sim");
    assert_eq!(reloaded["benefits"], json!(["Acesso vitalício"]));
}

#[tokio::test]
async fn test_pixels_and_testimonials() {
    let app = create_test_app();
    let product = create_test_product(&app.conn(), "Pixels", 1000);

    let (status, pixel) = send(
        app.router(),
        admin_json(
            "POST",
            &format!("/admin/products/{}/pixels", product.id),
            json!({ "kind": "facebook", "pixel_id": "123456789" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(pixel["kind"], "facebook");

    let (status, _) = send(
        app.router(),
        admin_json(
            "POST",
            &format!("/admin/products/{}/testimonials", product.id),
            json!({ "author_name": "Bia", "text": "Excelente", "rating": 6 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, testimonial) = send(
        app.router(),
        admin_json(
            "POST",
            &format!("/admin/products/{}/testimonials", product.id),
            json!({ "author_name": "Bia", "text": "Excelente" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(testimonial["rating"], 5);

    let (status, updated) = send(
        app.router(),
        admin_json(
            "PUT",
            &format!("/admin/testimonials/{}", testimonial["id"].as_str().unwrap()),
            json!({ "active": false }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["active"], false);

    let (_, page) = send(app.router(), get(&format!("/checkout/{}", product.slug))).await;
    assert_eq!(page["pixels"][0]["pixel_id"], "123456789");
    assert_eq!(page["testimonials"], json!([]));
}

#[tokio::test]
async fn test_update_order_status_direct_write() {
    let app = create_test_app();
    let order = {
        let conn = app.conn();
        let product = create_test_product(&conn, "Status", 1000);
        create_test_order(&conn, &product.id, PaymentMethod::Pix)
    };

    let uri = format!("/admin/orders/{}/status", order.id);
    let (status, paid) = send(app.router(), admin_json("PUT", &uri, json!({ "status": "pago" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "pago");
    assert!(paid["updated_at"].as_i64().unwrap() > order.updated_at);

    let (_, failed) = send(app.router(), admin_json("PUT", &uri, json!({ "status": "Falhou" }))).await;
    assert_eq!(failed["status"], "Falhou");

    let (status, _) = send(app.router(), admin_json("PUT", &uri, json!({ "status": "enviado" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        app.router(),
        admin_json("PUT", "/admin/orders/nao-existe/status", json!({ "status": "pago" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("pedido não encontrado"));
}

#[tokio::test]
async fn test_list_orders_filters_by_status() {
    let app = create_test_app();
    {
        let conn = app.conn();
        let product = create_test_product(&conn, "Filtro", 1000);
        let paid = create_test_order(&conn, &product.id, PaymentMethod::Pix);
        create_test_order(&conn, &product.id, PaymentMethod::Cartao);
        queries::set_order_status(&conn, &paid.id, OrderStatus::Pago).unwrap();
    }

    let (_, all) = send(app.router(), admin_get("/admin/orders")).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, paid) = send(app.router(), admin_get("/admin/orders?status=pago")).await;
    assert_eq!(paid.as_array().unwrap().len(), 1);
    assert_eq!(paid[0]["status"], "pago");
}

#[tokio::test]
async fn test_payments_csv_export() {
    let app = create_test_app();
    {
        let conn = app.conn();
        let product = create_test_product(&conn, "Relatório", 1000);
        let order = queries::create_order(
            &conn,
            &CreateOrder {
                product_id: product.id.clone(),
                customer_name: "Souza, Ana \"Aninha\"".into(),
                customer_email: "ana@example.com".into(),
                customer_phone: None,
                customer_cpf: None,
                amount_cents: 1000,
                payment_method: PaymentMethod::Cartao,
                pix_code: None,
                pix_expires_at: None,
            },
            queries::now(),
        )
        .unwrap();
        queries::create_payment_info(
            &conn,
            &CreatePaymentInfo {
                order_id: order.id,
                holder_name: "ANA SOUZA".into(),
                card_brand: "visa".into(),
                card_last4: "1111".into(),
                expiry_month: 12,
                expiry_year: 2030,
                fingerprint: "fp".into(),
                processor_token: None,
            },
        )
        .unwrap();
    }

    let response = app
        .router()
        .oneshot(admin_get("/admin/payments/export.csv"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("order_id,created_at,customer_name"));
    assert!(lines[1].contains("\"Souza, Ana \"\"Aninha\"\"\""));
    assert!(lines[1].ends_with(",cartao,pendente,visa,1111,ANA SOUZA"));
}

#[tokio::test]
async fn test_asaas_settings_are_masked() {
    let app = create_test_app();

    let (_, empty) = send(app.router(), admin_get("/admin/settings/asaas")).await;
    assert_eq!(empty["configured"], false);

    let (status, saved) = send(
        app.router(),
        admin_json(
            "PUT",
            "/admin/settings/asaas",
            json!({ "api_key": "$aact_prod_abcdefghijklmnop", "webhook_token": "whsec-token-value-1234" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["configured"], true);
    assert_eq!(saved["environment"], "sandbox");

    let (_, read) = send(app.router(), admin_get("/admin/settings/asaas")).await;
    let api_key = read["api_key"].as_str().unwrap();
    assert_eq!(api_key, "$aact_pr...mnop");

    // Encrypted at rest
    let row = queries::get_asaas_settings_row(&app.conn()).unwrap().unwrap();
    assert!(!row.api_key_encrypted.contains("abcdefghijklmnop"));
}

#[tokio::test]
async fn test_dashboard_counts_and_revenue() {
    let app = create_test_app();
    {
        let conn = app.conn();
        let product = create_test_product(&conn, "Painel", 1000);
        let a = create_test_order(&conn, &product.id, PaymentMethod::Pix);
        let b = create_test_order(&conn, &product.id, PaymentMethod::Pix);
        create_test_order(&conn, &product.id, PaymentMethod::Pix);
        queries::set_order_status(&conn, &a.id, OrderStatus::Pago).unwrap();
        queries::set_order_status(&conn, &b.id, OrderStatus::Falhou).unwrap();
    }

    let (status, dashboard) = send(app.router(), admin_get("/admin/dashboard")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["products"], 1);
    assert_eq!(dashboard["total_orders"], 3);
    assert_eq!(dashboard["orders_by_status"]["pago"], 1);
    assert_eq!(dashboard["orders_by_status"]["Falhou"], 1);
    assert_eq!(dashboard["orders_by_status"]["pendente"], 1);
    assert_eq!(dashboard["orders_by_status"]["cancelado"], 0);
    assert_eq!(dashboard["revenue_cents"], 4990);
}
