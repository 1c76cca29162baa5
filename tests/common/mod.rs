//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rusqlite::Connection;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub use vitrine::crypto::MasterKey;
pub use vitrine::db::{AppState, DbPool, create_pool, init_db, queries};
pub use vitrine::models::*;
pub use vitrine::payments::{FixedVerifier, VerificationOutcome};

pub const ADMIN_KEY: &str = "test-admin-key";

/// App state backed by a throwaway on-disk database.
///
/// The pool hands out several connections, so the database must live on disk
/// rather than in memory. Keep this value alive for the whole test.
pub struct TestApp {
    pub state: AppState,
    _dir: TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        vitrine::app(self.state.clone())
    }

    pub fn conn(&self) -> r2d2::PooledConnection<r2d2_sqlite::SqliteConnectionManager> {
        self.state.db.get().unwrap()
    }
}

pub fn test_master_key() -> MasterKey {
    MasterKey::dev()
}

pub fn create_test_app() -> TestApp {
    create_test_app_with(VerificationOutcome::Pending, 100)
}

pub fn create_test_app_with(outcome: VerificationOutcome, orders_per_minute: u32) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vitrine-test.db");
    let pool = create_pool(path.to_str().unwrap()).unwrap();
    init_db(&pool.get().unwrap()).unwrap();

    let state = AppState::new(
        pool,
        test_master_key(),
        ADMIN_KEY,
        Some("http://127.0.0.1:9".to_string()),
        Arc::new(FixedVerifier(outcome)),
        orders_per_minute,
    );

    TestApp { state, _dir: dir }
}

// ============ Fixtures ============

pub fn create_test_product(conn: &Connection, name: &str, price_cents: i64) -> Product {
    create_test_product_with_stock(conn, name, price_cents, None)
}

pub fn create_test_product_with_stock(
    conn: &Connection,
    name: &str,
    price_cents: i64,
    stock: Option<i64>,
) -> Product {
    let input = CreateProduct {
        name: name.to_string(),
        description: Some("Produto de teste".to_string()),
        price_cents,
        installments: 3,
        stock,
        active: true,
        slug: None,
        image_url: None,
    };
    let slug = vitrine::slug::unique_slug(conn, &vitrine::slug::slugify(name), None).unwrap();
    queries::create_product(conn, &input, &slug).unwrap()
}

pub fn set_static_pix_key(conn: &Connection, product_id: &str, key: &str) {
    queries::upsert_pix_config(
        conn,
        product_id,
        &UpsertPixConfig {
            copy_paste_code: Some(key.to_string()),
            ..Default::default()
        },
    )
    .unwrap();
}

pub fn create_test_order(conn: &Connection, product_id: &str, method: PaymentMethod) -> Order {
    queries::create_order(
        conn,
        &CreateOrder {
            product_id: product_id.to_string(),
            customer_name: "Ana Souza".to_string(),
            customer_email: "ana@example.com".to_string(),
            customer_phone: None,
            customer_cpf: None,
            amount_cents: 4990,
            payment_method: method,
            pix_code: None,
            pix_expires_at: None,
        },
        queries::now(),
    )
    .unwrap()
}

pub fn configure_asaas(conn: &Connection, webhook_token: Option<&str>) {
    configure_asaas_with(conn, webhook_token, false, false);
}

/// Asaas settings with the processor handling PIX and/or card charges.
pub fn configure_asaas_with(
    conn: &Connection,
    webhook_token: Option<&str>,
    pix_enabled: bool,
    card_enabled: bool,
) {
    queries::upsert_asaas_settings(
        conn,
        &UpdateAsaasSettings {
            api_key: "$aact_test_1234567890abcdef".to_string(),
            webhook_token: webhook_token.map(String::from),
            environment: AsaasEnvironment::Sandbox,
            pix_enabled,
            card_enabled,
        },
        &test_master_key(),
    )
    .unwrap();
}

// ============ Requests ============

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

pub fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", ADMIN_KEY))
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn admin_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", ADMIN_KEY))
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}
