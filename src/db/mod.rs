mod from_row;
pub mod queries;

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::crypto::{MasterKey, hash_secret};
use crate::error::Result;
use crate::payments::PaymentVerifier;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Rate limiter for order creation, keyed by client IP.
pub type OrderRateLimiter = DefaultKeyedRateLimiter<String>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub master_key: MasterKey,
    /// SHA-256 of the admin API key (hex)
    pub admin_key_hash: String,
    /// Asaas base URL override (tests, proxies)
    pub asaas_base_url: Option<String>,
    pub http: reqwest::Client,
    pub verifier: Arc<dyn PaymentVerifier>,
    pub order_limiter: Arc<OrderRateLimiter>,
}

impl AppState {
    pub fn new(
        db: DbPool,
        master_key: MasterKey,
        admin_api_key: &str,
        asaas_base_url: Option<String>,
        verifier: Arc<dyn PaymentVerifier>,
        orders_per_minute: u32,
    ) -> Self {
        Self {
            db,
            master_key,
            admin_key_hash: hash_secret(admin_api_key),
            asaas_base_url,
            http: reqwest::Client::new(),
            verifier,
            order_limiter: Arc::new(order_rate_limiter(orders_per_minute)),
        }
    }
}

pub fn order_rate_limiter(per_minute: u32) -> OrderRateLimiter {
    let per_minute = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
    RateLimiter::keyed(Quota::per_minute(per_minute))
}

pub fn create_pool(database_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(database_path)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;"));
    let pool = Pool::builder().max_size(10).build(manager)?;
    Ok(pool)
}

/// Create all tables if they don't exist.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            price_cents INTEGER NOT NULL,
            installments INTEGER NOT NULL DEFAULT 1,
            stock INTEGER,
            active INTEGER NOT NULL DEFAULT 1,
            slug TEXT NOT NULL UNIQUE,
            image_url TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS checkout_config (
            product_id TEXT PRIMARY KEY REFERENCES products(id) ON DELETE CASCADE,
            background_color TEXT,
            button_color TEXT,
            button_text_color TEXT,
            button_text TEXT,
            show_visitor_counter INTEGER,
            visitor_count_min INTEGER,
            visitor_count_max INTEGER,
            show_timer INTEGER,
            timer_minutes INTEGER,
            timer_text TEXT,
            discount_enabled INTEGER,
            discount_amount_cents INTEGER,
            discount_badge_text TEXT,
            banner_url TEXT,
            header_text TEXT,
            footer_text TEXT,
            pix_key TEXT,
            payment_methods TEXT,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS pix_page_config (
            product_id TEXT PRIMARY KEY REFERENCES products(id) ON DELETE CASCADE,
            copy_paste_code TEXT,
            qr_code_url TEXT,
            beneficiary_name TEXT,
            expiration_minutes INTEGER,
            page_title TEXT,
            instructions TEXT,
            success_message TEXT,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS checkout_customization (
            product_id TEXT PRIMARY KEY REFERENCES products(id) ON DELETE CASCADE,
            benefits TEXT NOT NULL DEFAULT '[]',
            faqs TEXT NOT NULL DEFAULT '[]',
            show_guarantee INTEGER NOT NULL DEFAULT 0,
            guarantee_days INTEGER NOT NULL DEFAULT 7,
            guarantee_text TEXT,
            show_testimonials INTEGER NOT NULL DEFAULT 0,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS orders (
            id TEXT PRIMARY KEY,
            product_id TEXT NOT NULL REFERENCES products(id),
            customer_name TEXT NOT NULL,
            customer_email TEXT NOT NULL,
            customer_phone TEXT,
            customer_cpf TEXT,
            amount_cents INTEGER NOT NULL,
            payment_method TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pendente',
            processor_payment_id TEXT,
            pix_code TEXT,
            pix_qr_image TEXT,
            pix_expires_at INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_orders_product ON orders(product_id);
        CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status);
        CREATE INDEX IF NOT EXISTS idx_orders_processor_payment ON orders(processor_payment_id);

        CREATE TABLE IF NOT EXISTS payment_info (
            id TEXT PRIMARY KEY,
            order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            holder_name TEXT NOT NULL,
            card_brand TEXT NOT NULL,
            card_last4 TEXT NOT NULL,
            expiry_month INTEGER NOT NULL,
            expiry_year INTEGER NOT NULL,
            fingerprint TEXT NOT NULL,
            processor_token TEXT,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_payment_info_order ON payment_info(order_id);

        CREATE TABLE IF NOT EXISTS pixels (
            id TEXT PRIMARY KEY,
            product_id TEXT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            kind TEXT NOT NULL,
            pixel_id TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS testimonials (
            id TEXT PRIMARY KEY,
            product_id TEXT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            author_name TEXT NOT NULL,
            text TEXT NOT NULL,
            rating INTEGER NOT NULL DEFAULT 5,
            avatar_url TEXT,
            active INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS asaas_settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            api_key_encrypted TEXT NOT NULL,
            webhook_token_encrypted TEXT,
            environment TEXT NOT NULL DEFAULT 'sandbox',
            pix_enabled INTEGER NOT NULL DEFAULT 1,
            card_enabled INTEGER NOT NULL DEFAULT 1,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS webhook_events (
            id TEXT PRIMARY KEY,
            provider TEXT NOT NULL,
            event_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            UNIQUE(provider, event_id)
        );
        "#,
    )?;
    Ok(())
}
