//! Row mapping for every table, plus the shared `query_one` / `query_all` helpers.
//!
//! Each `*_COLS` constant lists columns in exactly the order the matching
//! `FromRow` impl reads them.

use std::str::FromStr;

use rusqlite::{Connection, Params, Row, types::Type};

use crate::error::Result;
use crate::models::*;

pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

pub fn query_one<T: FromRow>(conn: &Connection, sql: &str, params: impl Params) -> Result<Option<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    match rows.next()? {
        Some(row) => Ok(Some(T::from_row(row)?)),
        None => Ok(None),
    }
}

pub fn query_all<T: FromRow>(conn: &Connection, sql: &str, params: impl Params) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| T::from_row(row))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Parse a TEXT column through `FromStr` (strum enums).
fn parse_enum<T: FromStr>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unexpected enum value '{}'", raw).into(),
        )
    })
}

/// Parse a JSON TEXT column.
fn parse_json<T: serde::de::DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_json_opt<T: serde::de::DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        serde_json::from_str(&s)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

pub const PRODUCT_COLS: &str = "id, name, description, price_cents, installments, stock, active, slug, image_url, created_at, updated_at";

impl FromRow for Product {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Product {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            price_cents: row.get(3)?,
            installments: row.get(4)?,
            stock: row.get(5)?,
            active: row.get(6)?,
            slug: row.get(7)?,
            image_url: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }
}

pub const CHECKOUT_CONFIG_COLS: &str = "product_id, background_color, button_color, button_text_color, button_text, show_visitor_counter, visitor_count_min, visitor_count_max, show_timer, timer_minutes, timer_text, discount_enabled, discount_amount_cents, discount_badge_text, banner_url, header_text, footer_text, pix_key, payment_methods, updated_at";

impl FromRow for CheckoutConfig {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(CheckoutConfig {
            product_id: row.get(0)?,
            background_color: row.get(1)?,
            button_color: row.get(2)?,
            button_text_color: row.get(3)?,
            button_text: row.get(4)?,
            show_visitor_counter: row.get(5)?,
            visitor_count_min: row.get(6)?,
            visitor_count_max: row.get(7)?,
            show_timer: row.get(8)?,
            timer_minutes: row.get(9)?,
            timer_text: row.get(10)?,
            discount_enabled: row.get(11)?,
            discount_amount_cents: row.get(12)?,
            discount_badge_text: row.get(13)?,
            banner_url: row.get(14)?,
            header_text: row.get(15)?,
            footer_text: row.get(16)?,
            pix_key: row.get(17)?,
            payment_methods: parse_json_opt(row, 18)?,
            updated_at: row.get(19)?,
        })
    }
}

pub const PIX_CONFIG_COLS: &str = "product_id, copy_paste_code, qr_code_url, beneficiary_name, expiration_minutes, page_title, instructions, success_message, updated_at";

impl FromRow for PixConfig {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(PixConfig {
            product_id: row.get(0)?,
            copy_paste_code: row.get(1)?,
            qr_code_url: row.get(2)?,
            beneficiary_name: row.get(3)?,
            expiration_minutes: row.get(4)?,
            page_title: row.get(5)?,
            instructions: row.get(6)?,
            success_message: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

pub const CUSTOMIZATION_COLS: &str = "product_id, benefits, faqs, show_guarantee, guarantee_days, guarantee_text, show_testimonials, updated_at";

impl FromRow for CheckoutCustomization {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(CheckoutCustomization {
            product_id: row.get(0)?,
            benefits: parse_json(row, 1)?,
            faqs: parse_json(row, 2)?,
            show_guarantee: row.get(3)?,
            guarantee_days: row.get(4)?,
            guarantee_text: row.get(5)?,
            show_testimonials: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

pub const ORDER_COLS: &str = "id, product_id, customer_name, customer_email, customer_phone, customer_cpf, amount_cents, payment_method, status, processor_payment_id, pix_code, pix_qr_image, pix_expires_at, created_at, updated_at";

impl FromRow for Order {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Order {
            id: row.get(0)?,
            product_id: row.get(1)?,
            customer_name: row.get(2)?,
            customer_email: row.get(3)?,
            customer_phone: row.get(4)?,
            customer_cpf: row.get(5)?,
            amount_cents: row.get(6)?,
            payment_method: parse_enum(row, 7)?,
            status: parse_enum(row, 8)?,
            processor_payment_id: row.get(9)?,
            pix_code: row.get(10)?,
            pix_qr_image: row.get(11)?,
            pix_expires_at: row.get(12)?,
            created_at: row.get(13)?,
            updated_at: row.get(14)?,
        })
    }
}

pub const PAYMENT_INFO_COLS: &str = "id, order_id, holder_name, card_brand, card_last4, expiry_month, expiry_year, fingerprint, processor_token, created_at";

impl FromRow for PaymentInfo {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(PaymentInfo {
            id: row.get(0)?,
            order_id: row.get(1)?,
            holder_name: row.get(2)?,
            card_brand: row.get(3)?,
            card_last4: row.get(4)?,
            expiry_month: row.get(5)?,
            expiry_year: row.get(6)?,
            fingerprint: row.get(7)?,
            processor_token: row.get(8)?,
            created_at: row.get(9)?,
        })
    }
}

/// Columns for `orders o LEFT JOIN payment_info pi`.
pub const PAYMENT_RECORD_COLS: &str = "o.id, o.created_at, o.customer_name, o.customer_email, o.amount_cents, o.payment_method, o.status, pi.card_brand, pi.card_last4, pi.holder_name";

impl FromRow for PaymentRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(PaymentRecord {
            order_id: row.get(0)?,
            created_at: row.get(1)?,
            customer_name: row.get(2)?,
            customer_email: row.get(3)?,
            amount_cents: row.get(4)?,
            payment_method: row.get(5)?,
            status: row.get(6)?,
            card_brand: row.get(7)?,
            card_last4: row.get(8)?,
            holder_name: row.get(9)?,
        })
    }
}

pub const PIXEL_COLS: &str = "id, product_id, kind, pixel_id, active, created_at";

impl FromRow for Pixel {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Pixel {
            id: row.get(0)?,
            product_id: row.get(1)?,
            kind: parse_enum(row, 2)?,
            pixel_id: row.get(3)?,
            active: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

pub const TESTIMONIAL_COLS: &str = "id, product_id, author_name, text, rating, avatar_url, active, created_at";

impl FromRow for Testimonial {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Testimonial {
            id: row.get(0)?,
            product_id: row.get(1)?,
            author_name: row.get(2)?,
            text: row.get(3)?,
            rating: row.get(4)?,
            avatar_url: row.get(5)?,
            active: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

pub const ASAAS_SETTINGS_COLS: &str = "api_key_encrypted, webhook_token_encrypted, environment, pix_enabled, card_enabled, updated_at";

impl FromRow for AsaasSettingsRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(AsaasSettingsRow {
            api_key_encrypted: row.get(0)?,
            webhook_token_encrypted: row.get(1)?,
            environment: parse_enum(row, 2)?,
            pix_enabled: row.get(3)?,
            card_enabled: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}
