use chrono::Utc;
use rusqlite::{Connection, params, types::Value};
use uuid::Uuid;

use crate::crypto::{MasterKey, PURPOSE_ASAAS_API_KEY, PURPOSE_ASAAS_WEBHOOK_TOKEN};
use crate::error::Result;
use crate::models::*;

use super::from_row::{
    ASAAS_SETTINGS_COLS, CHECKOUT_CONFIG_COLS, CUSTOMIZATION_COLS, ORDER_COLS,
    PAYMENT_INFO_COLS, PAYMENT_RECORD_COLS, PIX_CONFIG_COLS, PIXEL_COLS, PRODUCT_COLS,
    TESTIMONIAL_COLS, query_all, query_one,
};

pub fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

/// Builder for dynamic UPDATE statements with optional fields.
/// Combines multiple field updates into a single query.
struct UpdateBuilder {
    table: &'static str,
    id: String,
    fields: Vec<(&'static str, Value)>,
    track_updated_at: bool,
}

impl UpdateBuilder {
    fn new(table: &'static str, id: &str) -> Self {
        Self {
            table,
            id: id.to_string(),
            fields: Vec::new(),
            track_updated_at: false,
        }
    }

    fn with_updated_at(mut self) -> Self {
        self.track_updated_at = true;
        self
    }

    fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push((column, value.into()));
        self
    }

    /// Set a column only when a value is provided. `Option<Option<T>>` inputs
    /// map `Some(None)` to NULL.
    fn set_opt<V: Into<Value>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    fn execute(mut self, conn: &Connection) -> Result<bool> {
        if self.fields.is_empty() {
            return Ok(false);
        }
        if self.track_updated_at {
            self.fields.push(("updated_at", now().into()));
        }
        let sets: Vec<String> = self
            .fields
            .iter()
            .map(|(col, _)| format!("{} = ?", col))
            .collect();
        let mut values: Vec<Value> = self.fields.into_iter().map(|(_, v)| v).collect();
        values.push(self.id.into());
        let sql = format!("UPDATE {} SET {} WHERE id = ?", self.table, sets.join(", "));
        let affected = conn.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(affected > 0)
    }
}

// ============ Products ============

/// Insert a product. `slug` must already be normalized and free.
pub fn create_product(conn: &Connection, input: &CreateProduct, slug: &str) -> Result<Product> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO products (id, name, description, price_cents, installments, stock, active, slug, image_url, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            &id,
            &input.name,
            &input.description,
            input.price_cents,
            input.installments,
            input.stock,
            input.active,
            slug,
            &input.image_url,
            now,
            now
        ],
    )?;

    Ok(Product {
        id,
        name: input.name.clone(),
        description: input.description.clone(),
        price_cents: input.price_cents,
        installments: input.installments,
        stock: input.stock,
        active: input.active,
        slug: slug.to_string(),
        image_url: input.image_url.clone(),
        created_at: now,
        updated_at: now,
    })
}

pub fn get_product_by_id(conn: &Connection, id: &str) -> Result<Option<Product>> {
    query_one(
        conn,
        &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLS),
        params![id],
    )
}

pub fn get_product_by_slug(conn: &Connection, slug: &str) -> Result<Option<Product>> {
    query_one(
        conn,
        &format!("SELECT {} FROM products WHERE slug = ?1", PRODUCT_COLS),
        params![slug],
    )
}

pub fn list_products(conn: &Connection) -> Result<Vec<Product>> {
    query_all(
        conn,
        &format!("SELECT {} FROM products ORDER BY created_at DESC", PRODUCT_COLS),
        [],
    )
}

/// Whether `slug` is taken by a product other than `exclude_id`.
pub fn slug_exists(conn: &Connection, slug: &str, exclude_id: Option<&str>) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM products WHERE slug = ?1 AND (?2 IS NULL OR id != ?2)",
        params![slug, exclude_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Update a product. `slug`, when present, must already be normalized and free.
pub fn update_product(conn: &Connection, id: &str, input: &UpdateProduct) -> Result<bool> {
    UpdateBuilder::new("products", id)
        .with_updated_at()
        .set_opt("name", input.name.clone())
        .set_opt("description", input.description.clone())
        .set_opt("price_cents", input.price_cents)
        .set_opt("installments", input.installments)
        .set_opt("stock", input.stock)
        .set_opt("active", input.active)
        .set_opt("slug", input.slug.clone())
        .set_opt("image_url", input.image_url.clone())
        .execute(conn)
}

pub fn delete_product(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM products WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

/// Atomically take one unit of stock. Products with unlimited stock always succeed.
///
/// Returns `Ok(false)` when the product is sold out (or missing).
pub fn try_reserve_stock(conn: &Connection, product_id: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE products SET stock = stock - 1
         WHERE id = ?1 AND (stock IS NULL OR stock > 0)",
        params![product_id],
    )?;
    Ok(affected > 0)
}

/// Give back a unit taken by `try_reserve_stock` (order creation failed).
pub fn release_stock(conn: &Connection, product_id: &str) -> Result<()> {
    conn.execute(
        "UPDATE products SET stock = stock + 1 WHERE id = ?1 AND stock IS NOT NULL",
        params![product_id],
    )?;
    Ok(())
}

// ============ Checkout Config ============

pub fn get_checkout_config(conn: &Connection, product_id: &str) -> Result<Option<CheckoutConfig>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM checkout_config WHERE product_id = ?1",
            CHECKOUT_CONFIG_COLS
        ),
        params![product_id],
    )
}

/// Replace the stored checkout config for a product (insert or overwrite).
pub fn upsert_checkout_config(
    conn: &Connection,
    product_id: &str,
    input: &UpsertCheckoutConfig,
) -> Result<CheckoutConfig> {
    let now = now();
    let payment_methods = input
        .payment_methods
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    conn.execute(
        "INSERT INTO checkout_config (product_id, background_color, button_color, button_text_color, button_text,
             show_visitor_counter, visitor_count_min, visitor_count_max, show_timer, timer_minutes, timer_text,
             discount_enabled, discount_amount_cents, discount_badge_text, banner_url, header_text, footer_text,
             pix_key, payment_methods, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
         ON CONFLICT(product_id) DO UPDATE SET
             background_color = excluded.background_color,
             button_color = excluded.button_color,
             button_text_color = excluded.button_text_color,
             button_text = excluded.button_text,
             show_visitor_counter = excluded.show_visitor_counter,
             visitor_count_min = excluded.visitor_count_min,
             visitor_count_max = excluded.visitor_count_max,
             show_timer = excluded.show_timer,
             timer_minutes = excluded.timer_minutes,
             timer_text = excluded.timer_text,
             discount_enabled = excluded.discount_enabled,
             discount_amount_cents = excluded.discount_amount_cents,
             discount_badge_text = excluded.discount_badge_text,
             banner_url = excluded.banner_url,
             header_text = excluded.header_text,
             footer_text = excluded.footer_text,
             pix_key = excluded.pix_key,
             payment_methods = excluded.payment_methods,
             updated_at = excluded.updated_at",
        params![
            product_id,
            &input.background_color,
            &input.button_color,
            &input.button_text_color,
            &input.button_text,
            input.show_visitor_counter,
            input.visitor_count_min,
            input.visitor_count_max,
            input.show_timer,
            input.timer_minutes,
            &input.timer_text,
            input.discount_enabled,
            input.discount_amount_cents,
            &input.discount_badge_text,
            &input.banner_url,
            &input.header_text,
            &input.footer_text,
            &input.pix_key,
            &payment_methods,
            now
        ],
    )?;

    Ok(CheckoutConfig {
        product_id: product_id.to_string(),
        background_color: input.background_color.clone(),
        button_color: input.button_color.clone(),
        button_text_color: input.button_text_color.clone(),
        button_text: input.button_text.clone(),
        show_visitor_counter: input.show_visitor_counter,
        visitor_count_min: input.visitor_count_min,
        visitor_count_max: input.visitor_count_max,
        show_timer: input.show_timer,
        timer_minutes: input.timer_minutes,
        timer_text: input.timer_text.clone(),
        discount_enabled: input.discount_enabled,
        discount_amount_cents: input.discount_amount_cents,
        discount_badge_text: input.discount_badge_text.clone(),
        banner_url: input.banner_url.clone(),
        header_text: input.header_text.clone(),
        footer_text: input.footer_text.clone(),
        pix_key: input.pix_key.clone(),
        payment_methods: input.payment_methods.clone(),
        updated_at: now,
    })
}

// ============ PIX Page Config ============

pub fn get_pix_config(conn: &Connection, product_id: &str) -> Result<Option<PixConfig>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM pix_page_config WHERE product_id = ?1",
            PIX_CONFIG_COLS
        ),
        params![product_id],
    )
}

pub fn upsert_pix_config(
    conn: &Connection,
    product_id: &str,
    input: &UpsertPixConfig,
) -> Result<PixConfig> {
    let now = now();

    conn.execute(
        "INSERT INTO pix_page_config (product_id, copy_paste_code, qr_code_url, beneficiary_name,
             expiration_minutes, page_title, instructions, success_message, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(product_id) DO UPDATE SET
             copy_paste_code = excluded.copy_paste_code,
             qr_code_url = excluded.qr_code_url,
             beneficiary_name = excluded.beneficiary_name,
             expiration_minutes = excluded.expiration_minutes,
             page_title = excluded.page_title,
             instructions = excluded.instructions,
             success_message = excluded.success_message,
             updated_at = excluded.updated_at",
        params![
            product_id,
            &input.copy_paste_code,
            &input.qr_code_url,
            &input.beneficiary_name,
            input.expiration_minutes,
            &input.page_title,
            &input.instructions,
            &input.success_message,
            now
        ],
    )?;

    Ok(PixConfig {
        product_id: product_id.to_string(),
        copy_paste_code: input.copy_paste_code.clone(),
        qr_code_url: input.qr_code_url.clone(),
        beneficiary_name: input.beneficiary_name.clone(),
        expiration_minutes: input.expiration_minutes,
        page_title: input.page_title.clone(),
        instructions: input.instructions.clone(),
        success_message: input.success_message.clone(),
        updated_at: now,
    })
}

// ============ Checkout Customization ============

pub fn get_customization(
    conn: &Connection,
    product_id: &str,
) -> Result<Option<CheckoutCustomization>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM checkout_customization WHERE product_id = ?1",
            CUSTOMIZATION_COLS
        ),
        params![product_id],
    )
}

pub fn upsert_customization(
    conn: &Connection,
    product_id: &str,
    input: &UpsertCustomization,
) -> Result<CheckoutCustomization> {
    let now = now();
    let benefits = serde_json::to_string(&input.benefits)?;
    let faqs = serde_json::to_string(&input.faqs)?;

    conn.execute(
        "INSERT INTO checkout_customization (product_id, benefits, faqs, show_guarantee, guarantee_days,
             guarantee_text, show_testimonials, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(product_id) DO UPDATE SET
             benefits = excluded.benefits,
             faqs = excluded.faqs,
             show_guarantee = excluded.show_guarantee,
             guarantee_days = excluded.guarantee_days,
             guarantee_text = excluded.guarantee_text,
             show_testimonials = excluded.show_testimonials,
             updated_at = excluded.updated_at",
        params![
            product_id,
            &benefits,
            &faqs,
            input.show_guarantee,
            input.guarantee_days,
            &input.guarantee_text,
            input.show_testimonials,
            now
        ],
    )?;

    Ok(CheckoutCustomization {
        product_id: product_id.to_string(),
        benefits: input.benefits.clone(),
        faqs: input.faqs.clone(),
        show_guarantee: input.show_guarantee,
        guarantee_days: input.guarantee_days,
        guarantee_text: input.guarantee_text.clone(),
        show_testimonials: input.show_testimonials,
        updated_at: now,
    })
}

// ============ Orders ============

/// Insert a pending order stamped with `created_at`. Callers derive
/// `pix_expires_at` from the same instant.
pub fn create_order(conn: &Connection, input: &CreateOrder, created_at: i64) -> Result<Order> {
    let id = gen_id();
    let now = created_at;
    let status = OrderStatus::Pendente;

    conn.execute(
        "INSERT INTO orders (id, product_id, customer_name, customer_email, customer_phone, customer_cpf,
             amount_cents, payment_method, status, pix_code, pix_expires_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            &id,
            &input.product_id,
            &input.customer_name,
            &input.customer_email,
            &input.customer_phone,
            &input.customer_cpf,
            input.amount_cents,
            input.payment_method.as_ref(),
            status.as_ref(),
            &input.pix_code,
            input.pix_expires_at,
            now,
            now
        ],
    )?;

    Ok(Order {
        id,
        product_id: input.product_id.clone(),
        customer_name: input.customer_name.clone(),
        customer_email: input.customer_email.clone(),
        customer_phone: input.customer_phone.clone(),
        customer_cpf: input.customer_cpf.clone(),
        amount_cents: input.amount_cents,
        payment_method: input.payment_method,
        status,
        processor_payment_id: None,
        pix_code: input.pix_code.clone(),
        pix_qr_image: None,
        pix_expires_at: input.pix_expires_at,
        created_at: now,
        updated_at: now,
    })
}

pub fn get_order_by_id(conn: &Connection, id: &str) -> Result<Option<Order>> {
    query_one(
        conn,
        &format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLS),
        params![id],
    )
}

pub fn get_order_by_processor_payment_id(
    conn: &Connection,
    processor_payment_id: &str,
) -> Result<Option<Order>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM orders WHERE processor_payment_id = ?1",
            ORDER_COLS
        ),
        params![processor_payment_id],
    )
}

pub fn list_orders(conn: &Connection, filter: &OrderFilter) -> Result<Vec<Order>> {
    let status = filter.status.map(|s| s.as_ref().to_string());
    query_all(
        conn,
        &format!(
            "SELECT {} FROM orders
             WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR product_id = ?2)
             ORDER BY created_at DESC",
            ORDER_COLS
        ),
        params![status, &filter.product_id],
    )
}

pub fn count_orders_for_product(conn: &Connection, product_id: &str) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM orders WHERE product_id = ?1",
        params![product_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Attach processor charge details to an order. Only provided fields are written.
pub fn set_order_processor_details(
    conn: &Connection,
    id: &str,
    details: &OrderProcessorDetails,
) -> Result<bool> {
    UpdateBuilder::new("orders", id)
        .with_updated_at()
        .set_opt("processor_payment_id", details.processor_payment_id.clone())
        .set_opt("pix_code", details.pix_code.clone())
        .set_opt("pix_qr_image", details.pix_qr_image.clone())
        .execute(conn)
}

/// Write an order status directly, with no check on the current status.
///
/// `updated_at` always moves forward, even for two writes in the same second.
/// Returns `Ok(false)` when no order has this id.
pub fn set_order_status(conn: &Connection, id: &str, status: OrderStatus) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET status = ?1, updated_at = MAX(?2, updated_at + 1) WHERE id = ?3",
        params![status.as_ref(), now(), id],
    )?;
    Ok(affected > 0)
}

/// Order count per status plus the total amount of paid orders.
pub fn order_stats(conn: &Connection) -> Result<(Vec<(String, i64)>, i64)> {
    let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM orders GROUP BY status")?;
    let counts = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let revenue: i64 = conn.query_row(
        "SELECT COALESCE(SUM(amount_cents), 0) FROM orders WHERE status = ?1",
        params![OrderStatus::Pago.as_ref()],
        |row| row.get(0),
    )?;

    Ok((counts, revenue))
}

// ============ Payment Info ============

pub fn create_payment_info(conn: &Connection, input: &CreatePaymentInfo) -> Result<PaymentInfo> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO payment_info (id, order_id, holder_name, card_brand, card_last4, expiry_month,
             expiry_year, fingerprint, processor_token, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            &id,
            &input.order_id,
            &input.holder_name,
            &input.card_brand,
            &input.card_last4,
            input.expiry_month,
            input.expiry_year,
            &input.fingerprint,
            &input.processor_token,
            now
        ],
    )?;

    Ok(PaymentInfo {
        id,
        order_id: input.order_id.clone(),
        holder_name: input.holder_name.clone(),
        card_brand: input.card_brand.clone(),
        card_last4: input.card_last4.clone(),
        expiry_month: input.expiry_month,
        expiry_year: input.expiry_year,
        fingerprint: input.fingerprint.clone(),
        processor_token: input.processor_token.clone(),
        created_at: now,
    })
}

pub fn get_payment_info_for_order(conn: &Connection, order_id: &str) -> Result<Option<PaymentInfo>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM payment_info WHERE order_id = ?1 ORDER BY created_at DESC LIMIT 1",
            PAYMENT_INFO_COLS
        ),
        params![order_id],
    )
}

/// Orders joined with their card details (if any), newest first.
pub fn list_payment_records(conn: &Connection) -> Result<Vec<PaymentRecord>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM orders o
             LEFT JOIN payment_info pi ON pi.order_id = o.id
             ORDER BY o.created_at DESC",
            PAYMENT_RECORD_COLS
        ),
        [],
    )
}

// ============ Pixels ============

pub fn create_pixel(conn: &Connection, product_id: &str, input: &CreatePixel) -> Result<Pixel> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO pixels (id, product_id, kind, pixel_id, active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![&id, product_id, input.kind.as_ref(), &input.pixel_id, input.active, now],
    )?;

    Ok(Pixel {
        id,
        product_id: product_id.to_string(),
        kind: input.kind,
        pixel_id: input.pixel_id.clone(),
        active: input.active,
        created_at: now,
    })
}

pub fn list_pixels_for_product(
    conn: &Connection,
    product_id: &str,
    active_only: bool,
) -> Result<Vec<Pixel>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM pixels WHERE product_id = ?1 AND (?2 = 0 OR active = 1) ORDER BY created_at",
            PIXEL_COLS
        ),
        params![product_id, active_only],
    )
}

pub fn delete_pixel(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM pixels WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ============ Testimonials ============

pub fn create_testimonial(
    conn: &Connection,
    product_id: &str,
    input: &CreateTestimonial,
) -> Result<Testimonial> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO testimonials (id, product_id, author_name, text, rating, avatar_url, active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            &id,
            product_id,
            &input.author_name,
            &input.text,
            input.rating,
            &input.avatar_url,
            input.active,
            now
        ],
    )?;

    Ok(Testimonial {
        id,
        product_id: product_id.to_string(),
        author_name: input.author_name.clone(),
        text: input.text.clone(),
        rating: input.rating,
        avatar_url: input.avatar_url.clone(),
        active: input.active,
        created_at: now,
    })
}

pub fn get_testimonial_by_id(conn: &Connection, id: &str) -> Result<Option<Testimonial>> {
    query_one(
        conn,
        &format!("SELECT {} FROM testimonials WHERE id = ?1", TESTIMONIAL_COLS),
        params![id],
    )
}

pub fn list_testimonials_for_product(
    conn: &Connection,
    product_id: &str,
    active_only: bool,
) -> Result<Vec<Testimonial>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM testimonials WHERE product_id = ?1 AND (?2 = 0 OR active = 1) ORDER BY created_at",
            TESTIMONIAL_COLS
        ),
        params![product_id, active_only],
    )
}

pub fn update_testimonial(conn: &Connection, id: &str, input: &UpdateTestimonial) -> Result<bool> {
    UpdateBuilder::new("testimonials", id)
        .set_opt("author_name", input.author_name.clone())
        .set_opt("text", input.text.clone())
        .set_opt("rating", input.rating)
        .set_opt("avatar_url", input.avatar_url.clone())
        .set_opt("active", input.active)
        .execute(conn)
}

pub fn delete_testimonial(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM testimonials WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ============ Asaas Settings ============

pub fn get_asaas_settings_row(conn: &Connection) -> Result<Option<AsaasSettingsRow>> {
    query_one(
        conn,
        &format!("SELECT {} FROM asaas_settings WHERE id = 1", ASAAS_SETTINGS_COLS),
        [],
    )
}

/// Load and decrypt the processor settings, if configured.
pub fn get_asaas_settings(conn: &Connection, master_key: &MasterKey) -> Result<Option<AsaasSettings>> {
    get_asaas_settings_row(conn)?
        .map(|row| row.decrypt(master_key))
        .transpose()
}

/// Store the processor settings, encrypting secrets with the master key.
pub fn upsert_asaas_settings(
    conn: &Connection,
    input: &UpdateAsaasSettings,
    master_key: &MasterKey,
) -> Result<AsaasSettings> {
    let now = now();
    let api_key_encrypted = master_key.encrypt(PURPOSE_ASAAS_API_KEY, &input.api_key)?;
    let webhook_token_encrypted = input
        .webhook_token
        .as_deref()
        .map(|t| master_key.encrypt(PURPOSE_ASAAS_WEBHOOK_TOKEN, t))
        .transpose()?;

    conn.execute(
        "INSERT INTO asaas_settings (id, api_key_encrypted, webhook_token_encrypted, environment,
             pix_enabled, card_enabled, updated_at)
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
             api_key_encrypted = excluded.api_key_encrypted,
             webhook_token_encrypted = excluded.webhook_token_encrypted,
             environment = excluded.environment,
             pix_enabled = excluded.pix_enabled,
             card_enabled = excluded.card_enabled,
             updated_at = excluded.updated_at",
        params![
            &api_key_encrypted,
            &webhook_token_encrypted,
            input.environment.as_ref(),
            input.pix_enabled,
            input.card_enabled,
            now
        ],
    )?;

    Ok(AsaasSettings {
        api_key: input.api_key.clone(),
        webhook_token: input.webhook_token.clone(),
        environment: input.environment,
        pix_enabled: input.pix_enabled,
        card_enabled: input.card_enabled,
        updated_at: now,
    })
}

// ============ Webhook Event Deduplication ============

/// Atomically record a webhook event, returning true if this is a new event.
///
/// Uses INSERT OR IGNORE: a repeated (provider, event_id) pair is ignored and
/// reported as already processed.
pub fn try_record_webhook_event(conn: &Connection, provider: &str, event_id: &str) -> Result<bool> {
    let id = gen_id();
    let affected = conn.execute(
        "INSERT OR IGNORE INTO webhook_events (id, provider, event_id, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, provider, event_id, now()],
    )?;
    Ok(affected > 0)
}

