use axum::{
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::checkout::{
    EffectiveCheckoutConfig, checkout_price_cents, installment_value_cents,
    resolve_checkout_config,
};
use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{ClientIp, Json, Path};
use crate::models::{
    AsaasSettings, CheckoutCustomization, CreateOrder, CreatePaymentInfo, Order,
    OrderProcessorDetails, PaymentMethod, Pixel, Product, Testimonial,
};
use crate::orders::apply_verification;
use crate::payments::{
    AsaasCharge, AsaasClient, AsaasCustomer, CardInput, PixQrCode, ValidatedCard,
    outcome_for_asaas_status, validate_card,
};

use super::PublicOrder;

#[derive(Debug, Serialize)]
pub struct CheckoutPage {
    pub product: Product,
    pub config: EffectiveCheckoutConfig,
    pub customization: CheckoutCustomization,
    pub testimonials: Vec<Testimonial>,
    pub pixels: Vec<Pixel>,
    pub final_price_cents: i64,
    pub installment_value_cents: i64,
    pub sold_out: bool,
}

fn active_product_by_slug(state: &AppState, slug: &str) -> Result<Product> {
    let conn = state.db.get()?;
    queries::get_product_by_slug(&conn, slug)?
        .filter(|p| p.active)
        .ok_or_else(|| AppError::NotFound("Produto não encontrado".into()))
}

pub async fn get_checkout_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CheckoutPage>> {
    let product = active_product_by_slug(&state, &slug)?;
    let config = resolve_checkout_config(&state.db, Some(&product.id));

    let conn = state.db.get()?;
    let customization = queries::get_customization(&conn, &product.id)?
        .unwrap_or_else(|| CheckoutCustomization::default_for(&product.id));
    let testimonials = queries::list_testimonials_for_product(&conn, &product.id, true)?;
    let pixels = queries::list_pixels_for_product(&conn, &product.id, true)?;

    let final_price_cents = checkout_price_cents(&product, &config);
    Ok(Json(CheckoutPage {
        installment_value_cents: installment_value_cents(final_price_cents, product.installments),
        final_price_cents,
        sold_out: product.is_sold_out(),
        product,
        config,
        customization,
        testimonials,
        pixels,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_cpf: Option<String>,
    pub payment_method: PaymentMethod,
    /// Required for card payments
    #[serde(default)]
    pub card: Option<CardInput>,
}

impl CreateOrderRequest {
    fn validate(&self) -> Result<()> {
        if self.customer_name.trim().is_empty() {
            return Err(AppError::BadRequest("Nome é obrigatório".into()));
        }
        let email = self.customer_email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::BadRequest("E-mail inválido".into()));
        }
        Ok(())
    }
}

/// What the processor returned for a new charge.
struct ProcessorResult {
    charge: AsaasCharge,
    pix: Option<PixQrCode>,
}

/// Create the order for a product and, when a processor is configured for the
/// chosen method, the matching charge.
pub async fn create_order(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ClientIp(client_key): ClientIp,
    Json(input): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<PublicOrder>)> {
    if state.order_limiter.check_key(&client_key).is_err() {
        tracing::warn!(client = %client_key, "Order rate limit exceeded");
        return Err(AppError::TooManyRequests);
    }

    input.validate()?;
    let method = input.payment_method;
    let card = match method {
        PaymentMethod::Cartao => {
            let raw = input
                .card
                .as_ref()
                .ok_or_else(|| AppError::BadRequest("Dados do cartão são obrigatórios".into()))?;
            Some(validate_card(raw)?)
        }
        _ => None,
    };

    let product = active_product_by_slug(&state, &slug)?;
    let config = resolve_checkout_config(&state.db, Some(&product.id));
    if !config.accepts(method) {
        return Err(AppError::BadRequest(
            "Forma de pagamento não disponível para este produto".into(),
        ));
    }

    let processor = {
        let conn = state.db.get()?;
        queries::get_asaas_settings(&conn, &state.master_key)?
    }
    .filter(|s| match method {
        PaymentMethod::Pix => s.pix_enabled,
        PaymentMethod::Cartao => s.card_enabled,
        PaymentMethod::Boleto => true,
    });

    let static_pix_code = match (method, &processor) {
        (PaymentMethod::Pix, None) => {
            if config.pix_key.trim().is_empty() {
                return Err(AppError::BadRequest(
                    "PIX não está configurado para este produto".into(),
                ));
            }
            Some(config.pix_key.clone())
        }
        _ => None,
    };
    let now = queries::now();
    let pix_expires_at = (method == PaymentMethod::Pix)
        .then(|| now + i64::from(config.pix_expiration_minutes.max(1)) * 60);

    let order = {
        let conn = state.db.get()?;
        if !queries::try_reserve_stock(&conn, &product.id)? {
            return Err(AppError::Conflict("Produto esgotado".into()));
        }
        let created = queries::create_order(
            &conn,
            &CreateOrder {
                product_id: product.id.clone(),
                customer_name: input.customer_name.trim().to_string(),
                customer_email: input.customer_email.trim().to_string(),
                customer_phone: input.customer_phone.clone(),
                customer_cpf: input.customer_cpf.clone(),
                amount_cents: checkout_price_cents(&product, &config),
                payment_method: method,
                pix_code: static_pix_code,
                pix_expires_at,
            },
            now,
        );
        match created {
            Ok(order) => order,
            Err(e) => {
                queries::release_stock(&conn, &product.id)?;
                return Err(e);
            }
        }
    };

    tracing::info!(
        order_id = %order.id,
        product_id = %product.id,
        payment_method = method.as_ref(),
        amount_cents = order.amount_cents,
        "Order created"
    );

    let mut order = order;
    let mut card_token = None;
    if let Some(settings) = processor {
        match charge_with_asaas(&state, &settings, &order, &product, card.as_ref()).await {
            Ok(result) => {
                card_token = result.charge.card_token.clone();
                order = record_charge(&state, order, result)?;
            }
            Err(e) => {
                tracing::error!(order_id = %order.id, error = %e, "Failed to create processor charge");
                let conn = state.db.get()?;
                queries::release_stock(&conn, &product.id)?;
                return Err(e);
            }
        }
    }

    if let Some(card) = &card {
        store_card_details(&state, &order, card, card_token)?;
    }

    Ok((StatusCode::CREATED, Json(PublicOrder::new(order, queries::now()))))
}

async fn charge_with_asaas(
    state: &AppState,
    settings: &AsaasSettings,
    order: &Order,
    product: &Product,
    card: Option<&ValidatedCard>,
) -> Result<ProcessorResult> {
    let client = AsaasClient::new(state.http.clone(), settings, state.asaas_base_url.as_deref());
    let customer = AsaasCustomer {
        name: &order.customer_name,
        email: &order.customer_email,
        cpf: order.customer_cpf.as_deref(),
        phone: order.customer_phone.as_deref(),
    };

    let customer_id = client.create_customer(customer, &order.id).await?;
    let charge = client
        .create_payment(&customer_id, customer, order, &product.name, card)
        .await?;
    let pix = match order.payment_method {
        PaymentMethod::Pix => Some(client.get_pix_qr_code(&charge.payment_id).await?),
        _ => None,
    };

    Ok(ProcessorResult { charge, pix })
}

/// Persist processor details and apply the charge's initial status.
fn record_charge(state: &AppState, order: Order, result: ProcessorResult) -> Result<Order> {
    let conn = state.db.get()?;
    let details = OrderProcessorDetails {
        processor_payment_id: Some(result.charge.payment_id.clone()),
        pix_code: result.pix.as_ref().map(|p| p.payload.clone()),
        pix_qr_image: result.pix.map(|p| p.encoded_image),
    };
    queries::set_order_processor_details(&conn, &order.id, &details)?;

    let order = queries::get_order_by_id(&conn, &order.id)?
        .ok_or_else(|| AppError::Internal("Order vanished after charge".into()))?;
    apply_verification(&conn, order, outcome_for_asaas_status(&result.charge.status))
}

fn store_card_details(
    state: &AppState,
    order: &Order,
    card: &ValidatedCard,
    processor_token: Option<String>,
) -> Result<()> {
    let conn = state.db.get()?;
    queries::create_payment_info(
        &conn,
        &CreatePaymentInfo {
            order_id: order.id.clone(),
            holder_name: card.holder_name.clone(),
            card_brand: card.brand.to_string(),
            card_last4: card.last4.clone(),
            expiry_month: card.expiry_month,
            expiry_year: card.expiry_year,
            fingerprint: state.master_key.card_fingerprint(&card.number)?,
            processor_token,
        },
    )?;
    Ok(())
}
