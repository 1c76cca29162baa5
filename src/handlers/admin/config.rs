use axum::extract::State;
use rusqlite::Connection;

use crate::checkout::{EffectiveCheckoutConfig, resolve_checkout_config};
use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::models::{
    CheckoutConfig, CheckoutCustomization, PixConfig, UpsertCheckoutConfig, UpsertCustomization,
    UpsertPixConfig,
};

pub(super) fn require_product(conn: &Connection, id: &str) -> Result<()> {
    queries::get_product_by_id(conn, id)?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("Product not found".into()))
}

pub async fn get_checkout_config(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CheckoutConfig>> {
    let conn = state.db.get()?;
    require_product(&conn, &id)?;
    let config = queries::get_checkout_config(&conn, &id)?.unwrap_or_else(|| CheckoutConfig {
        product_id: id,
        ..Default::default()
    });
    Ok(Json(config))
}

pub async fn put_checkout_config(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpsertCheckoutConfig>,
) -> Result<Json<CheckoutConfig>> {
    if input.discount_amount_cents.is_some_and(|d| d < 0) {
        return Err(AppError::BadRequest("discount_amount_cents must not be negative".into()));
    }
    if input.timer_minutes.is_some_and(|m| m < 1) {
        return Err(AppError::BadRequest("timer_minutes must be at least 1".into()));
    }
    if let (Some(min), Some(max)) = (input.visitor_count_min, input.visitor_count_max) {
        if min > max {
            return Err(AppError::BadRequest(
                "visitor_count_min must not exceed visitor_count_max".into(),
            ));
        }
    }

    let conn = state.db.get()?;
    require_product(&conn, &id)?;
    let config = queries::upsert_checkout_config(&conn, &id, &input)?;
    tracing::info!(product_id = %id, "Checkout config saved");
    Ok(Json(config))
}

pub async fn get_effective_config(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EffectiveCheckoutConfig>> {
    {
        let conn = state.db.get()?;
        require_product(&conn, &id)?;
    }
    Ok(Json(resolve_checkout_config(&state.db, Some(&id))))
}

pub async fn get_pix_config(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PixConfig>> {
    let conn = state.db.get()?;
    require_product(&conn, &id)?;
    let config = queries::get_pix_config(&conn, &id)?.unwrap_or_else(|| PixConfig {
        product_id: id,
        ..Default::default()
    });
    Ok(Json(config))
}

pub async fn put_pix_config(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpsertPixConfig>,
) -> Result<Json<PixConfig>> {
    if input.expiration_minutes.is_some_and(|m| m < 1) {
        return Err(AppError::BadRequest("expiration_minutes must be at least 1".into()));
    }

    let conn = state.db.get()?;
    require_product(&conn, &id)?;
    let config = queries::upsert_pix_config(&conn, &id, &input)?;
    tracing::info!(product_id = %id, "PIX page config saved");
    Ok(Json(config))
}

pub async fn get_customization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CheckoutCustomization>> {
    let conn = state.db.get()?;
    require_product(&conn, &id)?;
    let customization = queries::get_customization(&conn, &id)?
        .unwrap_or_else(|| CheckoutCustomization::default_for(&id));
    Ok(Json(customization))
}

pub async fn put_customization(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpsertCustomization>,
) -> Result<Json<CheckoutCustomization>> {
    if input.guarantee_days < 0 {
        return Err(AppError::BadRequest("guarantee_days must not be negative".into()));
    }

    let conn = state.db.get()?;
    require_product(&conn, &id)?;
    Ok(Json(queries::upsert_customization(&conn, &id, &input)?))
}
