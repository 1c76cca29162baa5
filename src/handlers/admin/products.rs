use axum::{extract::State, http::StatusCode};

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::models::{CreateProduct, Product, UpdateProduct};
use crate::slug::{normalize_explicit, slugify, unique_slug};

/// Base used when a product name has nothing slug-worthy in it.
const FALLBACK_SLUG: &str = "produto";

fn validate_pricing(price_cents: Option<i64>, installments: Option<i32>) -> Result<()> {
    if price_cents.is_some_and(|p| p < 0) {
        return Err(AppError::BadRequest("price_cents must not be negative".into()));
    }
    if installments.is_some_and(|n| n < 1) {
        return Err(AppError::BadRequest("installments must be at least 1".into()));
    }
    Ok(())
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("Product name is required".into()));
    }
    validate_pricing(Some(input.price_cents), Some(input.installments))?;

    let conn = state.db.get()?;
    let slug = match input.slug.as_deref() {
        Some(explicit) => {
            let slug = normalize_explicit(explicit)?;
            if queries::slug_exists(&conn, &slug, None)? {
                return Err(AppError::Conflict(format!("Slug '{}' is already in use", slug)));
            }
            slug
        }
        None => {
            let base = slugify(&input.name);
            let base = if base.is_empty() { FALLBACK_SLUG.to_string() } else { base };
            unique_slug(&conn, &base, None)?
        }
    };

    let product = queries::create_product(&conn, &input, &slug)?;
    tracing::info!(product_id = %product.id, slug = %product.slug, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let conn = state.db.get()?;
    Ok(Json(queries::list_products(&conn)?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let conn = state.db.get()?;
    let product = queries::get_product_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    Ok(Json(product))
}

pub async fn get_product_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Product>> {
    let conn = state.db.get()?;
    let product = queries::get_product_by_slug(&conn, &slug)?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut input): Json<UpdateProduct>,
) -> Result<Json<Product>> {
    if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("Product name must not be empty".into()));
    }
    validate_pricing(input.price_cents, input.installments)?;

    let conn = state.db.get()?;
    queries::get_product_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    if let Some(explicit) = input.slug.as_deref() {
        let slug = normalize_explicit(explicit)?;
        if queries::slug_exists(&conn, &slug, Some(&id))? {
            return Err(AppError::Conflict(format!("Slug '{}' is already in use", slug)));
        }
        input.slug = Some(slug);
    }

    queries::update_product(&conn, &id, &input)?;
    let product = queries::get_product_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    Ok(Json(product))
}

/// Delete a product with its configuration. Products with orders are kept
/// (deactivate them instead).
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let conn = state.db.get()?;
    queries::get_product_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    if queries::count_orders_for_product(&conn, &id)? > 0 {
        return Err(AppError::Conflict(
            "Product has orders; deactivate it instead".into(),
        ));
    }

    queries::delete_product(&conn, &id)?;
    tracing::info!(product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
