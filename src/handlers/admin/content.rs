use axum::{extract::State, http::StatusCode};

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::models::{CreatePixel, CreateTestimonial, Pixel, Testimonial, UpdateTestimonial};

use super::config::require_product;

fn validate_rating(rating: i32) -> Result<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::BadRequest("rating must be between 1 and 5".into()));
    }
    Ok(())
}

// ============ Pixels ============

pub async fn create_pixel(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(input): Json<CreatePixel>,
) -> Result<(StatusCode, Json<Pixel>)> {
    if input.pixel_id.trim().is_empty() {
        return Err(AppError::BadRequest("pixel_id is required".into()));
    }

    let conn = state.db.get()?;
    require_product(&conn, &product_id)?;
    let pixel = queries::create_pixel(&conn, &product_id, &input)?;
    Ok((StatusCode::CREATED, Json(pixel)))
}

pub async fn list_pixels(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Vec<Pixel>>> {
    let conn = state.db.get()?;
    require_product(&conn, &product_id)?;
    Ok(Json(queries::list_pixels_for_product(&conn, &product_id, false)?))
}

pub async fn delete_pixel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let conn = state.db.get()?;
    if !queries::delete_pixel(&conn, &id)? {
        return Err(AppError::NotFound("Pixel not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ============ Testimonials ============

pub async fn create_testimonial(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(input): Json<CreateTestimonial>,
) -> Result<(StatusCode, Json<Testimonial>)> {
    if input.author_name.trim().is_empty() || input.text.trim().is_empty() {
        return Err(AppError::BadRequest("author_name and text are required".into()));
    }
    validate_rating(input.rating)?;

    let conn = state.db.get()?;
    require_product(&conn, &product_id)?;
    let testimonial = queries::create_testimonial(&conn, &product_id, &input)?;
    Ok((StatusCode::CREATED, Json(testimonial)))
}

pub async fn list_testimonials(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Vec<Testimonial>>> {
    let conn = state.db.get()?;
    require_product(&conn, &product_id)?;
    Ok(Json(queries::list_testimonials_for_product(&conn, &product_id, false)?))
}

pub async fn update_testimonial(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTestimonial>,
) -> Result<Json<Testimonial>> {
    if let Some(rating) = input.rating {
        validate_rating(rating)?;
    }

    let conn = state.db.get()?;
    queries::get_testimonial_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Testimonial not found".into()))?;
    queries::update_testimonial(&conn, &id, &input)?;
    let testimonial = queries::get_testimonial_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Testimonial not found".into()))?;
    Ok(Json(testimonial))
}

pub async fn delete_testimonial(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let conn = state.db.get()?;
    if !queries::delete_testimonial(&conn, &id)? {
        return Err(AppError::NotFound("Testimonial not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
