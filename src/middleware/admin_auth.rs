use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use subtle::ConstantTimeEq;

use crate::crypto::hash_secret;
use crate::db::AppState;
use crate::error::{AppError, Result};

/// Require `Authorization: Bearer <ADMIN_API_KEY>` on the admin surface.
///
/// Only a hash of the key is held in state; the comparison runs in constant time.
pub async fn admin_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let auth = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::Unauthorized)?;

    let provided = hash_secret(auth.token().trim());
    let valid: bool = provided
        .as_bytes()
        .ct_eq(state.admin_key_hash.as_bytes())
        .into();
    if !valid {
        tracing::warn!(path = %request.uri().path(), "Rejected admin request with invalid key");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
