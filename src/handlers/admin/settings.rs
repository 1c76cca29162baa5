use axum::extract::State;
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::models::{AsaasSettingsMasked, UpdateAsaasSettings};

#[derive(Debug, Serialize)]
pub struct AsaasSettingsResponse {
    pub configured: bool,
    #[serde(flatten)]
    pub settings: Option<AsaasSettingsMasked>,
}

pub async fn get_asaas_settings(
    State(state): State<AppState>,
) -> Result<Json<AsaasSettingsResponse>> {
    let conn = state.db.get()?;
    let settings = queries::get_asaas_settings(&conn, &state.master_key)?;
    Ok(Json(AsaasSettingsResponse {
        configured: settings.is_some(),
        settings: settings.as_ref().map(AsaasSettingsMasked::from),
    }))
}

pub async fn put_asaas_settings(
    State(state): State<AppState>,
    Json(input): Json<UpdateAsaasSettings>,
) -> Result<Json<AsaasSettingsResponse>> {
    if input.api_key.trim().is_empty() {
        return Err(AppError::BadRequest("api_key is required".into()));
    }

    let conn = state.db.get()?;
    let settings = queries::upsert_asaas_settings(&conn, &input, &state.master_key)?;
    tracing::info!(
        environment = settings.environment.as_ref(),
        pix_enabled = settings.pix_enabled,
        card_enabled = settings.card_enabled,
        "Payment processor settings updated"
    );

    Ok(Json(AsaasSettingsResponse {
        configured: true,
        settings: Some(AsaasSettingsMasked::from(&settings)),
    }))
}
