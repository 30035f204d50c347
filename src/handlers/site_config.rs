// src/handlers/site_config.rs

use std::collections::HashMap;

use axum::{Json, extract::State};

use crate::{common::error::AppError, config::AppState, models::planes::MensajeRespuesta};

// GET /api/config — textos de la landing
#[utoipa::path(
    get,
    path = "/api/config",
    tag = "Config",
    responses(
        (status = 200, description = "Snapshot completo de la config", body = HashMap<String, String>)
    )
)]
pub async fn get_config(
    State(app_state): State<AppState>,
) -> Result<Json<HashMap<String, String>>, AppError> {
    let config = app_state.config_service.get_all().await?;
    Ok(Json(config))
}

// PUT /api/admin/config — upsert clave por clave
#[utoipa::path(
    put,
    path = "/api/admin/config",
    tag = "Config",
    request_body = HashMap<String, String>,
    responses(
        (status = 200, description = "Config actualizada", body = MensajeRespuesta)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_config(
    State(app_state): State<AppState>,
    Json(entries): Json<HashMap<String, String>>,
) -> Result<Json<MensajeRespuesta>, AppError> {
    app_state.config_service.set_many(&entries).await?;

    Ok(Json(MensajeRespuesta {
        message: "Config actualizada".to_string(),
    }))
}
