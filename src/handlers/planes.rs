// src/handlers/planes.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::planes::{MensajeRespuesta, PlanAdmin, PlanCreadoRespuesta, PlanPayload, PlanPublico},
};

// GET /api/planes — lo consume la landing pública
#[utoipa::path(
    get,
    path = "/api/planes",
    tag = "Planes",
    responses(
        (status = 200, description = "Planes activos con sus imágenes", body = [PlanPublico])
    )
)]
pub async fn list_public(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<PlanPublico>>, AppError> {
    let planes = app_state.plan_service.list_public().await?;
    Ok(Json(planes))
}

// GET /api/admin/planes
#[utoipa::path(
    get,
    path = "/api/admin/planes",
    tag = "Planes",
    responses(
        (status = 200, description = "Todos los planes, activos o no", body = [PlanAdmin])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_admin(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<PlanAdmin>>, AppError> {
    let planes = app_state.plan_service.list_admin().await?;
    Ok(Json(planes))
}

// POST /api/admin/planes
#[utoipa::path(
    post,
    path = "/api/admin/planes",
    tag = "Planes",
    request_body = PlanPayload,
    responses(
        (status = 201, description = "Plan creado", body = PlanCreadoRespuesta)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_plan(
    State(app_state): State<AppState>,
    Json(payload): Json<PlanPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let id = app_state.plan_service.create(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(PlanCreadoRespuesta {
            id,
            message: "Plan creado".to_string(),
        }),
    ))
}

// PUT /api/admin/planes/{id} — reemplazo completo de los campos mutables
#[utoipa::path(
    put,
    path = "/api/admin/planes/{id}",
    tag = "Planes",
    request_body = PlanPayload,
    responses(
        (status = 200, description = "Plan actualizado", body = MensajeRespuesta),
        (status = 404, description = "Plan no encontrado")
    ),
    params(("id" = i64, Path, description = "ID del plan")),
    security(("api_jwt" = []))
)]
pub async fn update_plan(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PlanPayload>,
) -> Result<Json<MensajeRespuesta>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state.plan_service.update(id, &payload).await?;

    Ok(Json(MensajeRespuesta {
        message: "Plan actualizado".to_string(),
    }))
}

// DELETE /api/admin/planes/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/planes/{id}",
    tag = "Planes",
    responses(
        (status = 200, description = "Plan e imágenes eliminados", body = MensajeRespuesta),
        (status = 404, description = "Plan no encontrado")
    ),
    params(("id" = i64, Path, description = "ID del plan")),
    security(("api_jwt" = []))
)]
pub async fn delete_plan(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MensajeRespuesta>, AppError> {
    app_state.plan_service.delete(id).await?;

    Ok(Json(MensajeRespuesta {
        message: "Plan eliminado".to_string(),
    }))
}
