// src/handlers/imagenes.rs

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::planes::{ImagenSubidaRespuesta, MensajeRespuesta, ReorderPayload},
};

// POST /api/admin/planes/{id}/imagenes — multipart con el campo "imagen"
#[utoipa::path(
    post,
    path = "/api/admin/planes/{id}/imagenes",
    tag = "Imagenes",
    request_body(content = String, content_type = "multipart/form-data", description = "Archivo en el campo `imagen`"),
    responses(
        (status = 201, description = "Imagen subida a Cloudinary y registrada", body = ImagenSubidaRespuesta),
        (status = 404, description = "Plan no encontrado")
    ),
    params(("id" = i64, Path, description = "ID del plan")),
    security(("api_jwt" = []))
)]
pub async fn upload_imagen(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut archivo: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| anyhow::anyhow!("multipart inválido: {e}"))?
    {
        if field.name() == Some("imagen") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| anyhow::anyhow!("no se pudo leer el archivo: {e}"))?;
            archivo = Some(bytes.to_vec());
        }
    }

    let bytes = archivo.ok_or(AppError::MissingImageFile)?;
    let imagen = app_state.plan_service.add_imagen(id, bytes).await?;

    Ok((
        StatusCode::CREATED,
        Json(ImagenSubidaRespuesta {
            id: imagen.id,
            url: imagen.url,
            public_id: imagen.public_id,
            message: "Imagen subida".to_string(),
        }),
    ))
}

// Para migrar fotos que ya viven en otro hosting
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ImagenUrlPayload {
    #[validate(length(min = 1, message = "La URL es obligatoria."))]
    #[schema(example = "https://vieja-web.example.com/amarok.jpg")]
    pub url: String,
}

// POST /api/admin/planes/{id}/imagenes-url
#[utoipa::path(
    post,
    path = "/api/admin/planes/{id}/imagenes-url",
    tag = "Imagenes",
    request_body = ImagenUrlPayload,
    responses(
        (status = 201, description = "Imagen migrada desde la URL", body = ImagenSubidaRespuesta),
        (status = 404, description = "Plan no encontrado")
    ),
    params(("id" = i64, Path, description = "ID del plan")),
    security(("api_jwt" = []))
)]
pub async fn upload_imagen_url(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ImagenUrlPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let imagen = app_state
        .plan_service
        .add_imagen_from_url(id, &payload.url)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ImagenSubidaRespuesta {
            id: imagen.id,
            url: imagen.url,
            public_id: imagen.public_id,
            message: "Imagen migrada desde URL".to_string(),
        }),
    ))
}

// DELETE /api/admin/imagenes/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/imagenes/{id}",
    tag = "Imagenes",
    responses(
        (status = 200, description = "Imagen eliminada", body = MensajeRespuesta),
        (status = 404, description = "Imagen no encontrada")
    ),
    params(("id" = i64, Path, description = "ID de la imagen")),
    security(("api_jwt" = []))
)]
pub async fn delete_imagen(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MensajeRespuesta>, AppError> {
    app_state.plan_service.delete_imagen(id).await?;

    Ok(Json(MensajeRespuesta {
        message: "Imagen eliminada".to_string(),
    }))
}

// PUT /api/admin/imagenes/reorder
#[utoipa::path(
    put,
    path = "/api/admin/imagenes/reorder",
    tag = "Imagenes",
    request_body = ReorderPayload,
    responses(
        (status = 200, description = "Orden aplicado completo", body = MensajeRespuesta)
    ),
    security(("api_jwt" = []))
)]
pub async fn reorder_imagenes(
    State(app_state): State<AppState>,
    Json(payload): Json<ReorderPayload>,
) -> Result<Json<MensajeRespuesta>, AppError> {
    app_state.plan_service.reorder(&payload.orden).await?;

    Ok(Json(MensajeRespuesta {
        message: "Orden actualizado".to_string(),
    }))
}
