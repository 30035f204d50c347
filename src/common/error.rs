use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nuestro tipo de error, con `thiserror` para mejor ergonomía.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Plan no encontrado")]
    PlanNotFound,

    #[error("Imagen no encontrada")]
    ImagenNotFound,

    #[error("Falta el archivo de imagen")]
    MissingImageFile,

    // Variante para errores de base de datos (sqlx)
    #[error("Error de base de datos")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para cualquier otro error inesperado.
    // `anyhow::Error` conserva el contexto (p. ej. fallos de Cloudinary).
    #[error("Error interno del servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Error de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Devolvemos todos los detalles de la validación, campo por campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Uno o más campos son inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            // Mensaje genérico a propósito: no distinguimos usuario de contraseña.
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Credenciales inválidas"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Token inválido"),
            AppError::PlanNotFound => (StatusCode::NOT_FOUND, "Plan no encontrado"),
            AppError::ImagenNotFound => (StatusCode::NOT_FOUND, "Imagen no encontrada"),
            AppError::MissingImageFile => (StatusCode::BAD_REQUEST, "Falta el archivo de imagen"),

            // Todos los demás (DatabaseError, InternalServerError, JwtError) son 500.
            // El detalle queda en el log; al cliente solo le llega un mensaje genérico.
            ref e => {
                tracing::error!("Error interno del servidor: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocurrió un error inesperado.",
                )
            }
        };

        // Respuesta estándar para errores simples que solo llevan un mensaje.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
