// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Datos para login del administrador
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "El usuario es obligatorio."))]
    #[schema(example = "admin")]
    pub username: String,

    #[validate(length(min = 1, message = "La contraseña es obligatoria."))]
    pub password: String,
}

// Respuesta de autenticación con el token y el usuario
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: String,
}

// Estructura de datos ("claims") dentro del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (usuario admin)
    pub exp: usize,  // Expiration time (cuándo vence el token)
    pub iat: usize,  // Issued At (cuándo se emitió)
}
