// src/middleware/auth.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use crate::{common::error::AppError, config::AppState};

// Guardián de las rutas de administración: valida el bearer antes de que
// corra cualquier handler. El header ausente o malformado, el token
// vencido o firmado con otro secreto terminan todos en el mismo 401.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|_| AppError::InvalidToken)?;

    app_state.auth_service.validate_token(bearer.token())?;

    Ok(next.run(request).await)
}
