// src/services/auth.rs

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::{common::error::AppError, models::auth::Claims};

// Autenticación sin estado: una única credencial de administrador
// configurada por entorno y tokens firmados de 7 días. No hay refresh
// ni lista de revocación; vencido el token, se vuelve a hacer login.
#[derive(Clone)]
pub struct AuthService {
    admin_user: String,
    admin_pass: String,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(admin_user: String, admin_pass: String, jwt_secret: String) -> Self {
        Self {
            admin_user,
            admin_pass,
            jwt_secret,
        }
    }

    pub fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        // Comparación exacta contra el par configurado. El error es el
        // mismo en ambos casos para no revelar cuál campo falló.
        if username != self.admin_user || password != self.admin_pass {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(username)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims)
    }

    fn create_token(&self, username: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: username.to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
