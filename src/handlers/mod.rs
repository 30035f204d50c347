pub mod auth;
pub mod imagenes;
pub mod planes;
pub mod site_config;

use axum::Json;
use chrono::Utc;
use serde_json::{Value, json};

// GET /api/health — solo vida del proceso, sin tocar la base
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": Utc::now() }))
}
