// src/models/planes.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// Representa un plan de financiación tal como vive en la base de datos
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Plan {
    pub id: i64,
    pub modelo: String,
    pub version: String,

    // Los precios son strings ya formateados (moneda y separadores se
    // resuelven en el panel de carga, no acá).
    pub valor: String,
    pub anticipo: String,
    pub cuota: String,

    pub tipo: String,
    pub adjudicacion: String,
    pub whatsapp_texto: String,

    // Controla la visibilidad en la landing pública
    pub activo: bool,
    pub orden: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct PlanImagen {
    pub id: i64,
    pub plan_id: i64,
    pub url: String,

    // Identificador que Cloudinary exige para pedir el borrado remoto.
    // Vacío para imágenes que no pasaron por el adaptador de media.
    pub public_id: String,

    pub orden: i32,
    pub created_at: DateTime<Utc>,
}

// Vista pública de una imagen: sin el public_id interno
#[derive(Debug, Serialize, ToSchema)]
pub struct ImagenPublica {
    pub id: i64,
    pub url: String,
    pub orden: i32,
}

impl From<PlanImagen> for ImagenPublica {
    fn from(img: PlanImagen) -> Self {
        Self {
            id: img.id,
            url: img.url,
            orden: img.orden,
        }
    }
}

// Plan con sus imágenes embebidas, como lo consume la landing
#[derive(Debug, Serialize, ToSchema)]
pub struct PlanPublico {
    #[serde(flatten)]
    pub plan: Plan,
    pub imagenes: Vec<ImagenPublica>,
}

// Versión para el panel de administración: incluye el public_id
// de cada imagen para poder gestionarlas.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlanAdmin {
    #[serde(flatten)]
    pub plan: Plan,
    pub imagenes: Vec<PlanImagen>,
}

// Datos de alta/edición de un plan. El PUT es un reemplazo completo
// de los campos mutables, así que el payload es el mismo en ambos casos.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PlanPayload {
    #[validate(length(min = 1, message = "El modelo es obligatorio."))]
    #[schema(example = "Amarok")]
    pub modelo: String,

    #[validate(length(min = 1, message = "La versión es obligatoria."))]
    #[schema(example = "Trendline 4x2 MT")]
    pub version: String,

    #[serde(default)]
    pub valor: String,

    #[serde(default)]
    pub anticipo: String,

    #[serde(default)]
    pub cuota: String,

    #[serde(default = "default_tipo")]
    #[schema(example = "70/30")]
    pub tipo: String,

    #[serde(default = "default_adjudicacion")]
    #[schema(example = "cuota 2")]
    pub adjudicacion: String,

    #[serde(default)]
    pub whatsapp_texto: String,

    #[serde(default = "default_activo")]
    pub activo: bool,

    #[serde(default)]
    pub orden: i32,
}

fn default_tipo() -> String {
    "70/30".to_string()
}

fn default_adjudicacion() -> String {
    "cuota 2".to_string()
}

fn default_activo() -> bool {
    true
}

// Un elemento del reordenamiento de imágenes
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImagenOrden {
    pub id: i64,
    pub orden: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReorderPayload {
    pub orden: Vec<ImagenOrden>,
}

// ---
// Respuestas
// ---

#[derive(Debug, Serialize, ToSchema)]
pub struct MensajeRespuesta {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlanCreadoRespuesta {
    pub id: i64,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImagenSubidaRespuesta {
    pub id: i64,
    pub url: String,
    pub public_id: String,
    pub message: String,
}
