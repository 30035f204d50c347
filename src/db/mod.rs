// src/db/mod.rs

pub mod postgres;
pub mod sqlite;

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;

use crate::{
    common::error::AppError,
    models::planes::{ImagenOrden, Plan, PlanImagen, PlanPayload},
};

pub use postgres::PostgresStorage;
pub use sqlite::SqliteStorage;

// Valores iniciales de la tabla config, solo si está vacía
pub(crate) const CONFIG_SEED: [(&str, &str); 4] = [
    ("whatsapp_number", "5491121655405"),
    ("site_title", "ALRA Planes"),
    ("hero_title", "Tu Volkswagen 0km en cuotas sin interés"),
    (
        "hero_subtitle",
        "Financiá tu Volkswagen 0km. Adjudicación asegurada desde cuota 2. Más de 42 años acompañándote.",
    ),
];

// Las dos variantes de despliegue (SQLite embebido y Postgres con pool)
// se diferencian solo en el backend de almacenamiento. Este trait expone
// las operaciones del dominio para que una única capa HTTP sirva a ambas.
#[async_trait]
pub trait Storage: Send + Sync {
    // Crea las tablas si no existen y siembra la config inicial
    // (solo si la tabla config está vacía).
    async fn init_schema(&self) -> Result<(), AppError>;

    async fn list_planes(&self, solo_activos: bool) -> Result<Vec<Plan>, AppError>;
    async fn plan_exists(&self, id: i64) -> Result<bool, AppError>;
    async fn insert_plan(&self, datos: &PlanPayload) -> Result<i64, AppError>;

    // Devuelven la cantidad de filas afectadas, para que el servicio
    // pueda distinguir un id inexistente.
    async fn update_plan(&self, id: i64, datos: &PlanPayload) -> Result<u64, AppError>;

    // Borra las imágenes del plan y el plan en una única transacción.
    async fn delete_plan(&self, id: i64) -> Result<u64, AppError>;

    // Todas las imágenes, ordenadas por (plan_id, orden, id), para
    // embeberlas agrupadas en los listados.
    async fn list_imagenes(&self) -> Result<Vec<PlanImagen>, AppError>;
    async fn imagenes_by_plan(&self, plan_id: i64) -> Result<Vec<PlanImagen>, AppError>;

    // Asigna orden = MAX(orden) + 1 dentro de la misma transacción del insert.
    async fn insert_imagen(
        &self,
        plan_id: i64,
        url: &str,
        public_id: &str,
    ) -> Result<PlanImagen, AppError>;

    async fn get_imagen(&self, id: i64) -> Result<Option<PlanImagen>, AppError>;
    async fn delete_imagen(&self, id: i64) -> Result<u64, AppError>;

    // Aplica todos los cambios de orden o ninguno.
    async fn reorder_imagenes(&self, items: &[ImagenOrden]) -> Result<(), AppError>;

    async fn config_all(&self) -> Result<HashMap<String, String>, AppError>;

    // Upsert por clave, en una única transacción.
    async fn config_upsert(&self, entries: &HashMap<String, String>) -> Result<(), AppError>;
}

// Selecciona el backend según el esquema de la URL de conexión.
pub async fn connect(database_url: &str) -> anyhow::Result<Arc<dyn Storage>> {
    if database_url.starts_with("sqlite") {
        let storage = SqliteStorage::connect(database_url).await?;
        Ok(Arc::new(storage))
    } else {
        let storage = PostgresStorage::connect(database_url).await?;
        Ok(Arc::new(storage))
    }
}
