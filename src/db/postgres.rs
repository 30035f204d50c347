// src/db/postgres.rs

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{
    Row,
    postgres::{PgPool, PgPoolOptions},
};

use crate::{
    common::error::AppError,
    models::planes::{ImagenOrden, Plan, PlanImagen, PlanPayload},
};

use super::{CONFIG_SEED, Storage};

// Variante en red: pool acotado de conexiones. Si el servidor no está
// accesible en el arranque, el error se propaga y el proceso termina.
#[derive(Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await?;

        tracing::info!("✅ Conexión con Postgres establecida");

        Ok(Self { pool })
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn init_schema(&self) -> Result<(), AppError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS planes (
                id BIGSERIAL PRIMARY KEY,
                modelo TEXT NOT NULL,
                version TEXT NOT NULL,
                valor TEXT NOT NULL DEFAULT '',
                anticipo TEXT NOT NULL DEFAULT '',
                cuota TEXT NOT NULL DEFAULT '',
                tipo TEXT NOT NULL DEFAULT '70/30',
                adjudicacion TEXT NOT NULL DEFAULT 'cuota 2',
                whatsapp_texto TEXT NOT NULL DEFAULT '',
                activo BOOLEAN NOT NULL DEFAULT TRUE,
                orden INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS plan_imagenes (
                id BIGSERIAL PRIMARY KEY,
                plan_id BIGINT NOT NULL REFERENCES planes(id) ON DELETE CASCADE,
                url TEXT NOT NULL,
                public_id TEXT NOT NULL DEFAULT '',
                orden INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS config (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL DEFAULT ''
            )",
        )
        .execute(&self.pool)
        .await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM config")
            .fetch_one(&self.pool)
            .await?;

        if count == 0 {
            for (key, value) in CONFIG_SEED {
                sqlx::query("INSERT INTO config (key, value) VALUES ($1, $2)")
                    .bind(key)
                    .bind(value)
                    .execute(&self.pool)
                    .await?;
            }
        }

        Ok(())
    }

    async fn list_planes(&self, solo_activos: bool) -> Result<Vec<Plan>, AppError> {
        let sql = if solo_activos {
            "SELECT * FROM planes WHERE activo = TRUE ORDER BY orden, id"
        } else {
            "SELECT * FROM planes ORDER BY orden, id"
        };

        Ok(sqlx::query_as::<_, Plan>(sql).fetch_all(&self.pool).await?)
    }

    async fn plan_exists(&self, id: i64) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM planes WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn insert_plan(&self, datos: &PlanPayload) -> Result<i64, AppError> {
        let now = Utc::now();

        let row = sqlx::query(
            "INSERT INTO planes (modelo, version, valor, anticipo, cuota, tipo, adjudicacion, whatsapp_texto, activo, orden, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING id",
        )
        .bind(&datos.modelo)
        .bind(&datos.version)
        .bind(&datos.valor)
        .bind(&datos.anticipo)
        .bind(&datos.cuota)
        .bind(&datos.tipo)
        .bind(&datos.adjudicacion)
        .bind(&datos.whatsapp_texto)
        .bind(datos.activo)
        .bind(datos.orden)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<i64, _>("id"))
    }

    async fn update_plan(&self, id: i64, datos: &PlanPayload) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE planes SET modelo = $1, version = $2, valor = $3, anticipo = $4, cuota = $5, tipo = $6, adjudicacion = $7, whatsapp_texto = $8, activo = $9, orden = $10, updated_at = $11
             WHERE id = $12",
        )
        .bind(&datos.modelo)
        .bind(&datos.version)
        .bind(&datos.valor)
        .bind(&datos.anticipo)
        .bind(&datos.cuota)
        .bind(&datos.tipo)
        .bind(&datos.adjudicacion)
        .bind(&datos.whatsapp_texto)
        .bind(datos.activo)
        .bind(datos.orden)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_plan(&self, id: i64) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;

        // La FK ya es ON DELETE CASCADE, pero mantenemos el orden explícito:
        // primero las imágenes, después el plan.
        sqlx::query("DELETE FROM plan_imagenes WHERE plan_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM planes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }

    async fn list_imagenes(&self) -> Result<Vec<PlanImagen>, AppError> {
        Ok(sqlx::query_as::<_, PlanImagen>(
            "SELECT * FROM plan_imagenes ORDER BY plan_id, orden, id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn imagenes_by_plan(&self, plan_id: i64) -> Result<Vec<PlanImagen>, AppError> {
        Ok(sqlx::query_as::<_, PlanImagen>(
            "SELECT * FROM plan_imagenes WHERE plan_id = $1 ORDER BY orden, id",
        )
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_imagen(
        &self,
        plan_id: i64,
        url: &str,
        public_id: &str,
    ) -> Result<PlanImagen, AppError> {
        let mut tx = self.pool.begin().await?;

        let max_orden: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(orden), 0) FROM plan_imagenes WHERE plan_id = $1",
        )
        .bind(plan_id)
        .fetch_one(&mut *tx)
        .await?;

        let now = Utc::now();
        let row = sqlx::query(
            "INSERT INTO plan_imagenes (plan_id, url, public_id, orden, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(plan_id)
        .bind(url)
        .bind(public_id)
        .bind(max_orden + 1)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let id = row.get::<i64, _>("id");
        tx.commit().await?;

        Ok(PlanImagen {
            id,
            plan_id,
            url: url.to_string(),
            public_id: public_id.to_string(),
            orden: max_orden + 1,
            created_at: now,
        })
    }

    async fn get_imagen(&self, id: i64) -> Result<Option<PlanImagen>, AppError> {
        Ok(
            sqlx::query_as::<_, PlanImagen>("SELECT * FROM plan_imagenes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn delete_imagen(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM plan_imagenes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn reorder_imagenes(&self, items: &[ImagenOrden]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for item in items {
            sqlx::query("UPDATE plan_imagenes SET orden = $1 WHERE id = $2")
                .bind(item.orden)
                .bind(item.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn config_all(&self) -> Result<HashMap<String, String>, AppError> {
        let rows = sqlx::query_as::<_, (String, String)>("SELECT key, value FROM config")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().collect())
    }

    async fn config_upsert(&self, entries: &HashMap<String, String>) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for (key, value) in entries {
            sqlx::query(
                "INSERT INTO config (key, value) VALUES ($1, $2)
                 ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }
}
