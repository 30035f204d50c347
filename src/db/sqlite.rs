// src/db/sqlite.rs

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::{
    common::error::AppError,
    models::planes::{ImagenOrden, Plan, PlanImagen, PlanPayload},
};

use super::{CONFIG_SEED, Storage};

// Variante embebida: un único archivo de base de datos, con WAL activado.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn init_schema(&self) -> Result<(), AppError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS planes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                modelo TEXT NOT NULL,
                version TEXT NOT NULL,
                valor TEXT NOT NULL DEFAULT '',
                anticipo TEXT NOT NULL DEFAULT '',
                cuota TEXT NOT NULL DEFAULT '',
                tipo TEXT NOT NULL DEFAULT '70/30',
                adjudicacion TEXT NOT NULL DEFAULT 'cuota 2',
                whatsapp_texto TEXT NOT NULL DEFAULT '',
                activo BOOLEAN NOT NULL DEFAULT 1,
                orden INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS plan_imagenes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                plan_id INTEGER NOT NULL REFERENCES planes(id) ON DELETE CASCADE,
                url TEXT NOT NULL,
                public_id TEXT NOT NULL DEFAULT '',
                orden INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
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
                sqlx::query("INSERT INTO config (key, value) VALUES (?, ?)")
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
            "SELECT * FROM planes WHERE activo = 1 ORDER BY orden, id"
        } else {
            "SELECT * FROM planes ORDER BY orden, id"
        };

        Ok(sqlx::query_as::<_, Plan>(sql).fetch_all(&self.pool).await?)
    }

    async fn plan_exists(&self, id: i64) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM planes WHERE id = ?)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn insert_plan(&self, datos: &PlanPayload) -> Result<i64, AppError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO planes (modelo, version, valor, anticipo, cuota, tipo, adjudicacion, whatsapp_texto, activo, orden, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
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
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn update_plan(&self, id: i64, datos: &PlanPayload) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE planes SET modelo = ?, version = ?, valor = ?, anticipo = ?, cuota = ?, tipo = ?, adjudicacion = ?, whatsapp_texto = ?, activo = ?, orden = ?, updated_at = ?
             WHERE id = ?",
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

        sqlx::query("DELETE FROM plan_imagenes WHERE plan_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM planes WHERE id = ?")
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
            "SELECT * FROM plan_imagenes WHERE plan_id = ? ORDER BY orden, id",
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
            "SELECT COALESCE(MAX(orden), 0) FROM plan_imagenes WHERE plan_id = ?",
        )
        .bind(plan_id)
        .fetch_one(&mut *tx)
        .await?;

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO plan_imagenes (plan_id, url, public_id, orden, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(plan_id)
        .bind(url)
        .bind(public_id)
        .bind(max_orden + 1)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
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
            sqlx::query_as::<_, PlanImagen>("SELECT * FROM plan_imagenes WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn delete_imagen(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM plan_imagenes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn reorder_imagenes(&self, items: &[ImagenOrden]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for item in items {
            sqlx::query("UPDATE plan_imagenes SET orden = ? WHERE id = ?")
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
                "INSERT INTO config (key, value) VALUES (?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
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
