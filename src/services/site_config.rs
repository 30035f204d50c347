// src/services/site_config.rs

use std::collections::HashMap;
use std::sync::Arc;

use crate::{common::error::AppError, db::Storage};

// Textos y datos de contacto de la landing, como clave/valor abierto.
// La ausencia de una clave es un estado válido, no un error.
#[derive(Clone)]
pub struct ConfigService {
    storage: Arc<dyn Storage>,
}

impl ConfigService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn get_all(&self) -> Result<HashMap<String, String>, AppError> {
        self.storage.config_all().await
    }

    pub async fn set_many(&self, entries: &HashMap<String, String>) -> Result<(), AppError> {
        self.storage.config_upsert(entries).await
    }
}
