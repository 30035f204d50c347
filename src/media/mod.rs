// src/media/mod.rs

pub mod cloudinary;

use anyhow::Result;
use async_trait::async_trait;

pub use cloudinary::{CloudinaryClient, CloudinaryConfig};

// Resultado de una subida al proveedor de media
#[derive(Debug, Clone)]
pub struct ImagenSubida {
    pub url: String,
    pub public_id: String,
}

// Adaptador del proveedor de media externo. Las subidas se esperan de
// forma síncrona porque la URL resultante debe persistirse; los borrados
// remotos los despacha el servicio como tareas sueltas, sin esperar.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaClient: Send + Sync {
    async fn upload_bytes(&self, bytes: Vec<u8>) -> Result<ImagenSubida>;
    async fn upload_url(&self, source_url: &str) -> Result<ImagenSubida>;
    async fn destroy(&self, public_id: &str) -> Result<()>;
}
