// src/media/cloudinary.rs

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::{ImagenSubida, MediaClient};

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
}

pub struct CloudinaryClient {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{}",
            self.config.cloud_name, action
        )
    }

    // Firma como exige Cloudinary: pares clave=valor ordenados
    // alfabéticamente, unidos con '&', con el api_secret concatenado al final.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut ordenados: Vec<(&str, &str)> = params.to_vec();
        ordenados.sort_by_key(|(clave, _)| *clave);

        let cadena = ordenados
            .iter()
            .map(|(clave, valor)| format!("{clave}={valor}"))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(cadena.as_bytes());
        hasher.update(self.config.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    async fn upload(&self, file: reqwest::multipart::Part) -> Result<ImagenSubida> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("folder", self.config.folder.as_str()),
            ("timestamp", timestamp.as_str()),
        ]);

        let form = reqwest::multipart::Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.config.folder.clone())
            .text("signature", signature)
            .part("file", file);

        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .context("no se pudo contactar a Cloudinary")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(512).collect();
            bail!("Cloudinary devolvió {status} al subir la imagen: {preview}");
        }

        let subida: UploadResponse = response
            .json()
            .await
            .context("respuesta de subida de Cloudinary inválida")?;

        Ok(ImagenSubida {
            url: subida.secure_url,
            public_id: subida.public_id,
        })
    }
}

#[async_trait]
impl MediaClient for CloudinaryClient {
    async fn upload_bytes(&self, bytes: Vec<u8>) -> Result<ImagenSubida> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name("imagen");
        self.upload(part).await
    }

    async fn upload_url(&self, source_url: &str) -> Result<ImagenSubida> {
        // Cloudinary acepta una URL remota como valor del campo `file`
        let part = reqwest::multipart::Part::text(source_url.to_string());
        self.upload(part).await
    }

    async fn destroy(&self, public_id: &str) -> Result<()> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
        ]);

        let response = self
            .http
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.config.api_key.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .context("no se pudo contactar a Cloudinary")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(512).collect();
            bail!("Cloudinary devolvió {status} al borrar {public_id}: {preview}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cliente(api_secret: &str) -> CloudinaryClient {
        CloudinaryClient::new(CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "123".to_string(),
            api_secret: api_secret.to_string(),
            folder: "alra-planes".to_string(),
        })
    }

    #[test]
    fn la_firma_ordena_los_parametros_alfabeticamente() {
        let cliente = cliente("secreto");

        let directa = cliente.sign(&[("folder", "alra-planes"), ("timestamp", "1700000000")]);
        let invertida = cliente.sign(&[("timestamp", "1700000000"), ("folder", "alra-planes")]);

        assert_eq!(directa, invertida);
        // SHA-256 en hex
        assert_eq!(directa.len(), 64);
    }

    #[test]
    fn la_firma_depende_del_secreto() {
        let a = cliente("secreto-a").sign(&[("public_id", "alra/1"), ("timestamp", "1")]);
        let b = cliente("secreto-b").sign(&[("public_id", "alra/1"), ("timestamp", "1")]);

        assert_ne!(a, b);
    }
}
