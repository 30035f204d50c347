// src/services/planes.rs

use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::Storage,
    media::MediaClient,
    models::planes::{ImagenOrden, PlanAdmin, PlanImagen, PlanPayload, PlanPublico},
};

// Orquesta el catálogo: CRUD de planes, imágenes y su orden.
// El storage y el proveedor de media entran por trait, así el mismo
// servicio corre contra SQLite, Postgres o los dobles de test.
#[derive(Clone)]
pub struct PlanService {
    storage: Arc<dyn Storage>,
    media: Arc<dyn MediaClient>,
}

impl PlanService {
    pub fn new(storage: Arc<dyn Storage>, media: Arc<dyn MediaClient>) -> Self {
        Self { storage, media }
    }

    // Listado para la landing: solo planes activos, sin public_id
    pub async fn list_public(&self) -> Result<Vec<PlanPublico>, AppError> {
        let planes = self.storage.list_planes(true).await?;
        let mut por_plan = self.imagenes_agrupadas().await?;

        Ok(planes
            .into_iter()
            .map(|plan| {
                let imagenes = por_plan
                    .remove(&plan.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(Into::into)
                    .collect();
                PlanPublico { plan, imagenes }
            })
            .collect())
    }

    // Listado para el panel: todos los planes, con el public_id de cada
    // imagen para poder gestionarlas.
    pub async fn list_admin(&self) -> Result<Vec<PlanAdmin>, AppError> {
        let planes = self.storage.list_planes(false).await?;
        let mut por_plan = self.imagenes_agrupadas().await?;

        Ok(planes
            .into_iter()
            .map(|plan| {
                let imagenes = por_plan.remove(&plan.id).unwrap_or_default();
                PlanAdmin { plan, imagenes }
            })
            .collect())
    }

    async fn imagenes_agrupadas(&self) -> Result<HashMap<i64, Vec<PlanImagen>>, AppError> {
        let mut por_plan: HashMap<i64, Vec<PlanImagen>> = HashMap::new();

        for imagen in self.storage.list_imagenes().await? {
            // Defensivo: una imagen sin URL no sirve en ningún listado
            if imagen.url.is_empty() {
                continue;
            }
            por_plan.entry(imagen.plan_id).or_default().push(imagen);
        }

        Ok(por_plan)
    }

    pub async fn create(&self, datos: &PlanPayload) -> Result<i64, AppError> {
        self.storage.insert_plan(datos).await
    }

    pub async fn update(&self, id: i64, datos: &PlanPayload) -> Result<(), AppError> {
        let afectadas = self.storage.update_plan(id, datos).await?;
        if afectadas == 0 {
            return Err(AppError::PlanNotFound);
        }
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        // Los pedidos de borrado remoto salen antes de tocar las filas
        // locales, pero nunca se esperan. Si el proceso cae acá, el
        // borrado remoto se pierde; la fila local manda.
        let imagenes = self.storage.imagenes_by_plan(id).await?;
        for imagen in imagenes {
            if !imagen.public_id.is_empty() {
                self.dispatch_destroy(imagen.public_id);
            }
        }

        let afectadas = self.storage.delete_plan(id).await?;
        if afectadas == 0 {
            return Err(AppError::PlanNotFound);
        }
        Ok(())
    }

    pub async fn add_imagen(&self, plan_id: i64, bytes: Vec<u8>) -> Result<PlanImagen, AppError> {
        if !self.storage.plan_exists(plan_id).await? {
            return Err(AppError::PlanNotFound);
        }

        // La subida se espera: sin URL no hay fila que insertar
        let subida = self.media.upload_bytes(bytes).await?;
        self.storage
            .insert_imagen(plan_id, &subida.url, &subida.public_id)
            .await
    }

    // Sube una imagen ya hosteada en otro lado (migración de fotos viejas)
    pub async fn add_imagen_from_url(
        &self,
        plan_id: i64,
        source_url: &str,
    ) -> Result<PlanImagen, AppError> {
        if !self.storage.plan_exists(plan_id).await? {
            return Err(AppError::PlanNotFound);
        }

        let subida = self.media.upload_url(source_url).await?;
        self.storage
            .insert_imagen(plan_id, &subida.url, &subida.public_id)
            .await
    }

    pub async fn delete_imagen(&self, id: i64) -> Result<(), AppError> {
        let imagen = self
            .storage
            .get_imagen(id)
            .await?
            .ok_or(AppError::ImagenNotFound)?;

        if !imagen.public_id.is_empty() {
            self.dispatch_destroy(imagen.public_id);
        }

        // La fila se borra pase lo que pase con el borrado remoto
        self.storage.delete_imagen(id).await?;
        Ok(())
    }

    pub async fn reorder(&self, items: &[ImagenOrden]) -> Result<(), AppError> {
        self.storage.reorder_imagenes(items).await
    }

    // Despacha el borrado remoto como tarea suelta: el request no lo
    // espera y un fallo solo queda en el log.
    fn dispatch_destroy(&self, public_id: String) {
        let media = Arc::clone(&self.media);
        tokio::spawn(async move {
            if let Err(err) = media.destroy(&public_id).await {
                tracing::warn!("falló el borrado remoto de {}: {:?}", public_id, err);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;
    use crate::{
        db::SqliteStorage,
        media::{ImagenSubida, MockMediaClient},
    };

    async fn storage_en_memoria() -> Arc<dyn Storage> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("no se pudo abrir la base en memoria");

        let storage = SqliteStorage::new(pool);
        storage.init_schema().await.expect("falló init_schema");
        Arc::new(storage)
    }

    fn payload(modelo: &str, version: &str) -> PlanPayload {
        PlanPayload {
            modelo: modelo.to_string(),
            version: version.to_string(),
            valor: String::new(),
            anticipo: String::new(),
            cuota: String::new(),
            tipo: "70/30".to_string(),
            adjudicacion: "cuota 2".to_string(),
            whatsapp_texto: String::new(),
            activo: true,
            orden: 0,
        }
    }

    // Deja correr las tareas despachadas con tokio::spawn en el runtime
    // de un solo hilo de los tests.
    async fn drain_tasks() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn add_imagen_sube_y_asigna_orden_incremental() {
        let storage = storage_en_memoria().await;
        let plan_id = storage.insert_plan(&payload("Amarok", "V1")).await.unwrap();

        let mut media = MockMediaClient::new();
        media.expect_upload_bytes().times(2).returning(|_| {
            Ok(ImagenSubida {
                url: "https://res.cloudinary.com/demo/alra.jpg".to_string(),
                public_id: "alra-planes/abc".to_string(),
            })
        });

        let service = PlanService::new(storage, Arc::new(media));

        let primera = service.add_imagen(plan_id, vec![1, 2, 3]).await.unwrap();
        assert_eq!(primera.plan_id, plan_id);
        assert_eq!(primera.url, "https://res.cloudinary.com/demo/alra.jpg");
        assert_eq!(primera.public_id, "alra-planes/abc");
        assert_eq!(primera.orden, 1);

        let segunda = service.add_imagen(plan_id, vec![4, 5]).await.unwrap();
        assert_eq!(segunda.orden, 2);
    }

    #[tokio::test]
    async fn add_imagen_a_plan_inexistente_no_llega_a_subir() {
        let storage = storage_en_memoria().await;

        let mut media = MockMediaClient::new();
        media.expect_upload_bytes().times(0);

        let service = PlanService::new(storage, Arc::new(media));

        assert!(matches!(
            service.add_imagen(999, vec![1]).await,
            Err(AppError::PlanNotFound)
        ));
    }

    #[tokio::test]
    async fn subida_fallida_no_inserta_fila() {
        let storage = storage_en_memoria().await;
        let plan_id = storage.insert_plan(&payload("Amarok", "V1")).await.unwrap();

        let mut media = MockMediaClient::new();
        media
            .expect_upload_bytes()
            .returning(|_| Err(anyhow::anyhow!("Cloudinary devolvió 500")));

        let service = PlanService::new(Arc::clone(&storage), Arc::new(media));

        assert!(matches!(
            service.add_imagen(plan_id, vec![1]).await,
            Err(AppError::InternalServerError(_))
        ));
        assert!(storage.list_imagenes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_despacha_el_borrado_remoto_solo_con_public_id() {
        let storage = storage_en_memoria().await;
        let plan_id = storage.insert_plan(&payload("Amarok", "V1")).await.unwrap();
        storage
            .insert_imagen(plan_id, "https://res.example/1.jpg", "alra/1")
            .await
            .unwrap();
        storage
            .insert_imagen(plan_id, "https://res.example/2.jpg", "alra/2")
            .await
            .unwrap();
        // Imagen cargada por fuera del adaptador: sin public_id
        storage
            .insert_imagen(plan_id, "https://res.example/3.jpg", "")
            .await
            .unwrap();

        let destruidas: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let registro = Arc::clone(&destruidas);

        let mut media = MockMediaClient::new();
        media.expect_destroy().returning(move |public_id| {
            registro.lock().unwrap().push(public_id.to_string());
            Ok(())
        });

        let service = PlanService::new(Arc::clone(&storage), Arc::new(media));

        service.delete(plan_id).await.unwrap();
        drain_tasks().await;

        let mut llamadas = destruidas.lock().unwrap().clone();
        llamadas.sort();
        assert_eq!(llamadas, vec!["alra/1".to_string(), "alra/2".to_string()]);

        assert!(storage.list_planes(false).await.unwrap().is_empty());
        assert!(storage.list_imagenes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fallo_del_borrado_remoto_no_bloquea_el_borrado_local() {
        let storage = storage_en_memoria().await;
        let plan_id = storage.insert_plan(&payload("Amarok", "V1")).await.unwrap();
        let imagen = storage
            .insert_imagen(plan_id, "https://res.example/1.jpg", "alra/1")
            .await
            .unwrap();

        let mut media = MockMediaClient::new();
        media
            .expect_destroy()
            .returning(|_| Err(anyhow::anyhow!("Cloudinary no responde")));

        let service = PlanService::new(Arc::clone(&storage), Arc::new(media));

        service.delete_imagen(imagen.id).await.unwrap();
        drain_tasks().await;

        assert!(storage.list_imagenes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_imagen_inexistente_es_not_found() {
        let storage = storage_en_memoria().await;

        let service = PlanService::new(storage, Arc::new(MockMediaClient::new()));

        assert!(matches!(
            service.delete_imagen(123).await,
            Err(AppError::ImagenNotFound)
        ));
    }

    #[tokio::test]
    async fn update_de_plan_inexistente_es_not_found() {
        let storage = storage_en_memoria().await;

        let service = PlanService::new(storage, Arc::new(MockMediaClient::new()));

        assert!(matches!(
            service.update(999, &payload("X", "Y")).await,
            Err(AppError::PlanNotFound)
        ));
    }

    #[tokio::test]
    async fn los_listados_filtran_imagenes_sin_url() {
        let storage = storage_en_memoria().await;
        let plan_id = storage.insert_plan(&payload("Amarok", "V1")).await.unwrap();
        storage
            .insert_imagen(plan_id, "https://res.example/1.jpg", "alra/1")
            .await
            .unwrap();
        storage.insert_imagen(plan_id, "", "alra/rota").await.unwrap();

        let service = PlanService::new(storage, Arc::new(MockMediaClient::new()));

        let publicos = service.list_public().await.unwrap();
        assert_eq!(publicos[0].imagenes.len(), 1);

        let admin = service.list_admin().await.unwrap();
        assert_eq!(admin[0].imagenes.len(), 1);
        assert_eq!(admin[0].imagenes[0].public_id, "alra/1");
    }
}
