// src/config.rs

use std::{env, sync::Arc};

use anyhow::Context;

use crate::{
    db::{self, Storage},
    media::{CloudinaryClient, CloudinaryConfig, MediaClient},
    services::{auth::AuthService, planes::PlanService, site_config::ConfigService},
};

// El estado compartido que será accesible en toda la aplicación
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Storage>,
    pub auth_service: AuthService,
    pub plan_service: PlanService,
    pub config_service: ConfigService,
    pub port: u16,
}

impl AppState {
    // Carga la configuración y arma el grafo de dependencias.
    // Los secretos y credenciales son obligatorios: si falta alguno, el
    // arranque termina acá con un mensaje claro, sin defaults ocultos.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL debe estar definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET debe estar definido")?;
        let admin_user = env::var("ADMIN_USER").context("ADMIN_USER debe estar definido")?;
        let admin_pass = env::var("ADMIN_PASS").context("ADMIN_PASS debe estar definida")?;

        let cloudinary = CloudinaryConfig {
            cloud_name: env::var("CLOUDINARY_CLOUD_NAME")
                .context("CLOUDINARY_CLOUD_NAME debe estar definido")?,
            api_key: env::var("CLOUDINARY_API_KEY")
                .context("CLOUDINARY_API_KEY debe estar definida")?,
            api_secret: env::var("CLOUDINARY_API_SECRET")
                .context("CLOUDINARY_API_SECRET debe estar definido")?,
            folder: "alra-planes".to_string(),
        };

        // El puerto no es un secreto, así que sí tiene default
        let port = match env::var("PORT") {
            Ok(valor) => valor.parse().context("PORT debe ser un número de puerto")?,
            Err(_) => 3000,
        };

        let store = db::connect(&database_url).await?;
        tracing::info!("✅ Conexión con la base de datos establecida");

        let media: Arc<dyn MediaClient> = Arc::new(CloudinaryClient::new(cloudinary));

        // --- Arma el grafo de dependencias ---
        let auth_service = AuthService::new(admin_user, admin_pass, jwt_secret);
        let plan_service = PlanService::new(Arc::clone(&store), media);
        let config_service = ConfigService::new(Arc::clone(&store));

        Ok(Self {
            store,
            auth_service,
            plan_service,
            config_service,
            port,
        })
    }
}
