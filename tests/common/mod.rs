// tests/common/mod.rs
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use planes_backend::{
    config::AppState,
    db::{SqliteStorage, Storage},
    media::{ImagenSubida, MediaClient},
    router::build_router,
    services::{auth::AuthService, planes::PlanService, site_config::ConfigService},
};

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "clave-super-secreta";
pub const JWT_SECRET: &str = "jwt-secreto-de-tests";

// Doble del proveedor de media: registra las llamadas y devuelve URLs
// predecibles, sin tocar la red.
#[derive(Default)]
pub struct FakeMedia {
    pub subidas: Mutex<u32>,
    pub destruidas: Mutex<Vec<String>>,
    pub fallar_subida: bool,
}

impl FakeMedia {
    fn subir(&self) -> Result<ImagenSubida> {
        if self.fallar_subida {
            return Err(anyhow!("Cloudinary caído"));
        }

        let mut contador = self.subidas.lock().unwrap();
        *contador += 1;
        Ok(ImagenSubida {
            url: format!("https://res.cloudinary.com/test/alra-planes/{contador}.jpg"),
            public_id: format!("alra-planes/test-{contador}"),
        })
    }
}

#[async_trait]
impl MediaClient for FakeMedia {
    async fn upload_bytes(&self, _bytes: Vec<u8>) -> Result<ImagenSubida> {
        self.subir()
    }

    async fn upload_url(&self, _source_url: &str) -> Result<ImagenSubida> {
        self.subir()
    }

    async fn destroy(&self, public_id: &str) -> Result<()> {
        self.destruidas.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}

pub async fn app() -> (Router, Arc<FakeMedia>) {
    app_con_media(FakeMedia::default()).await
}

pub async fn app_con_media(media: FakeMedia) -> (Router, Arc<FakeMedia>) {
    // Un pool de una sola conexión: cada conexión nueva a ":memory:"
    // sería una base distinta.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("no se pudo abrir la base en memoria");

    let storage = SqliteStorage::new(pool);
    storage.init_schema().await.expect("falló init_schema");
    let store: Arc<dyn Storage> = Arc::new(storage);

    let media = Arc::new(media);
    let media_dyn: Arc<dyn MediaClient> = media.clone();

    let state = AppState {
        store: Arc::clone(&store),
        auth_service: AuthService::new(
            ADMIN_USER.to_string(),
            ADMIN_PASS.to_string(),
            JWT_SECRET.to_string(),
        ),
        plan_service: PlanService::new(Arc::clone(&store), media_dyn),
        config_service: ConfigService::new(store),
        port: 0,
    };

    (build_router(state), media)
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// Hace el login con la credencial fija de los tests y devuelve el token
pub async fn login(app: &Router) -> String {
    let request = json_request(
        "POST",
        "/api/login",
        None,
        serde_json::json!({ "username": ADMIN_USER, "password": ADMIN_PASS }),
    );

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    body["token"].as_str().expect("login sin token").to_string()
}

// Deja correr las tareas sueltas (borrados remotos) en el runtime
// de un solo hilo de los tests.
pub async fn drain_tasks() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
