// src/router.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

// Hasta 10 MiB por archivo de imagen
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(app_state: AppState) -> Router {
    // Rutas públicas (la landing consume estas)
    let public_routes = Router::new()
        .route("/api/login", post(handlers::auth::login))
        .route("/api/planes", get(handlers::planes::list_public))
        .route("/api/config", get(handlers::site_config::get_config))
        .route("/api/health", get(handlers::health));

    // Rutas de administración, protegidas con JWT.
    // El guard corre antes que cualquier handler: sin token válido no se
    // llega a tocar la base.
    let admin_routes = Router::new()
        .route(
            "/planes",
            get(handlers::planes::list_admin).post(handlers::planes::create_plan),
        )
        .route(
            "/planes/{id}",
            put(handlers::planes::update_plan).delete(handlers::planes::delete_plan),
        )
        .route(
            "/planes/{id}/imagenes",
            post(handlers::imagenes::upload_imagen),
        )
        .route(
            "/planes/{id}/imagenes-url",
            post(handlers::imagenes::upload_imagen_url),
        )
        .route(
            "/imagenes/reorder",
            put(handlers::imagenes::reorder_imagenes),
        )
        .route("/imagenes/{id}", delete(handlers::imagenes::delete_imagen))
        .route("/config", put(handlers::site_config::update_config))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    Router::new()
        .merge(public_routes)
        .nest("/api/admin", admin_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
