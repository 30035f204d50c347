// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,

        // --- Planes ---
        handlers::planes::list_public,
        handlers::planes::list_admin,
        handlers::planes::create_plan,
        handlers::planes::update_plan,
        handlers::planes::delete_plan,

        // --- Imagenes ---
        handlers::imagenes::upload_imagen,
        handlers::imagenes::upload_imagen_url,
        handlers::imagenes::delete_imagen,
        handlers::imagenes::reorder_imagenes,

        // --- Config ---
        handlers::site_config::get_config,
        handlers::site_config::update_config,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Planes ---
            models::planes::Plan,
            models::planes::PlanImagen,
            models::planes::ImagenPublica,
            models::planes::PlanPublico,
            models::planes::PlanAdmin,
            models::planes::PlanPayload,
            models::planes::ImagenOrden,
            models::planes::ReorderPayload,

            // --- Respuestas ---
            models::planes::MensajeRespuesta,
            models::planes::PlanCreadoRespuesta,
            models::planes::ImagenSubidaRespuesta,

            // --- Payloads ---
            handlers::imagenes::ImagenUrlPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Login del administrador"),
        (name = "Planes", description = "Catálogo de planes de financiación"),
        (name = "Imagenes", description = "Imágenes de cada plan"),
        (name = "Config", description = "Textos y datos de contacto de la landing")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
