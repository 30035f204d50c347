// src/main.rs

use tokio::net::TcpListener;

use planes_backend::{config::AppState, router::build_router};

#[tokio::main]
async fn main() {
    // Inicializa el logger antes que nada: los errores de arranque
    // también queremos verlos.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() está bien acá: si la configuración falla, la aplicación
    // no debe arrancar.
    let app_state = AppState::new()
        .await
        .expect("Falló la inicialización del estado de la aplicación.");

    // Crea las tablas y siembra la config inicial en el arranque
    app_state
        .store
        .init_schema()
        .await
        .expect("Falló la creación del esquema de la base de datos.");

    tracing::info!("✅ Esquema de base de datos listo");

    let port = app_state.port;
    let app = build_router(app_state);

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falló el inicio del listener TCP");

    tracing::info!("🚗 API de planes escuchando en {}", listener.local_addr().unwrap());

    axum::serve(listener, app)
        .await
        .expect("Error en el servidor Axum");
}
