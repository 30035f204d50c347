// tests/auth_boundary.rs
//
// El borde de autenticación: ninguna ruta de administración debe
// ejecutarse ni mutar estado sin un bearer válido.

mod common;

use axum::http::StatusCode;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;
use tower::ServiceExt;

#[derive(serde::Serialize)]
struct ClaimsDePrueba {
    sub: String,
    exp: usize,
    iat: usize,
}

fn token_con(secret: &str, exp: usize) -> String {
    let claims = ClaimsDePrueba {
        sub: "admin".to_string(),
        exp,
        iat: 0,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .unwrap()
}

#[tokio::test]
async fn login_correcto_devuelve_token_y_usuario() {
    let (app, _media) = common::app().await;

    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            "/api/login",
            None,
            json!({ "username": common::ADMIN_USER, "password": common::ADMIN_PASS }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["user"], common::ADMIN_USER);
    assert!(body["token"].as_str().unwrap().len() > 20);
}

#[tokio::test]
async fn login_con_credenciales_incorrectas_es_401_generico() {
    let (app, _media) = common::app().await;

    for (usuario, clave) in [
        ("admin", "incorrecta"),
        ("otro", common::ADMIN_PASS),
        ("", ""),
    ] {
        let response = app
            .clone()
            .oneshot(common::json_request(
                "POST",
                "/api/login",
                None,
                json!({ "username": usuario, "password": clave }),
            ))
            .await
            .unwrap();

        let status = response.status();
        let body = common::body_json(response).await;
        // El vacío cae en validación (400); el resto en credenciales (401).
        // En ningún caso se distingue usuario de contraseña.
        assert!(
            status == StatusCode::UNAUTHORIZED || status == StatusCode::BAD_REQUEST,
            "status inesperado: {status}"
        );
        assert!(body.get("error").is_some());
    }
}

#[tokio::test]
async fn rutas_admin_sin_token_devuelven_401_sin_mutar_estado() {
    let (app, _media) = common::app().await;

    let intentos = [
        common::get_request("/api/admin/planes", None),
        common::json_request(
            "POST",
            "/api/admin/planes",
            None,
            json!({ "modelo": "Amarok", "version": "V1" }),
        ),
        common::json_request("PUT", "/api/admin/planes/1", None, json!({})),
        common::json_request(
            "PUT",
            "/api/admin/config",
            None,
            json!({ "site_title": "hackeado" }),
        ),
    ];

    for request in intentos {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Nada quedó escrito: el catálogo sigue vacío y la config intacta
    let publica = app
        .clone()
        .oneshot(common::get_request("/api/planes", None))
        .await
        .unwrap();
    assert_eq!(common::body_json(publica).await.as_array().unwrap().len(), 0);

    let config = app
        .clone()
        .oneshot(common::get_request("/api/config", None))
        .await
        .unwrap();
    assert_eq!(
        common::body_json(config).await["site_title"],
        "ALRA Planes"
    );
}

#[tokio::test]
async fn token_firmado_con_otro_secreto_es_rechazado() {
    let (app, _media) = common::app().await;

    let token = token_con("un-secreto-distinto", 9999999999);
    let response = app
        .clone()
        .oneshot(common::get_request("/api/admin/planes", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_expirado_es_rechazado() {
    let (app, _media) = common::app().await;

    let token = token_con(common::JWT_SECRET, 1);
    let response = app
        .clone()
        .oneshot(common::get_request("/api/admin/planes", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_valido_habilita_las_rutas_admin() {
    let (app, _media) = common::app().await;
    let token = common::login(&app).await;

    let response = app
        .clone()
        .oneshot(common::get_request("/api/admin/planes", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_responde_sin_auth() {
    let (app, _media) = common::app().await;

    let response = app
        .clone()
        .oneshot(common::get_request("/api/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}
