use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use clap::Parser;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use authgate_server::{create_app, routes::paths, AuthgateServer, ServerConfig};

/// In-memory app with a cheap hash cost
struct TestApp {
    app: Router,
}

impl TestApp {
    fn new() -> Self {
        let config = ServerConfig::try_parse_from([
            "authgate-server",
            "--jwt-secret",
            "api-test-secret-0123456789abcdefghij",
            "--database-url",
            "memory://",
            "--password-hash-cost",
            "4",
        ])
        .unwrap();
        let server = AuthgateServer::new_in_memory(config).unwrap();
        Self {
            app: create_app(server),
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(paths::v1(path))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn me(&self, authorization: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(paths::v1(paths::auth::ME));
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn register_amr(&self) -> Value {
        let (status, body) = self
            .post(
                paths::auth::REGISTER,
                json!({"name": "Amr", "email": "amr@example.com", "password": "P@ss1234"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"].clone()
    }
}

fn token(data: &Value, name: &str) -> String {
    data[name].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_full_session_lifecycle() {
    let app = TestApp::new();
    let registered = app.register_amr().await;
    assert!(!token(&registered, "access_token").is_empty());

    let (status, body) = app
        .post(
            paths::auth::LOGIN,
            json!({"email": "amr@example.com", "password": "P@ss1234"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let logged_in = body["data"].clone();

    let (status, body) = app
        .me(Some(&format!("Bearer {}", token(&logged_in, "access_token"))))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "amr@example.com");
    assert_eq!(body["data"]["name"], "Amr");
    assert!(body["data"].get("password_hash").is_none());

    let (status, body) = app
        .post(
            paths::auth::REFRESH,
            json!({"refresh_token": token(&logged_in, "refresh_token")}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let refreshed = body["data"].clone();
    assert_ne!(
        token(&refreshed, "refresh_token"),
        token(&logged_in, "refresh_token")
    );

    let (status, body) = app
        .post(
            paths::auth::REFRESH,
            json!({"refresh_token": token(&logged_in, "refresh_token")}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired refresh token");

    let (status, body) = app
        .post(
            paths::auth::LOGOUT,
            json!({"refresh_token": token(&refreshed, "refresh_token")}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Logged out successfully");

    let (status, _) = app
        .post(
            paths::auth::LOGOUT,
            json!({"refresh_token": token(&refreshed, "refresh_token")}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validation_reports_fields() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            paths::auth::REGISTER,
            json!({"name": "Al", "email": "not-an-email", "password": "short"}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");
    let fields: Vec<&str> = body["field_errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

#[tokio::test]
async fn test_missing_fields_are_validation_errors() {
    let app = TestApp::new();
    let (status, body) = app.post(paths::auth::LOGIN, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri(paths::v1(paths::auth::LOGIN))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_1006");
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let app = TestApp::new();
    app.register_amr().await;

    let (status, body) = app
        .post(
            paths::auth::REGISTER,
            json!({"name": "Amr Again", "email": "AMR@example.com", "password": "P@ss1234"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
async fn test_wrong_credentials_are_unauthorized() {
    let app = TestApp::new();
    app.register_amr().await;

    let (wrong_status, wrong_body) = app
        .post(
            paths::auth::LOGIN,
            json!({"email": "amr@example.com", "password": "Wr0ng!pass"}),
        )
        .await;
    let (unknown_status, unknown_body) = app
        .post(
            paths::auth::LOGIN,
            json!({"email": "nobody@example.com", "password": "P@ss1234"}),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body["message"], unknown_body["message"]);
    assert_eq!(wrong_body["code"], unknown_body["code"]);
}

#[tokio::test]
async fn test_me_requires_access_token() {
    let app = TestApp::new();
    let registered = app.register_amr().await;

    let (status, _) = app.me(None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.me(Some("Bearer not.a.token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .me(Some(&format!("Bearer {}", token(&registered, "refresh_token"))))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .me(Some(&token(&registered, "access_token")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let request = Request::builder()
        .uri(paths::health::HEALTH)
        .body(Body::empty())
        .unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["database"], "memory");
}
