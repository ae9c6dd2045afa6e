#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use reactivities::config::Config;
use reactivities::database;
use reactivities::state::AppState;
use reactivities::web;

pub const PASSWORD: &str = "Pa$$w0rd";

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub uploads: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("json body")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(Config::default()).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    let pool = database::connect_in_memory().await.expect("in-memory pool");
    database::migrate(&pool).await.expect("migrations");
    let uploads = tempfile::tempdir().expect("tempdir");
    let config = Config {
        upload_dir: uploads.path().to_path_buf(),
        ..config
    };
    let router = web::router(AppState::new(pool.clone(), config));
    TestApp {
        router,
        pool,
        uploads,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.dispatch(request).await
    }

    pub async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes")
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Registers `username` and returns its bearer token.
    pub async fn register(&self, username: &str) -> String {
        let response = self
            .send(
                Method::POST,
                "/api/account/register",
                None,
                Some(json!({
                    "email": format!("{}@test.com", username),
                    "password": PASSWORD,
                    "displayName": username.to_uppercase(),
                    "username": username,
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());
        response.json()["token"]
            .as_str()
            .expect("token")
            .to_string()
    }

    pub async fn create_activity(&self, token: &str, title: &str, days_ahead: i64) -> Value {
        let date = chrono::Utc::now() + chrono::Duration::days(days_ahead);
        let response = self
            .send(
                Method::POST,
                "/api/activities",
                Some(token),
                Some(activity_body(title, date)),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
        response.json()
    }
}

pub fn activity_body(title: &str, date: chrono::DateTime<chrono::Utc>) -> Value {
    json!({
        "title": title,
        "description": "Easy 5k",
        "category": "travel",
        "date": date,
        "city": "Utrecht",
        "venue": "Park",
    })
}

/// A multipart body with a single `File` part.
pub fn multipart_photo(file_name: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let boundary = "reactivities-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"File\"; filename=\"{}\"\r\n",
            file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    (format!("multipart/form-data; boundary={}", boundary), body)
}
