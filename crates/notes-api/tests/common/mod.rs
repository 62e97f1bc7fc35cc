#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use notes_api::{AppState, build_router, config::Settings};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const USER: &str = "admin";
pub const PASSWORD: &str = "password";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap().to_string();
        let settings = Settings::from_lookup(|key| match key {
            "STORE_URL" => Some(root.clone()),
            "DB_NAME" => Some("test_db".to_string()),
            _ => None,
        })
        .unwrap();
        let state = AppState::connect(&settings).await.unwrap();
        let router = build_router(state.clone());
        Self { router, state, dir }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    pub async fn authed(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(request(method, uri, body, Some((USER, PASSWORD)))).await
    }

    pub async fn open(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(request(method, uri, body, None)).await
    }
}

pub fn request(
    method: Method,
    uri: &str,
    body: Option<Value>,
    credentials: Option<(&str, &str)>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((user, pass)) = credentials {
        let encoded = STANDARD.encode(format!("{user}:{pass}"));
        builder = builder.header(header::AUTHORIZATION, format!("Basic {encoded}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
