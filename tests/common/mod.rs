//! 集成测试公共工具：内存存储上的完整路由

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

use office_platform::infrastructure::config::Config;
use office_platform::store::memory::InMemoryStore;
use office_platform::{build_router, AppState};

pub const ADMIN: &str = "root_admin";
pub const PASSWORD: &str = "secret123";

pub struct TestApp {
    router: Router,
    _images: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let images = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.auth.bcrypt_cost = 4;
        config.auth.admin_usernames = vec![ADMIN.to_string()];
        config.qrcode.image_dir = images.path().to_path_buf();
        config.qrcode.image_size = 64;

        let state = AppState::new(&config, Arc::new(InMemoryStore::new()));
        state.rbac.ensure_defaults().await.unwrap();

        Self {
            router: build_router(state, Duration::from_secs(30)),
            _images: images,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn register(&self, username: &str) -> Value {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        body["data"].clone()
    }

    pub async fn login(&self, username: &str) -> Value {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({ "username": username, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"].clone()
    }

    /// 注册并登录，返回 (user_id, access_token)
    pub async fn sign_up(&self, username: &str) -> (String, String) {
        let user = self.register(username).await;
        let session = self.login(username).await;
        (
            user["id"].as_str().unwrap().to_string(),
            session["access_token"].as_str().unwrap().to_string(),
        )
    }

    pub async fn create_app(&self, token: &str, team_id: &str, name: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/v1/apps",
                token,
                json!({ "team_id": team_id, "name": name, "type": "form" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create app failed: {body}");
        body["data"].clone()
    }
}

pub fn error_message(body: &Value) -> &str {
    body["message"].as_str().unwrap_or_default()
}
