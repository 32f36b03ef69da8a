#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use product_catalog::config::Config;
use product_catalog::domain::services::auth_service::TokenService;
use product_catalog::infrastructure::database::memory::InMemoryProductRepository;
use product_catalog::{create_app, AppState};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "s3cret-pass";
pub const TEST_JWT_SECRET: &str = "integration-test-secret";

pub fn test_config() -> Config {
    let vars: HashMap<String, String> = [
        ("JWT_SECRET", TEST_JWT_SECRET),
        ("ADMIN_USERNAME", ADMIN_USERNAME),
        ("ADMIN_PASSWORD", ADMIN_PASSWORD),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    Config::from_vars(vars).expect("test config")
}

pub struct TestApp {
    pub router: Router,
    pub tokens: TokenService,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::new(&test_config(), Arc::new(InMemoryProductRepository::new()));
        let tokens = state.tokens.clone();
        Self {
            router: create_app(state),
            tokens,
        }
    }

    pub async fn send(
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
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn admin_token(&self) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn create_product(&self, token: &str, product: Value) -> Value {
        let (status, body) = self
            .send(Method::POST, "/api/admin/products", Some(token), Some(product))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        body
    }
}

pub fn product_payload(name: &str, description: &str, price: f64, category: &str) -> Value {
    json!({
        "name": name,
        "description": description,
        "price": price,
        "category": category,
        "image_url": "https://img.example.com/product.png",
        "stock": 7
    })
}
