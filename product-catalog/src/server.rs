use axum::{
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
};

use crate::api::{auth, products};
use crate::config::Config;
use crate::domain::repositories::product_repository::ProductRepository;
use crate::domain::services::auth_service::TokenService;
use crate::domain::services::product_service::ProductService;
use crate::error::AppError;
use crate::middleware::auth::require_admin;

#[derive(Clone)]
pub struct AppState {
    pub products: ProductService,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(config: &Config, repo: Arc<dyn ProductRepository>) -> Self {
        Self {
            products: ProductService::new(repo),
            tokens: TokenService::new(&config.auth),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let app_state = Arc::new(state);

    // 管理员路由，先过令牌与角色校验
    let admin_routes = Router::new()
        .nest("/products", products::admin_routes())
        .route_layer(middleware::from_fn_with_state(app_state.clone(), require_admin));

    // API 路由
    let api_routes = Router::new()
        .nest("/auth", auth::routes())
        .nest("/products", products::routes())
        .nest("/admin", admin_routes);

    // 组合所有路由
    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health))
        .fallback(handler_404)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn handler_404() -> AppError {
    AppError::NotFound("Resource not found".to_string())
}
