use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::extract::{AppJson, AppQuery, ProductId};
use crate::domain::models::filter::{ProductFilter, ProductQuery};
use crate::domain::models::product::{NewProduct, Product, ProductChanges};
use crate::error::AppError;
use crate::server::AppState;
use crate::utils::pagination::Paginated;

/// 公开的只读路由，挂在 `/api/products`
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products))
        .route("/categories", get(list_categories))
        .route("/{id}", get(get_product))
}

/// 需要管理员令牌的写路由，挂在 `/api/admin/products`
pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_product))
        .route("/{id}", put(update_product).delete(delete_product))
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image_url: String,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            category: product.category,
            image_url: product.image_url,
            stock: product.stock,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

async fn list_products(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<ProductQuery>,
) -> Result<Json<Paginated<ProductResponse>>, AppError> {
    let filter = ProductFilter::try_from(query)?;

    let page = state.products.list_products(filter).await?;

    Ok(Json(Paginated {
        items: page.items.into_iter().map(ProductResponse::from).collect(),
        total_items: page.total_items,
        total_pages: page.total_pages,
        page: page.page,
        limit: page.limit,
    }))
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CategoriesResponse>, AppError> {
    let categories = state.products.categories().await?;
    Ok(Json(CategoriesResponse { categories }))
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    ProductId(id): ProductId,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state.products.get_product(id).await?;
    Ok(Json(ProductResponse::from(product)))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<NewProduct>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    let product = state.products.create_product(payload).await?;
    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    ProductId(id): ProductId,
    AppJson(payload): AppJson<ProductChanges>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state.products.update_product(id, payload).await?;
    Ok(Json(ProductResponse::from(product)))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    ProductId(id): ProductId,
) -> Result<StatusCode, AppError> {
    state.products.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
