use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image_url: String,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn new(data: NewProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            price: data.price,
            category: data.category,
            image_url: data.image_url,
            stock: data.stock,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// 合并更新字段，未提供的字段保持不变
    pub fn apply(&mut self, changes: ProductChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(image_url) = changes.image_url {
            self.image_url = image_url;
        }
        if let Some(stock) = changes.stock {
            self.stock = stock;
        }
    }

    pub fn check_invariants(&self) -> Result<(), AppError> {
        if !(self.price > 0.0) {
            return Err(AppError::Validation("price must be greater than 0".to_string()));
        }
        if self.stock < 0 {
            return Err(AppError::Validation("stock must not be negative".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 2, max = 100, message = "name must be 2 to 100 characters"))]
    pub name: String,
    pub description: String,
    #[validate(range(exclusive_min = 0.0, message = "price must be greater than 0"))]
    pub price: f64,
    #[validate(length(min = 2, max = 50, message = "category must be 2 to 50 characters"))]
    pub category: String,
    #[validate(
        url(message = "image_url must be a valid URL"),
        length(max = 255, message = "image_url must be at most 255 characters")
    )]
    pub image_url: String,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductChanges {
    #[validate(length(min = 2, max = 100, message = "name must be 2 to 100 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "price must be greater than 0"))]
    pub price: Option<f64>,
    #[validate(length(min = 2, max = 50, message = "category must be 2 to 50 characters"))]
    pub category: Option<String>,
    #[validate(
        url(message = "image_url must be a valid URL"),
        length(max = 255, message = "image_url must be at most 255 characters")
    )]
    pub image_url: Option<String>,
    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: Option<i32>,
}
