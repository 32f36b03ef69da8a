use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::models::filter::ProductFilter;
use crate::domain::models::product::Product;
use crate::domain::repositories::product_repository::ProductRepository;
use crate::error::AppError;

/// 进程内实现，用于测试和本地调试
///
/// 过滤、软删除和分页语义与 PostgreSQL 实现一致；文本排序忽略大小写，
/// 不跟随数据库的排序规则
#[derive(Default)]
pub struct InMemoryProductRepository {
    rows: RwLock<HashMap<Uuid, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self, filter: &ProductFilter) -> Result<(Vec<Product>, u64), AppError> {
        let rows = self.rows.read().await;

        let mut matched: Vec<&Product> = rows
            .values()
            .filter(|p| p.deleted_at.is_none() && filter.matches(p))
            .collect();
        let total = matched.len() as u64;

        matched.sort_by(|a, b| filter.sort.compare(a, b).then_with(|| a.id.cmp(&b.id)));

        let pagination = filter.pagination;
        let items = matched
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit as usize)
            .cloned()
            .collect();

        Ok((items, total))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let rows = self.rows.read().await;
        Ok(rows.get(&id).filter(|p| p.deleted_at.is_none()).cloned())
    }

    async fn insert(&self, product: &Product) -> Result<Product, AppError> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&product.id) {
            return Err(AppError::Internal(format!("duplicate product id {}", product.id)));
        }
        rows.insert(product.id, product.clone());
        Ok(product.clone())
    }

    async fn update(&self, product: &Product) -> Result<Option<Product>, AppError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&product.id) {
            Some(stored) if stored.deleted_at.is_none() => {
                *stored = Product {
                    created_at: stored.created_at,
                    updated_at: Utc::now(),
                    deleted_at: None,
                    ..product.clone()
                };
                Ok(Some(stored.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn soft_delete(&self, id: Uuid) -> Result<u64, AppError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(stored) if stored.deleted_at.is_none() => {
                stored.deleted_at = Some(Utc::now());
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn categories(&self) -> Result<Vec<String>, AppError> {
        let rows = self.rows.read().await;
        let categories: BTreeSet<String> = rows
            .values()
            .filter(|p| p.deleted_at.is_none())
            .map(|p| p.category.clone())
            .collect();
        Ok(categories.into_iter().collect())
    }
}
