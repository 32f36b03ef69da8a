use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::domain::models::filter::ProductFilter;
use crate::domain::models::product::{NewProduct, Product, ProductChanges};
use crate::domain::repositories::product_repository::ProductRepository;
use crate::error::AppError;
use crate::utils::pagination::Paginated;

#[derive(Clone)]
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_products(&self, filter: ProductFilter) -> Result<Paginated<Product>, AppError> {
        let (items, total_items) = self.repo.list(&filter).await?;
        Ok(Paginated::new(items, total_items, filter.pagination))
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    pub async fn create_product(&self, data: NewProduct) -> Result<Product, AppError> {
        // 验证请求
        data.validate().map_err(|e| AppError::Validation(e.to_string()))?;

        let product = Product::new(data);
        let stored = self.repo.insert(&product).await?;

        tracing::info!(product_id = %stored.id, name = %stored.name, "product created");
        Ok(stored)
    }

    pub async fn update_product(&self, id: Uuid, changes: ProductChanges) -> Result<Product, AppError> {
        changes.validate().map_err(|e| AppError::Validation(e.to_string()))?;

        // 检查产品是否存在
        let mut product = self.get_product(id).await?;

        product.apply(changes);
        product.check_invariants()?;

        let stored = self
            .repo
            .update(&product)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        tracing::info!(product_id = %id, "product updated");
        Ok(stored)
    }

    /// 目标不存在也视为成功
    pub async fn delete_product(&self, id: Uuid) -> Result<(), AppError> {
        let affected = self.repo.soft_delete(id).await?;
        if affected == 0 {
            tracing::info!(product_id = %id, "delete matched no product");
        } else {
            tracing::info!(product_id = %id, "product deleted");
        }
        Ok(())
    }

    pub async fn categories(&self) -> Result<Vec<String>, AppError> {
        self.repo.categories().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::filter::ProductQuery;
    use crate::infrastructure::database::memory::InMemoryProductRepository;

    fn service() -> ProductService {
        ProductService::new(Arc::new(InMemoryProductRepository::new()))
    }

    fn new_product(name: &str, description: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: description.to_string(),
            price: 10.0,
            category: "kitchen".to_string(),
            image_url: "https://img.example.com/item.png".to_string(),
            stock: 3,
        }
    }

    fn filter(query: ProductQuery) -> ProductFilter {
        ProductFilter::try_from(query).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let service = service();
        let created = service.create_product(new_product("Red Mug", "ceramic")).await.unwrap();
        let fetched = service.get_product(created.id).await.unwrap();

        assert_eq!(fetched.name, "Red Mug");
        assert_eq!(fetched.description, "ceramic");
        assert_eq!(fetched.price, 10.0);
        assert_eq!(fetched.category, "kitchen");
        assert_eq!(fetched.image_url, "https://img.example.com/item.png");
        assert_eq!(fetched.stock, 3);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_payload() {
        let service = service();
        let mut data = new_product("Red Mug", "ceramic");
        data.price = -1.0;

        let result = service.create_product(data).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_price_only_leaves_other_fields() {
        let service = service();
        let created = service.create_product(new_product("Red Mug", "ceramic")).await.unwrap();

        let updated = service
            .update_product(created.id, ProductChanges { price: Some(15.5), ..Default::default() })
            .await
            .unwrap();

        assert_eq!(updated.price, 15.5);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.category, created.category);
        assert_eq!(updated.image_url, created.image_url);
        assert_eq!(updated.stock, created.stock);
    }

    #[tokio::test]
    async fn test_update_missing_product_not_found() {
        let result = service()
            .update_product(Uuid::new_v4(), ProductChanges::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_change() {
        let service = service();
        let created = service.create_product(new_product("Red Mug", "ceramic")).await.unwrap();

        let result = service
            .update_product(created.id, ProductChanges { stock: Some(-2), ..Default::default() })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(service.get_product(created.id).await.unwrap().stock, 3);
    }

    #[tokio::test]
    async fn test_delete_then_get_not_found() {
        let service = service();
        let created = service.create_product(new_product("Red Mug", "ceramic")).await.unwrap();

        service.delete_product(created.id).await.unwrap();
        let result = service.get_product(created.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_silent_success() {
        assert!(service().delete_product(Uuid::new_v4()).await.is_ok());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let service = service();
        service.create_product(new_product("Red Mug", "ceramic")).await.unwrap();
        service.create_product(new_product("Blue Cup", "glass")).await.unwrap();

        for term in ["mug", "MUG", "Mug"] {
            let page = service
                .list_products(filter(ProductQuery { search: Some(term.to_string()), ..Default::default() }))
                .await
                .unwrap();
            let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names, ["Red Mug"]);
        }
    }

    #[tokio::test]
    async fn test_pagination_totals() {
        let service = service();
        for i in 0..23 {
            service
                .create_product(new_product(&format!("Item {i:02}"), "bulk"))
                .await
                .unwrap();
        }

        let page = service
            .list_products(filter(ProductQuery { page: Some(3), limit: Some(10), ..Default::default() }))
            .await
            .unwrap();
        assert_eq!(page.total_items, 23);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 3);

        let beyond = service
            .list_products(filter(ProductQuery { page: Some(9), limit: Some(10), ..Default::default() }))
            .await
            .unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total_items, 23);
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let page = service().list_products(ProductFilter::default()).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 0);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 10);
    }

    #[tokio::test]
    async fn test_categories_distinct() {
        let service = service();
        service.create_product(new_product("Red Mug", "ceramic")).await.unwrap();
        service.create_product(new_product("Blue Cup", "glass")).await.unwrap();
        let mut lamp = new_product("Desk Lamp", "led");
        lamp.category = "office".to_string();
        service.create_product(lamp).await.unwrap();

        assert_eq!(service.categories().await.unwrap(), ["kitchen", "office"]);
    }
}
