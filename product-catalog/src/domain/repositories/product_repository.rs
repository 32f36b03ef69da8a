use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::filter::ProductFilter;
use crate::domain::models::product::Product;
use crate::error::AppError;

/// 商品表的唯一访问入口；所有读操作都排除已软删除的记录
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 返回当前页的数据以及分页前的匹配总数
    async fn list(&self, filter: &ProductFilter) -> Result<(Vec<Product>, u64), AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError>;

    async fn insert(&self, product: &Product) -> Result<Product, AppError>;

    /// 整行写回；记录不存在或已删除时返回 `None`
    async fn update(&self, product: &Product) -> Result<Option<Product>, AppError>;

    /// 返回受影响的行数，目标不存在时为 0
    async fn soft_delete(&self, id: Uuid) -> Result<u64, AppError>;

    async fn categories(&self) -> Result<Vec<String>, AppError>;
}
