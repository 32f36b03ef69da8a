use async_trait::async_trait;
use sea_query::{Expr, Func, Iden, Order, PostgresQueryBuilder, Query, SelectStatement};
use sea_query_binder::SqlxBinder;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::models::filter::{ProductFilter, SortDirection, SortField};
use crate::domain::models::product::Product;
use crate::domain::repositories::product_repository::ProductRepository;
use crate::error::AppError;

#[derive(Iden, Clone, Copy)]
enum Products {
    Table,
    Id,
    Name,
    Description,
    Price,
    Category,
    ImageUrl,
    Stock,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

const COLUMNS: [Products; 10] = [
    Products::Id,
    Products::Name,
    Products::Description,
    Products::Price,
    Products::Category,
    Products::ImageUrl,
    Products::Stock,
    Products::CreatedAt,
    Products::UpdatedAt,
    Products::DeletedAt,
];

const RETURNING: &str =
    "id, name, description, price, category, image_url, stock, created_at, updated_at, deleted_at";

impl From<SortField> for Products {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Name => Products::Name,
            SortField::Price => Products::Price,
            SortField::Category => Products::Category,
            SortField::Stock => Products::Stock,
            SortField::CreatedAt => Products::CreatedAt,
            SortField::UpdatedAt => Products::UpdatedAt,
        }
    }
}

impl From<SortDirection> for Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

/// LIKE 模式中的通配符按字面量匹配
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// 列表查询共用的 WHERE 条件
fn filtered(filter: &ProductFilter) -> SelectStatement {
    Query::select()
        .from(Products::Table)
        .and_where(Expr::col(Products::DeletedAt).is_null())
        .apply_if(filter.category.clone(), |q, v| {
            q.and_where(Expr::col(Products::Category).eq(v));
        })
        .apply_if(filter.min_price, |q, v| {
            q.and_where(Expr::col(Products::Price).gte(v));
        })
        .apply_if(filter.max_price, |q, v| {
            q.and_where(Expr::col(Products::Price).lte(v));
        })
        .apply_if(filter.search.as_deref().map(like_pattern), |q, pattern| {
            q.and_where(
                Expr::expr(Func::lower(Expr::col(Products::Name)))
                    .like(pattern.clone())
                    .or(Expr::expr(Func::lower(Expr::col(Products::Description))).like(pattern)),
            );
        })
        .to_owned()
}

pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list(&self, filter: &ProductFilter) -> Result<(Vec<Product>, u64), AppError> {
        let (sql, values) = filtered(filter)
            .expr(Expr::col(Products::Id).count())
            .build_sqlx(PostgresQueryBuilder);
        tracing::debug!(%sql, "count products");

        let total: i64 = sqlx::query_scalar_with(&sql, values)
            .fetch_one(&self.pool)
            .await?;

        let pagination = filter.pagination;
        let (sql, values) = filtered(filter)
            .columns(COLUMNS)
            .order_by(Products::from(filter.sort.field), filter.sort.direction.into())
            .order_by(Products::Id, Order::Asc)
            .limit(pagination.limit as u64)
            .offset(pagination.offset())
            .build_sqlx(PostgresQueryBuilder);
        tracing::debug!(%sql, "select products");

        let items = sqlx::query_as_with::<_, Product, _>(&sql, values)
            .fetch_all(&self.pool)
            .await?;

        Ok((items, total.max(0) as u64))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {RETURNING} FROM products WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn insert(&self, product: &Product) -> Result<Product, AppError> {
        let stored = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (id, name, description, price, category, image_url, stock, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {RETURNING}
            "#
        ))
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn update(&self, product: &Product) -> Result<Option<Product>, AppError> {
        let stored = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET name = $2, description = $3, price = $4, category = $5,
                image_url = $6, stock = $7, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {RETURNING}
            "#
        ))
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(product.stock)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE products SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn categories(&self) -> Result<Vec<String>, AppError> {
        let categories = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT category FROM products WHERE deleted_at IS NULL ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}
