use std::cmp::Ordering;
use std::str::FromStr;

use serde::Deserialize;

use crate::domain::models::product::Product;
use crate::error::AppError;
use crate::utils::pagination::Pagination;

/// `GET /api/products` 的查询参数，原样接收
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Price,
    Category,
    Stock,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::Category => "category",
            SortField::Stock => "stock",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }

    /// 文本字段先按忽略大小写比较，再按字节比较；与数据库排序规则不保证完全一致
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortField::Name => fold_cmp(&a.name, &b.name),
            SortField::Price => a.price.total_cmp(&b.price),
            SortField::Category => fold_cmp(&a.category, &b.category),
            SortField::Stock => a.stock.cmp(&b.stock),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

fn fold_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortField::Name),
            "price" => Ok(SortField::Price),
            "category" => Ok(SortField::Category),
            "stock" => Ok(SortField::Stock),
            "created_at" => Ok(SortField::CreatedAt),
            "updated_at" => Ok(SortField::UpdatedAt),
            other => Err(AppError::BadRequest(format!("Unsupported sort field: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let ordering = self.field.compare(a, b);
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

/// 校验并归一化后的列表查询条件
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
    pub sort: SortOrder,
    pub pagination: Pagination,
}

impl ProductFilter {
    /// 匹配条件之间为 AND；搜索词对 name 或 description 做不区分大小写的子串匹配
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if &product.category != category {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if product.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price > max {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            if !product.name.to_lowercase().contains(&term)
                && !product.description.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        true
    }
}

impl TryFrom<ProductQuery> for ProductFilter {
    type Error = AppError;

    fn try_from(query: ProductQuery) -> Result<Self, Self::Error> {
        let sort = match query.sort_by.as_deref().filter(|s| !s.is_empty()) {
            Some(field) => SortOrder {
                field: field.parse()?,
                direction: SortDirection::parse(query.sort_dir.as_deref()),
            },
            None => SortOrder::default(),
        };

        Ok(Self {
            category: query.category.filter(|c| !c.is_empty()),
            min_price: query.min_price,
            max_price: query.max_price,
            search: query.search.filter(|s| !s.is_empty()),
            sort,
            pagination: Pagination::new(query.page, query.limit),
        })
    }
}
