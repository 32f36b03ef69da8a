use serde::Serialize;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// 归一化后的分页参数，`page >= 1` 且 `1 <= limit <= 100`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            Some(page) if page >= 1 => u32::try_from(page).unwrap_or(u32::MAX),
            _ => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(limit) if (1..=MAX_LIMIT as i64).contains(&limit) => limit as u32,
            _ => DEFAULT_LIMIT,
        };
        Self { page, limit }
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    pub fn total_pages(&self, total_items: u64) -> u64 {
        total_items.div_ceil(self.limit as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub total_pages: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total_items: u64, pagination: Pagination) -> Self {
        Self {
            items,
            total_items,
            total_pages: pagination.total_pages(total_items),
            page: pagination.page,
            limit: pagination.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        assert_eq!(Pagination::new(None, None), Pagination { page: 1, limit: 10 });
    }

    #[test]
    fn test_page_below_one_coerced() {
        assert_eq!(Pagination::new(Some(0), Some(20)).page, 1);
        assert_eq!(Pagination::new(Some(-4), Some(20)).page, 1);
    }

    #[test]
    fn test_limit_out_of_range_coerced_to_default() {
        assert_eq!(Pagination::new(Some(1), Some(0)).limit, 10);
        assert_eq!(Pagination::new(Some(1), Some(101)).limit, 10);
        assert_eq!(Pagination::new(Some(1), Some(-5)).limit, 10);
        assert_eq!(Pagination::new(Some(1), Some(100)).limit, 100);
        assert_eq!(Pagination::new(Some(1), Some(1)).limit, 1);
    }

    #[test]
    fn test_offset_uses_coerced_limit() {
        let pagination = Pagination::new(Some(3), Some(500));
        assert_eq!(pagination.offset(), 20);
    }

    #[test]
    fn test_total_pages() {
        let pagination = Pagination::new(Some(1), Some(10));
        assert_eq!(pagination.total_pages(0), 0);
        assert_eq!(pagination.total_pages(1), 1);
        assert_eq!(pagination.total_pages(10), 1);
        assert_eq!(pagination.total_pages(11), 2);
    }
}
