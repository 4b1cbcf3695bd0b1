//! Common types used across the directory

use serde::{Deserialize, Serialize};

/// Pagination parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_PER_PAGE: u32 = 10;
    pub const MAX_PER_PAGE: u32 = 100;

    /// Build pagination from raw query-string values.
    ///
    /// Missing, non-numeric, zero or negative values fall back to the
    /// defaults; `per_page` is capped at [`Pagination::MAX_PER_PAGE`].
    pub fn from_raw(page: Option<&str>, per_page: Option<&str>) -> Self {
        let page = parse_positive(page).unwrap_or(Self::DEFAULT_PAGE);
        let per_page = parse_positive(per_page)
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .min(Self::MAX_PER_PAGE);
        Self { page, per_page }
    }

    /// Row offset of the first item on this page
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|v| v.trim().parse::<u32>().ok()).filter(|v| *v > 0)
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, pagination: Pagination, total_items: u64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(pagination, total_items),
        }
    }

    /// Transform every item while keeping the pagination metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl PaginationMeta {
    pub fn new(pagination: Pagination, total_items: u64) -> Self {
        let per_page = u64::from(pagination.per_page.max(1));
        let total_pages = total_items.div_ceil(per_page);
        Self {
            page: pagination.page,
            per_page: pagination.per_page,
            total_items,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_missing_or_invalid() {
        assert_eq!(Pagination::from_raw(None, None), Pagination::default());
        assert_eq!(Pagination::from_raw(Some("abc"), Some("")), Pagination::default());
        assert_eq!(Pagination::from_raw(Some("0"), Some("-5")), Pagination::default());
    }

    #[test]
    fn per_page_is_capped() {
        let p = Pagination::from_raw(Some("3"), Some("5000"));
        assert_eq!(p.page, 3);
        assert_eq!(p.per_page, Pagination::MAX_PER_PAGE);
    }

    #[test]
    fn offset_follows_page() {
        let p = Pagination::from_raw(Some("4"), Some("25"));
        assert_eq!(p.offset(), 75);
        assert_eq!(p.limit(), 25);
        assert_eq!(Pagination::default().offset(), 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        let meta = PaginationMeta::new(Pagination::default(), 21);
        assert_eq!(meta.total_pages, 3);
        let empty = PaginationMeta::new(Pagination::default(), 0);
        assert_eq!(empty.total_pages, 0);
    }
}
