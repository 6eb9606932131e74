//! Page-based pagination for list endpoints.
//!
//! Callers send `page` (1-indexed, default 1) and `page_size` (1-100,
//! default 20). Unlike a clamping paginator, out-of-range values are
//! rejected so clients learn about bad input instead of silently getting
//! a different page.
//!
//! # Example
//!
//! ```ignore
//! let page = PageParams::new(query.page, query.page_size)?;
//! let rows = sqlx::query_as::<_, Student>("... LIMIT $1 OFFSET $2")
//!     .bind(page.limit())
//!     .bind(page.offset())
//!     .fetch_all(db)
//!     .await?;
//! ```

use crate::errors::AppError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub page_size: i64,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageParams {
    /// Validates raw query values, filling in defaults for missing ones.
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Result<Self, AppError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page < 1 {
            return Err(AppError::unprocessable(anyhow::anyhow!(
                "page: must be greater than or equal to 1"
            )));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(AppError::unprocessable(anyhow::anyhow!(
                "page_size: must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        Ok(Self { page, page_size })
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_defaults() {
        let params = PageParams::new(None, None).unwrap();
        assert_eq!(params, PageParams::default());
        assert_eq!(params.limit(), 20);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_offset_from_page() {
        let params = PageParams::new(Some(3), Some(25)).unwrap();
        assert_eq!(params.limit(), 25);
        assert_eq!(params.offset(), 50);
    }

    #[test]
    fn test_page_size_bounds_are_inclusive() {
        assert!(PageParams::new(Some(1), Some(1)).is_ok());
        assert!(PageParams::new(Some(1), Some(100)).is_ok());
    }

    #[test]
    fn test_rejects_page_zero() {
        let err = PageParams::new(Some(0), None).unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_rejects_out_of_range_page_size() {
        for size in [0, -5, 101, 1000] {
            let err = PageParams::new(None, Some(size)).unwrap_err();
            assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
            assert!(err.error.to_string().starts_with("page_size"));
        }
    }
}
