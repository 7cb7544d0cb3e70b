use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::constants::PAGE_SIZE;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Page selector shared by the admin listings. The page size is fixed.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: 1 }
    }
}

impl PageQuery {
    /// Requested page, never below 1
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    pub fn offset(&self) -> i64 {
        self.page().saturating_sub(1).saturating_mul(PAGE_SIZE)
    }

    pub fn limit(&self) -> i64 {
        PAGE_SIZE
    }
}

/// Pagination state returned next to a page of rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationInfo {
    pub current_page: i64,
    pub last_page: i64,
    pub per_page: i64,
    pub total: i64,
    /// 1-based index of the first row on this page, absent when the page is empty
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl PaginationInfo {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let current_page = page.max(1);
        let per_page = per_page.max(1);
        let last_page = (total.saturating_add(per_page - 1) / per_page).max(1);
        let offset = current_page.saturating_sub(1).saturating_mul(per_page);

        let (from, to) = if offset < total {
            (Some(offset + 1), Some(offset.saturating_add(per_page).min(total)))
        } else {
            (None, None)
        };

        Self {
            current_page,
            last_page,
            per_page,
            total,
            from,
            to,
        }
    }
}

/// Shareable page URLs that keep the active filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageLinks {
    pub first: String,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub last: String,
}

impl PageLinks {
    /// Build links for `path`, carrying every non-empty `(name, value)` filter.
    pub fn build(path: &str, filters: &[(&str, Option<&str>)], info: &PaginationInfo) -> Self {
        let page_url = |page: i64| {
            let mut query: Vec<String> = filters
                .iter()
                .filter_map(|&(name, value)| {
                    value
                        .filter(|v| !v.is_empty())
                        .map(|v| format!("{}={}", name, urlencoding::encode(v)))
                })
                .collect();
            query.push(format!("page={}", page));
            format!("{}?{}", path, query.join("&"))
        };

        Self {
            first: page_url(1),
            prev: (info.current_page > 1).then(|| page_url(info.current_page - 1)),
            next: (info.current_page < info.last_page).then(|| page_url(info.current_page + 1)),
            last: page_url(info.last_page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_clamps_to_first_page() {
        let query = PageQuery { page: 0 };
        assert_eq!(query.page(), 1);
        assert_eq!(query.offset(), 0);

        let query = PageQuery { page: 3 };
        assert_eq!(query.offset(), 20);
        assert_eq!(query.limit(), 10);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let query = PageQuery { page: i64::MAX };
        assert_eq!(query.offset(), i64::MAX);

        let info = PaginationInfo::new(i64::MAX, 10, 5);
        assert_eq!(info.current_page, i64::MAX);
        assert_eq!(info.last_page, 1);
        assert_eq!(info.from, None);
        assert_eq!(info.to, None);

        let info = PaginationInfo::new(1, 10, i64::MAX);
        assert_eq!(info.from, Some(1));
        assert_eq!(info.to, Some(10));
    }

    #[test]
    fn test_pagination_info_last_page_partial() {
        let info = PaginationInfo::new(3, 10, 23);
        assert_eq!(info.last_page, 3);
        assert_eq!(info.from, Some(21));
        assert_eq!(info.to, Some(23));
    }

    #[test]
    fn test_pagination_info_empty_result() {
        let info = PaginationInfo::new(1, 10, 0);
        assert_eq!(info.last_page, 1);
        assert_eq!(info.from, None);
        assert_eq!(info.to, None);
    }

    #[test]
    fn test_links_preserve_filters() {
        let info = PaginationInfo::new(2, 10, 35);
        let links = PageLinks::build(
            "/api/families",
            &[("search", Some("Budi Santoso")), ("status", Some("miskin"))],
            &info,
        );

        assert_eq!(
            links.first,
            "/api/families?search=Budi%20Santoso&status=miskin&page=1"
        );
        assert_eq!(
            links.prev.as_deref(),
            Some("/api/families?search=Budi%20Santoso&status=miskin&page=1")
        );
        assert_eq!(
            links.next.as_deref(),
            Some("/api/families?search=Budi%20Santoso&status=miskin&page=3")
        );
        assert_eq!(
            links.last,
            "/api/families?search=Budi%20Santoso&status=miskin&page=4"
        );
    }

    #[test]
    fn test_links_skip_empty_filters() {
        let info = PaginationInfo::new(1, 10, 5);
        let links = PageLinks::build("/api/families", &[("search", Some("")), ("status", None)], &info);

        assert_eq!(links.first, "/api/families?page=1");
        assert_eq!(links.prev, None);
        assert_eq!(links.next, None);
    }
}
