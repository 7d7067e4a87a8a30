pub mod conversation;
pub mod job;
pub mod matching;
pub mod resume;

use std::str::FromStr;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// One-based page request. Out-of-range values are clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.filter(|p| *p >= 1).unwrap_or(1),
            limit: limit
                .filter(|l| *l >= 1)
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .min(MAX_PAGE_SIZE),
        }
    }

    /// Saturates for absurd page numbers; such a page is simply empty.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Parses an optional query value, treating anything unparseable as absent.
pub fn lenient<T: FromStr>(value: Option<&str>) -> Option<T> {
    value?.trim().parse().ok()
}

/// `?page=&limit=` as raw strings. Junk values fall back to the defaults
/// instead of failing the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageParams {
    pub fn to_page(&self) -> Page {
        Page::new(lenient(self.page.as_deref()), lenient(self.limit.as_deref()))
    }
}

/// Pagination metadata. The total is serialized under a per-listing key
/// (`totalMatches`, `totalResumes`, `totalConversations`).
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total: i64,
    pub limit: i64,
    total_key: &'static str,
}

impl Pagination {
    pub fn new(page: Page, total: i64, total_key: &'static str) -> Self {
        Self {
            current_page: page.page,
            total_pages: (total + page.limit - 1) / page.limit,
            total,
            limit: page.limit,
            total_key,
        }
    }
}

impl Serialize for Pagination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("currentPage", &self.current_page)?;
        map.serialize_entry("totalPages", &self.total_pages)?;
        map.serialize_entry(self.total_key, &self.total)?;
        map.serialize_entry("limit", &self.limit)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_clamping() {
        assert_eq!(Page::new(None, None), Page { page: 1, limit: 10 });
        assert_eq!(Page::new(Some(0), Some(-5)), Page { page: 1, limit: 10 });
        assert_eq!(Page::new(Some(3), Some(500)).limit, MAX_PAGE_SIZE);
        assert_eq!(Page::new(Some(3), Some(20)).offset(), 40);
    }

    #[test]
    fn test_page_params_ignore_junk() {
        let params = PageParams {
            page: Some("abc".to_string()),
            limit: Some("".to_string()),
        };
        assert_eq!(params.to_page(), Page::default());

        let params = PageParams {
            page: Some(" 3 ".to_string()),
            limit: Some("2.5".to_string()),
        };
        assert_eq!(params.to_page(), Page { page: 3, limit: DEFAULT_PAGE_SIZE });
        assert_eq!(lenient::<f64>(Some("75")), Some(75.0));
        assert_eq!(lenient::<f64>(None), None);
    }

    #[test]
    fn test_page_offset_never_overflows() {
        assert_eq!(Page::new(Some(i64::MAX), Some(10)).offset(), i64::MAX);
        assert_eq!(Page::new(Some(i64::MAX), Some(1)).offset(), i64::MAX - 1);
    }

    #[test]
    fn test_pagination_total_pages_rounds_up() {
        let page = Page::new(Some(1), Some(10));
        assert_eq!(Pagination::new(page, 0, "total").total_pages, 0);
        assert_eq!(Pagination::new(page, 10, "total").total_pages, 1);
        assert_eq!(Pagination::new(page, 11, "total").total_pages, 2);
    }

    #[test]
    fn test_pagination_serializes_named_total() {
        let value =
            serde_json::to_value(Pagination::new(Page::new(Some(2), Some(5)), 12, "totalMatches"))
                .unwrap();
        assert_eq!(value["currentPage"], 2);
        assert_eq!(value["totalPages"], 3);
        assert_eq!(value["totalMatches"], 12);
        assert_eq!(value["limit"], 5);
    }
}
