//! Shared value types: postal addresses, rescue/pet locations and
//! pagination.

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

// =============================================================================
// Address
// =============================================================================

/// A postal address (users, shops, order shipping).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

// =============================================================================
// Location
// =============================================================================

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Where a pet lives or a rescue takes place.
///
/// Rescue listings filter on `city`, `state` and `country` with a
/// case-insensitive substring match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

// =============================================================================
// Pagination
// =============================================================================

/// A validated page request.
///
/// ## Defaults
/// ```text
/// page  : 1   (values below 1 are clamped to 1)
/// limit : 10  (clamped to 1..=100)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Builds a page request from optional query parameters.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        PageRequest { page, limit }
    }

    #[inline]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[inline]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip.
    #[inline]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// Describes this page given the total number of matching rows.
    pub fn pagination(&self, total: u64) -> Pagination {
        let limit = self.limit as u64;
        Pagination {
            total,
            pages: total.div_ceil(limit),
            current_page: self.page,
            per_page: self.limit,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(None, None)
    }
}

/// Pagination block attached to every collection response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub pages: u64,
    pub current_page: u32,
    pub per_page: u32,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults_and_clamping() {
        let page = PageRequest::default();
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), 10);
        assert_eq!(page.offset(), 0);

        let page = PageRequest::new(Some(0), Some(5000));
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), 100);

        let page = PageRequest::new(Some(3), Some(20));
        assert_eq!(page.offset(), 40);
    }

    #[test]
    fn test_pagination_block() {
        let p = PageRequest::new(Some(2), Some(10)).pagination(25);
        assert_eq!(p.pages, 3);
        assert_eq!(p.current_page, 2);
        assert_eq!(p.per_page, 10);

        let empty = PageRequest::default().pagination(0);
        assert_eq!(empty.pages, 0);

        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json["currentPage"], 2);
        assert_eq!(json["perPage"], 10);
    }

    #[test]
    fn test_address_omits_empty_fields() {
        let address = Address {
            city: Some("Lisbon".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&address).unwrap();
        assert_eq!(json, serde_json::json!({ "city": "Lisbon" }));
    }
}
