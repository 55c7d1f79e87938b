//! Query-string normalization for listing endpoints
//!
//! Query values arrive as strings and are coerced permissively:
//! anything missing or unparseable falls back to a default instead of
//! rejecting the request.

use serde::Deserialize;

use super::pagination::{Pagination, DEFAULT_PER_PAGE};

/// Raw listing query parameters, exactly as received
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub category_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Normalized listing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    /// `None` means "all categories"
    pub category_id: Option<i64>,
    pub pagination: Pagination,
}

impl ListQuery {
    pub fn normalize(&self) -> ListParams {
        let category_id = parse_int(self.category_id.as_deref()).filter(|id| *id != 0);

        let page = parse_int(self.page.as_deref())
            .filter(|p| *p > 0)
            .map(|p| p.min(u32::MAX as i64) as u32)
            .unwrap_or(1);

        let limit = parse_int(self.limit.as_deref())
            .filter(|l| *l > 0)
            .map(|l| l.min(u32::MAX as i64) as u32)
            .unwrap_or(DEFAULT_PER_PAGE);

        ListParams {
            category_id,
            pagination: Pagination::new(page, limit),
        }
    }
}

fn parse_int(raw: Option<&str>) -> Option<i64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<i64>().ok())
}
