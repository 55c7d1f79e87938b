//! Pagination types and page-link arithmetic

use serde::{Deserialize, Serialize};

/// Maximum items per page
pub const MAX_PER_PAGE: u32 = 100;

/// Default items per page for restaurant listings
pub const DEFAULT_PER_PAGE: u32 = 9;

/// Zero-based record offset for a 1-based page.
///
/// Pages below 1 are treated as page 1, so the offset is never negative.
pub fn compute_offset(limit: u32, page: i64) -> u64 {
    let page = page.max(1) as u64;
    (page - 1) * limit as u64
}

/// Build the descriptor used to render page links.
pub fn compute_pagination(limit: u32, page: u32, total_count: i64) -> PaginationDescriptor {
    let limit = limit.max(1) as u64;
    let total = total_count.max(0) as u64;
    let total_page = total.div_ceil(limit) as u32;
    let current_page = page.max(1);

    PaginationDescriptor {
        pages: (1..=total_page).collect(),
        total_page,
        current_page,
        prev: current_page.saturating_sub(1).max(1),
        next: current_page.saturating_add(1).min(total_page.max(1)),
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: u32,
    /// Items per page (max 100)
    pub per_page: u32,
}

impl Pagination {
    /// Create pagination with validation.
    ///
    /// - Page is clamped to minimum of 1
    /// - Per page is clamped to 1..=100
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Calculate SQL OFFSET value.
    pub fn offset(&self) -> u64 {
        compute_offset(self.per_page, self.page as i64)
    }

    /// Get LIMIT value.
    pub fn limit(&self) -> u32 {
        self.per_page
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Page-link data handed to the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationDescriptor {
    /// Every page number, `1..=total_page`
    pub pages: Vec<u32>,
    pub total_page: u32,
    pub current_page: u32,
    pub prev: u32,
    pub next: u32,
}

/// Paginated result wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items for current page
    pub items: Vec<T>,
    /// Total count across all pages
    pub total: i64,
    /// Current page number
    pub page: u32,
    /// Items per page
    pub per_page: u32,
}

impl<T> Paginated<T> {
    pub fn pagination(&self) -> PaginationDescriptor {
        compute_pagination(self.per_page, self.page, self.total)
    }
}
