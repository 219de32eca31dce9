//! Pagination utilities for service layer
//!
//! Normalizes requested page/limit values and slices a result set.

use serde::Serialize;

/// Bounds applied when normalizing a page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSettings {
    pub default_limit: u32,
    /// Optional ceiling on `limit`; `None` accepts any page size.
    pub max_limit: Option<u32>,
}

impl Default for PageSettings {
    fn default() -> Self { Self { default_limit: 10, max_limit: None } }
}

/// Page request as received; `None` or zero means "use the default".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Normalized pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub limit: u32,
}

impl PageRequest {
    pub fn normalize(self, settings: PageSettings) -> Pagination {
        let page = self.page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = self.limit.filter(|l| *l >= 1).unwrap_or(settings.default_limit).max(1);
        let limit = match settings.max_limit {
            Some(max) => limit.min(max.max(1)),
            None => limit,
        };
        Pagination { page, limit }
    }
}

impl Pagination {
    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.limit as usize)
    }
}

/// Pagination block returned alongside a page of records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub pages: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

/// Slice `items` for the requested page. Pages past the end are empty.
pub fn paginate<T>(items: Vec<T>, p: Pagination) -> Page<T> {
    let total = items.len();
    let limit = p.limit as usize;
    let pages = total.div_ceil(limit);
    let items = items.into_iter().skip(p.offset()).take(limit).collect();
    Page { items, meta: PageMeta { page: p.page, limit: p.limit, total, pages } }
}
