use serde::Serialize;

use crate::error::ApiError;

/// Validated page/limit pair from query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Parse raw `page`/`limit` strings. Missing values take the defaults,
    /// a limit above `max_limit` is clamped, anything else invalid is a 400.
    pub fn parse(
        page: Option<&str>,
        limit: Option<&str>,
        default_limit: u32,
        max_limit: u32,
    ) -> Result<Self, ApiError> {
        let page = match page.map(str::trim).filter(|s| !s.is_empty()) {
            None => 1,
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|p| *p >= 1)
                .ok_or_else(|| ApiError::field("page", "page must be a positive integer"))?,
        };
        let limit = match limit.map(str::trim).filter(|s| !s.is_empty()) {
            None => default_limit,
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|l| *l >= 1)
                .ok_or_else(|| ApiError::field("limit", "limit must be a positive integer"))?,
        };
        Ok(Self { page, limit: limit.min(max_limit) })
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let limit = request.limit.max(1) as i64;
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages: (total + limit - 1) / limit,
        }
    }
}
