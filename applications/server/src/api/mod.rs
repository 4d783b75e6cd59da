/// API route modules
pub mod health;
pub mod playlist_items;
pub mod playlists;
pub mod tracks;

use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};

/// Query parameters for paged listings
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationParams {
    /// Resolve to a (page, limit) pair with sane bounds
    pub fn resolve(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(20).clamp(1, 100);
        (page, limit)
    }
}

/// Pagination metadata echoed back with listings
#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        Self {
            page,
            limit,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

/// Reject identifiers that are not UUIDs before they reach storage
pub fn validate_uuid(id: &str, label: &str) -> Result<()> {
    uuid::Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| ServerError::BadRequest(format!("Invalid {label} ID format")))
}
