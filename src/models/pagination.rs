use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i32,
    #[serde(default = "default_limit")]
    pub limit: i32,
}

impl PageQuery {
    pub fn new(page: i32, limit: i32) -> Self {
        Self { page, limit }
    }

    pub fn validate(&mut self) {
        if self.page < 1 {
            self.page = 1;
        }
        if self.limit < 1 || self.limit > 100 {
            self.limit = default_limit();
        }
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page + 1,
            limit: self.limit,
        }
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

/// Pagination block of a materials listing reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current: i32,
    pub total: i32,
    pub count: i64,
    pub limit: i32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn empty(limit: i32) -> Self {
        Self {
            current: 1,
            total: 0,
            count: 0,
            limit,
            has_next: false,
            has_prev: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_materials: i64,
    pub avg_rating: f64,
    pub avg_downloads: f64,
    #[serde(default)]
    pub max_rating: f64,
    #[serde(default)]
    pub max_downloads: f64,
}

impl CatalogStats {
    pub fn zeroed() -> Self {
        Self {
            total_materials: 0,
            avg_rating: 0.0,
            avg_downloads: 0.0,
            max_rating: 0.0,
            max_downloads: 0.0,
        }
    }
}

fn default_page() -> i32 {
    1
}

fn default_limit() -> i32 {
    12
}
