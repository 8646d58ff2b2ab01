//! Limit/offset pagination carrier.

use serde::Deserialize;

pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Pagination window for list operations.
///
/// Mirrors the query-string contract: `limit` defaults to 100, `offset` to 0.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub struct Page {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Apply the window to an already-ordered vector.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.offset).take(self.limit).collect()
    }
}
