//! Paged list envelope

use serde::{Deserialize, Serialize};

/// One page of a filtered list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Number of rows matching the filter, across all pages
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub items: Vec<T>,
}
