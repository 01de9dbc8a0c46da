//! Offset pagination window shared by list queries.

use serde::Deserialize;

/// Default number of rows returned by a list query.
pub const DEFAULT_LIMIT: u32 = 10;

/// Upper bound on a single page.
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub struct Page {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub skip: u32,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl Page {
    pub fn new(limit: u32, skip: u32) -> Self {
        Self { limit, skip }
    }

    /// Limit clamped to `1..=MAX_LIMIT`.
    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, MAX_LIMIT) as usize
    }

    pub fn offset(&self) -> usize {
        self.skip as usize
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, 0)
    }
}
