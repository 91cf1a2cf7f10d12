//! Pagination for listings.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Sort direction of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }

    /// Orient an ascending comparison.
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

/// One page of a listing: how many rows to skip, how many to return, and in
/// which direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub skip: u64,
    pub limit: u64,
    pub order: SortOrder,
}

impl Page {
    /// Create an ascending page.
    pub fn new(skip: u64, limit: u64) -> Self {
        Self {
            skip,
            limit,
            order: SortOrder::Ascending,
        }
    }

    /// Everything, ascending.
    pub fn all() -> Self {
        Self::new(0, u64::MAX)
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn ascending(self) -> Self {
        self.with_order(SortOrder::Ascending)
    }

    pub fn descending(self) -> Self {
        self.with_order(SortOrder::Descending)
    }

    /// Sort `rows` by `key` in this page's direction and cut the window out.
    ///
    /// `key` must end with the row identifier so that equal keys still sort
    /// deterministically and the two directions mirror each other.
    pub fn window<T, K: Ord>(&self, mut rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
        rows.sort_by(|a, b| self.order.apply(key(a).cmp(&key(b))));
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        rows.into_iter().skip(skip).take(limit).collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, 24)
    }
}
