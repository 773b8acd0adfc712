//! Module: query::sort
//! Responsibility: backend-facing sort directive values.
//! Does not own: comparator resolution (see `crate::sort`).

use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// SortDirection
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum SortDirection {
    #[default]
    #[display("asc")]
    Ascending,
    #[display("desc")]
    Descending,
}

impl SortDirection {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    #[must_use]
    pub const fn is_descending(self) -> bool {
        matches!(self, Self::Descending)
    }
}

///
/// QuerySortOrder
///
/// One (property key, direction) precedence entry.
/// In a sequence, the first entry is the primary sort key.
///

#[derive(Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[display("{key} {direction}")]
pub struct QuerySortOrder {
    pub key: String,
    pub direction: SortDirection,
}

impl QuerySortOrder {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }

    pub fn asc(key: impl Into<String>) -> Self {
        Self::new(key, SortDirection::Ascending)
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self::new(key, SortDirection::Descending)
    }

    /// Same key, flipped direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(self.key.clone(), self.direction.opposite())
    }
}

///
/// SortOrderBuilder
///
/// Fluent builder for an ordered sort-directive sequence.
///

#[derive(Clone, Debug, Default)]
pub struct SortOrderBuilder {
    orders: Vec<QuerySortOrder>,
}

impl SortOrderBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self { orders: Vec::new() }
    }

    #[must_use]
    pub fn then_asc(mut self, key: impl Into<String>) -> Self {
        self.orders.push(QuerySortOrder::asc(key));
        self
    }

    #[must_use]
    pub fn then_desc(mut self, key: impl Into<String>) -> Self {
        self.orders.push(QuerySortOrder::desc(key));
        self
    }

    #[must_use]
    pub fn then(mut self, key: impl Into<String>, direction: SortDirection) -> Self {
        self.orders.push(QuerySortOrder::new(key, direction));
        self
    }

    #[must_use]
    pub fn build(self) -> Vec<QuerySortOrder> {
        self.orders
    }
}
