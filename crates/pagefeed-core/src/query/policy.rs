//! Query-shape policy rules applied when a `Query` is built.
//!
//! Providers trust a built query; this module is the single place the shape
//! rules live.

use crate::query::QuerySortOrder;
use std::collections::BTreeSet;
use thiserror::Error as ThisError;

///
/// QueryPolicyError
/// Canonical policy failures for query shape invariants.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryPolicyError {
    #[error("limit must be positive; omit it for an unbounded window")]
    ZeroLimit,

    #[error("sort order at position {position} has an empty key")]
    EmptySortKey { position: usize },

    #[error("sort key '{key}' appears more than once")]
    DuplicateSortKey { key: String },
}

/// Validate the requested window.
pub(crate) const fn validate_limit(limit: Option<u32>) -> Result<(), QueryPolicyError> {
    if matches!(limit, Some(0)) {
        return Err(QueryPolicyError::ZeroLimit);
    }

    Ok(())
}

/// Validate sort directives: keys are non-empty and appear at most once.
pub(crate) fn validate_sort_orders(orders: &[QuerySortOrder]) -> Result<(), QueryPolicyError> {
    let mut seen = BTreeSet::new();

    for (position, order) in orders.iter().enumerate() {
        if order.key.trim().is_empty() {
            return Err(QueryPolicyError::EmptySortKey { position });
        }
        if !seen.insert(order.key.as_str()) {
            return Err(QueryPolicyError::DuplicateSortKey {
                key: order.key.clone(),
            });
        }
    }

    Ok(())
}

/// Exclusive end of a window, saturating; `None` when unbounded.
#[must_use]
pub(crate) fn window_end(offset: u32, limit: Option<u32>) -> Option<usize> {
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);

    limit.map(|limit| offset.saturating_add(usize::try_from(limit).unwrap_or(usize::MAX)))
}
