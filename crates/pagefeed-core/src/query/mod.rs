//! Module: query
//! Responsibility: the immutable fetch request handed to every provider.
//! Does not own: filtering, sorting, or paging (providers do that).
//! Boundary: built by consumers, read by providers and backend callbacks.

pub mod policy;
pub mod sort;


use crate::{error::ProviderError, sort::Comparator};
use derive_more::Deref;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

// re-exports
pub use policy::QueryPolicyError;
pub use sort::{QuerySortOrder, SortDirection, SortOrderBuilder};

///
/// QueryContext
///
/// Opaque pass-through map attached to a query.
/// Providers forward it untouched; only backend callbacks may read it.
///

#[derive(Clone, Debug, Default, Deref, Deserialize, Eq, PartialEq, Serialize)]
pub struct QueryContext(BTreeMap<String, serde_json::Value>);

impl QueryContext {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

///
/// Query
///
/// One fetch request: window, sort directives, optional in-memory
/// comparator, optional filter, and opaque context.
///
/// A default query asks for everything (offset 0, unbounded limit, no sort,
/// no filter).
///

pub struct Query<T, F> {
    offset: u32,
    limit: Option<u32>,
    sort_orders: Vec<QuerySortOrder>,
    in_memory_sorting: Option<Comparator<T>>,
    filter: Option<F>,
    context: QueryContext,
}

impl<T, F> Query<T, F> {
    /// Query for all items, unfiltered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            offset: 0,
            limit: None,
            sort_orders: Vec::new(),
            in_memory_sorting: None,
            filter: None,
            context: QueryContext::new(),
        }
    }

    /// Query for all items matching `filter`.
    #[must_use]
    pub fn with_filter(filter: F) -> Self {
        Self {
            filter: Some(filter),
            ..Self::new()
        }
    }

    #[must_use]
    pub fn builder() -> QueryBuilder<T, F> {
        QueryBuilder::new()
    }

    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    /// Requested page size; `None` means unbounded.
    #[must_use]
    pub const fn limit(&self) -> Option<u32> {
        self.limit
    }

    #[must_use]
    pub fn sort_orders(&self) -> &[QuerySortOrder] {
        &self.sort_orders
    }

    /// Comparator applied before `sort_orders` by in-memory providers.
    #[must_use]
    pub const fn in_memory_sorting(&self) -> Option<&Comparator<T>> {
        self.in_memory_sorting.as_ref()
    }

    #[must_use]
    pub const fn filter(&self) -> Option<&F> {
        self.filter.as_ref()
    }

    #[must_use]
    pub const fn context(&self) -> &QueryContext {
        &self.context
    }

    /// Exclusive end of the requested window; `None` when unbounded.
    #[must_use]
    pub fn requested_end(&self) -> Option<usize> {
        policy::window_end(self.offset, self.limit)
    }

    /// Offset as an index into a materialized sequence.
    #[must_use]
    pub fn offset_index(&self) -> usize {
        usize::try_from(self.offset).unwrap_or(usize::MAX)
    }

    /// Limit as a take-count; unbounded maps to `usize::MAX`.
    #[must_use]
    pub fn limit_count(&self) -> usize {
        self.limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX))
    }

    /// The same request carrying a different filter (window, sorting and
    /// context are kept).
    #[must_use]
    pub fn map_filter<G>(&self, filter: Option<G>) -> Query<T, G> {
        Query {
            offset: self.offset,
            limit: self.limit,
            sort_orders: self.sort_orders.clone(),
            in_memory_sorting: self.in_memory_sorting.clone(),
            filter,
            context: self.context.clone(),
        }
    }
}

impl<T, F> Default for Query<T, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, F: Clone> Clone for Query<T, F> {
    fn clone(&self) -> Self {
        self.map_filter(self.filter.clone())
    }
}

impl<T, F: fmt::Debug> fmt::Debug for Query<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .field("sort_orders", &self.sort_orders)
            .field("in_memory_sorting", &self.in_memory_sorting.is_some())
            .field("filter", &self.filter)
            .field("context", &self.context)
            .finish()
    }
}

///
/// QueryBuilder
///
/// Fluent construction of a `Query`; `build` enforces the query policy.
///

pub struct QueryBuilder<T, F> {
    query: Query<T, F>,
}

impl<T, F> QueryBuilder<T, F> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            query: Query::new(),
        }
    }

    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.query.offset = offset;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.query.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn unbounded(mut self) -> Self {
        self.query.limit = None;
        self
    }

    /// Offset and limit in one call.
    #[must_use]
    pub const fn window(self, offset: u32, limit: u32) -> Self {
        self.offset(offset).limit(limit)
    }

    /// Append one sort directive (lower precedence than those already added).
    #[must_use]
    pub fn sort(mut self, order: QuerySortOrder) -> Self {
        self.query.sort_orders.push(order);
        self
    }

    #[must_use]
    pub fn sort_orders(mut self, orders: impl IntoIterator<Item = QuerySortOrder>) -> Self {
        self.query.sort_orders.extend(orders);
        self
    }

    #[must_use]
    pub fn in_memory_sorting(mut self, comparator: Comparator<T>) -> Self {
        self.query.in_memory_sorting = Some(comparator);
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: F) -> Self {
        self.query.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn maybe_filter(mut self, filter: Option<F>) -> Self {
        self.query.filter = filter;
        self
    }

    #[must_use]
    pub fn context(mut self, context: QueryContext) -> Self {
        self.query.context = context;
        self
    }

    pub fn build(self) -> Result<Query<T, F>, ProviderError> {
        policy::validate_limit(self.query.limit)
            .and_then(|()| policy::validate_sort_orders(&self.query.sort_orders))
            .map_err(|err| ProviderError::invalid_query(err.to_string()))?;

        Ok(self.query)
    }
}

impl<T, F> Default for QueryBuilder<T, F> {
    fn default() -> Self {
        Self::new()
    }
}
