//! Module: sort::column
//! Responsibility: per-column sort declarations and their projection into
//! query sort orders.
//! Does not own: rendering of sort indicators or click handling.


use crate::{
    error::{ErrorOrigin, ProviderError},
    provider::DataProvider,
    query::{QueryBuilder, QuerySortOrder, SortDirection},
    sort::Comparator,
};
use std::{fmt, sync::Arc};

///
/// SortOrderProvider
///
/// Generator mapping one requested direction to an ordered list of sort
/// directives. One visual column may expand to several backend keys, or
/// invert a direction.
///

#[derive(Clone)]
pub struct SortOrderProvider {
    generate: Arc<dyn Fn(SortDirection) -> Vec<QuerySortOrder> + Send + Sync>,
}

impl SortOrderProvider {
    pub fn new(
        generate: impl Fn(SortDirection) -> Vec<QuerySortOrder> + Send + Sync + 'static,
    ) -> Self {
        Self {
            generate: Arc::new(generate),
        }
    }

    /// Every key sorted in the requested direction, in the given order.
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();

        Self::new(move |direction| {
            keys.iter()
                .map(|key| QuerySortOrder::new(key.clone(), direction))
                .collect()
        })
    }

    #[must_use]
    pub fn generate(&self, direction: SortDirection) -> Vec<QuerySortOrder> {
        (self.generate)(direction)
    }
}

impl fmt::Debug for SortOrderProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SortOrderProvider(..)")
    }
}

///
/// ColumnSort
///
/// Sort declaration of one consumer-facing column: an optional directive
/// generator (backend keys) and an optional in-memory comparator.
/// A column with neither is not sortable and is left out of sorting UI.
///

pub struct ColumnSort<T> {
    id: String,
    orders: Option<SortOrderProvider>,
    comparator: Option<Comparator<T>>,
}

impl<T: 'static> ColumnSort<T> {
    /// Column that cannot be sorted.
    pub fn unsortable(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            orders: None,
            comparator: None,
        }
    }

    /// Column sorted by one backend key.
    pub fn by_key(id: impl Into<String>, key: impl Into<String>) -> Self {
        Self::by_generator(id, SortOrderProvider::keys([key.into()]))
    }

    /// Column sorted by several backend keys, all in the requested direction.
    pub fn by_keys<I, S>(id: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::by_generator(id, SortOrderProvider::keys(keys))
    }

    /// Column sorted by a directive generator.
    pub fn by_generator(id: impl Into<String>, orders: SortOrderProvider) -> Self {
        Self {
            id: id.into(),
            orders: Some(orders),
            comparator: None,
        }
    }

    /// Column sorted in memory by `comparator`.
    pub fn by_comparator(id: impl Into<String>, comparator: Comparator<T>) -> Self {
        Self {
            id: id.into(),
            orders: None,
            comparator: Some(comparator),
        }
    }

    /// Attach an in-memory comparator alongside the directive generator.
    #[must_use]
    pub fn with_comparator(mut self, comparator: Comparator<T>) -> Self {
        self.comparator = Some(comparator);
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn is_sortable(&self) -> bool {
        self.orders.is_some() || self.comparator.is_some()
    }

    /// Directives for `direction`; empty when the column has no generator.
    #[must_use]
    pub fn sort_orders(&self, direction: SortDirection) -> Vec<QuerySortOrder> {
        self.orders
            .as_ref()
            .map_or_else(Vec::new, |orders| orders.generate(direction))
    }
}

impl<T> fmt::Debug for ColumnSort<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSort")
            .field("id", &self.id)
            .field("orders", &self.orders.is_some())
            .field("comparator", &self.comparator.is_some())
            .finish()
    }
}

///
/// ColumnSortRequest
///
/// User request to sort one column in one direction.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnSortRequest {
    pub column: String,
    pub direction: SortDirection,
}

impl ColumnSortRequest {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Descending,
        }
    }
}

///
/// ProjectedSort
///
/// Sorting derived from column requests, ready to put on a query.
///

#[derive(Debug)]
pub struct ProjectedSort<T> {
    pub sort_orders: Vec<QuerySortOrder>,
    pub in_memory: Option<Comparator<T>>,
}

impl<T> ProjectedSort<T> {
    /// Put this sorting on a query under construction.
    #[must_use]
    pub fn apply<F>(self, builder: QueryBuilder<T, F>) -> QueryBuilder<T, F> {
        let builder = builder.sort_orders(self.sort_orders);

        match self.in_memory {
            Some(comparator) => builder.in_memory_sorting(comparator),
            None => builder,
        }
    }
}

///
/// SortColumns
///
/// Ordered registry of column sort declarations.
///

pub struct SortColumns<T> {
    columns: Vec<ColumnSort<T>>,
}

impl<T: 'static> SortColumns<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Add a column; ids must be unique.
    pub fn add(&mut self, column: ColumnSort<T>) -> Result<(), ProviderError> {
        if self.column(column.id()).is_some() {
            return Err(ProviderError::configuration(
                ErrorOrigin::Sort,
                format!("column '{}' is already declared", column.id()),
            ));
        }

        self.columns.push(column);
        Ok(())
    }

    #[must_use]
    pub fn column(&self, id: &str) -> Option<&ColumnSort<T>> {
        self.columns.iter().find(|column| column.id() == id)
    }

    /// Ids of the columns the sorting UI may offer, in declaration order.
    pub fn sortable_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|column| column.is_sortable())
            .map(ColumnSort::id)
    }

    /// Check every declaration against `provider` before any fetch.
    ///
    /// On an in-memory provider a column needs either its own comparator or
    /// keys the provider can sort by. Other providers need directive keys;
    /// whether they accept a key is up to `supports_sort_key`.
    pub fn bind<F, P>(&self, provider: &P) -> Result<(), ProviderError>
    where
        P: DataProvider<T, F> + ?Sized,
    {
        for column in &self.columns {
            if column.comparator.is_some() && provider.is_in_memory() {
                continue;
            }
            if column.comparator.is_some() && column.orders.is_none() {
                return Err(ProviderError::configuration(
                    ErrorOrigin::Sort,
                    format!(
                        "column '{}' only sorts in memory, but the provider is not in-memory",
                        column.id()
                    ),
                ));
            }

            for direction in [SortDirection::Ascending, SortDirection::Descending] {
                if let Some(order) = column
                    .sort_orders(direction)
                    .into_iter()
                    .find(|order| !provider.supports_sort_key(&order.key))
                {
                    return Err(ProviderError::configuration(
                        ErrorOrigin::Sort,
                        format!(
                            "column '{}' sorts by '{}', which the provider cannot sort",
                            column.id(),
                            order.key
                        ),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Project user requests (first = primary) into query sorting.
    ///
    /// Each generator is invoked once per request and its directives are
    /// appended in order. A key already emitted by an earlier column is
    /// skipped, since it cannot change the order. Requests naming an unknown
    /// or unsortable column are rejected.
    ///
    /// The in-memory comparator is projected only when every requested
    /// column has one. Otherwise every requested column must have keys, and
    /// a comparator-only column in the mix is a configuration error.
    pub fn project(
        &self,
        requests: &[ColumnSortRequest],
    ) -> Result<ProjectedSort<T>, ProviderError> {
        let mut sort_orders: Vec<QuerySortOrder> = Vec::new();
        let mut comparators = Vec::new();
        let mut comparator_only = None;

        for request in requests {
            let column = self
                .column(&request.column)
                .filter(|column| column.is_sortable())
                .ok_or_else(|| {
                    ProviderError::configuration(
                        ErrorOrigin::Sort,
                        format!("column '{}' is not sortable", request.column),
                    )
                })?;

            for order in column.sort_orders(request.direction) {
                if !sort_orders.iter().any(|seen| seen.key == order.key) {
                    sort_orders.push(order);
                }
            }
            if column.orders.is_none() {
                comparator_only.get_or_insert(column.id());
            }
            if let Some(comparator) = &column.comparator {
                comparators.push(comparator.for_direction(request.direction));
            }
        }

        if comparators.len() == requests.len() {
            return Ok(ProjectedSort {
                sort_orders,
                in_memory: Comparator::chain(&comparators),
            });
        }
        if let Some(id) = comparator_only {
            return Err(ProviderError::configuration(
                ErrorOrigin::Sort,
                format!(
                    "column '{id}' only sorts in memory and cannot be combined with key-sorted columns"
                ),
            ));
        }

        Ok(ProjectedSort {
            sort_orders,
            in_memory: None,
        })
    }
}

impl<T: 'static> Default for SortColumns<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SortColumns<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.columns).finish()
    }
}
