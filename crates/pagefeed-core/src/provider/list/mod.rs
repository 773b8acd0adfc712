//! Module: provider::list
//! Responsibility: in-memory provider with local filter, sort, and paging.
//! Does not own: the backing collection (shared by reference, never copied).
//! Boundary: callers mutate the collection directly, then call a refresh.


use crate::{
    error::{ErrorOrigin, ProviderError},
    event::{ListenerFn, ListenerSet, Registration},
    filter::Predicate,
    obs::sink::{self, MetricsEvent, ProviderKind},
    provider::{
        ConvertedFilterProvider, DataProvider, DataProviderExt, Identity, ItemKey, ItemStream,
        broadcast_refresh_all, broadcast_refresh_item, saturating_rows,
    },
    query::{Query, SortDirection},
    sort::{Comparator, SortRegistry},
};
use parking_lot::RwLock;
use std::{fmt, hash::Hash, sync::Arc};

/// Shared handle to the backing collection of a `ListDataProvider`.
pub type SharedItems<T> = Arc<RwLock<Vec<T>>>;

///
/// ListDataProvider
///
/// Provider over an in-memory collection.
///
/// Query filter and the provider's own filters are combined with AND.
/// Ordering is: the query's in-memory comparator if present, otherwise the
/// query sort orders resolved through the property registry, then the
/// provider's default comparator as the final tie-break.
///
/// Derived instances (`sorting_by`, `with_filter`, ...) share the backing
/// collection and listener set but own their comparator and filter.
///
/// Filters run while the store is read-locked and must not write to
/// `items()`. Comparators run after the matching rows are cloned out.
///

pub struct ListDataProvider<T> {
    items: SharedItems<T>,
    filter: Option<Predicate<T>>,
    sort: Option<Comparator<T>>,
    properties: Arc<SortRegistry<T>>,
    identity: Identity<T>,
    listeners: ListenerSet<T>,
}

impl<T> ListDataProvider<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wrap `items` with value-equality identity.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self
    where
        T: Hash,
    {
        Self::from_shared(Arc::new(RwLock::new(items)))
    }

    /// Wrap an existing shared collection with value-equality identity.
    #[must_use]
    pub fn from_shared(items: SharedItems<T>) -> Self
    where
        T: Hash,
    {
        Self::from_parts(items, Identity::hashed())
    }

    /// Wrap an existing shared collection with an explicit identity.
    #[must_use]
    pub fn from_parts(items: SharedItems<T>, identity: Identity<T>) -> Self {
        Self {
            items,
            filter: None,
            sort: None,
            properties: Arc::new(SortRegistry::new()),
            identity,
            listeners: ListenerSet::new(),
        }
    }

    #[must_use]
    pub fn with_identity(mut self, key: impl Fn(&T) -> ItemKey + Send + Sync + 'static) -> Self {
        self.identity = Identity::new(key);
        self
    }

    /// The shared backing collection.
    #[must_use]
    pub const fn items(&self) -> &SharedItems<T> {
        &self.items
    }

    // ------------------------------------------------------------------
    // Sort capability
    // ------------------------------------------------------------------

    /// Make `key` sortable by the natural order of the extracted value.
    #[must_use]
    pub fn with_sortable_property<V, K>(self, key: impl Into<String>, extractor: K) -> Self
    where
        V: Ord,
        K: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.with_property_comparator(key, Comparator::comparing(extractor))
    }

    /// Make `key` sortable with an explicit comparator.
    #[must_use]
    pub fn with_property_comparator(
        mut self,
        key: impl Into<String>,
        comparator: Comparator<T>,
    ) -> Self {
        Arc::make_mut(&mut self.properties).register(key, comparator);
        self
    }

    pub fn sortable_properties(&self) -> impl Iterator<Item = &str> {
        self.properties.keys()
    }

    // ------------------------------------------------------------------
    // Default ordering
    // ------------------------------------------------------------------

    /// New instance ordered ascending by the extracted value.
    #[must_use]
    pub fn sorting_by<V, K>(&self, extractor: K) -> Self
    where
        V: Ord,
        K: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.sorting_by_comparator(Comparator::comparing(extractor))
    }

    /// New instance ordered descending by the extracted value.
    #[must_use]
    pub fn sorting_by_desc<V, K>(&self, extractor: K) -> Self
    where
        V: Ord,
        K: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.sorting_by_comparator(Comparator::comparing(extractor).reversed())
    }

    /// New instance whose default comparator is `comparator`.
    #[must_use]
    pub fn sorting_by_comparator(&self, comparator: Comparator<T>) -> Self {
        Self {
            sort: Some(comparator),
            ..self.clone()
        }
    }

    /// New instance that tie-breaks the current default order with
    /// `comparator`.
    #[must_use]
    pub fn then_sorting_by_comparator(&self, comparator: Comparator<T>) -> Self {
        let sort = match &self.sort {
            Some(current) => current.then(&comparator),
            None => comparator,
        };

        Self {
            sort: Some(sort),
            ..self.clone()
        }
    }

    /// New instance ordered by a registered property.
    /// Fails immediately when `key` has no comparator.
    pub fn sorting_by_property(
        &self,
        key: &str,
        direction: SortDirection,
    ) -> Result<Self, ProviderError> {
        let comparator = self
            .properties
            .get(key)
            .ok_or_else(|| ProviderError::unsortable_property(ErrorOrigin::ListProvider, key))?;

        Ok(self.sorting_by_comparator(comparator.for_direction(direction)))
    }

    /// New instance without a default comparator (backing order).
    #[must_use]
    pub fn unsorted(&self) -> Self {
        Self {
            sort: None,
            ..self.clone()
        }
    }

    #[must_use]
    pub const fn default_comparator(&self) -> Option<&Comparator<T>> {
        self.sort.as_ref()
    }

    // ------------------------------------------------------------------
    // Provider-level filters
    // ------------------------------------------------------------------

    /// New instance whose filter is the existing one AND `predicate`.
    #[must_use]
    pub fn with_filter(&self, predicate: Predicate<T>) -> Self {
        let filter = match &self.filter {
            Some(current) => current.and(&predicate),
            None => predicate,
        };

        Self {
            filter: Some(filter),
            ..self.clone()
        }
    }

    /// Filter on an extracted value.
    #[must_use]
    pub fn filtering_by<V, K, P>(&self, extractor: K, test: P) -> Self
    where
        K: Fn(&T) -> V + Send + Sync + 'static,
        P: Fn(&V) -> bool + Send + Sync + 'static,
    {
        self.with_filter(Predicate::new(move |item: &T| test(&extractor(item))))
    }

    /// Keep items whose extracted value equals `value`.
    #[must_use]
    pub fn filtering_by_equals<V, K>(&self, extractor: K, value: V) -> Self
    where
        V: PartialEq + Send + Sync + 'static,
        K: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.filtering_by(extractor, move |candidate| *candidate == value)
    }

    /// Keep items whose extracted text starts with `prefix`, ignoring case.
    #[must_use]
    pub fn filtering_by_prefix<S, K>(&self, extractor: K, prefix: &str) -> Self
    where
        S: AsRef<str>,
        K: Fn(&T) -> S + Send + Sync + 'static,
    {
        let prefix = prefix.to_lowercase();

        self.filtering_by(extractor, move |text: &S| {
            text.as_ref().to_lowercase().starts_with(&prefix)
        })
    }

    /// Keep items whose extracted text contains `needle`, ignoring case.
    #[must_use]
    pub fn filtering_by_substring<S, K>(&self, extractor: K, needle: &str) -> Self
    where
        S: AsRef<str>,
        K: Fn(&T) -> S + Send + Sync + 'static,
    {
        let needle = needle.to_lowercase();

        self.filtering_by(extractor, move |text: &S| {
            text.as_ref().to_lowercase().contains(&needle)
        })
    }

    /// New instance without provider-level filters.
    #[must_use]
    pub fn without_filters(&self) -> Self {
        Self {
            filter: None,
            ..self.clone()
        }
    }

    #[must_use]
    pub const fn filter(&self) -> Option<&Predicate<T>> {
        self.filter.as_ref()
    }

    /// Provider accepting a plain value as its filter: items whose extracted
    /// value equals the query filter.
    #[must_use]
    pub fn filtering_by_value<V, K>(
        &self,
        extractor: K,
    ) -> ConvertedFilterProvider<T, V, Predicate<T>, Self>
    where
        V: PartialEq + Clone + Send + Sync + 'static,
        K: Fn(&T) -> V + Send + Sync + 'static,
    {
        let extractor = Arc::new(extractor);

        self.clone().with_convert_filter(move |value: &V| {
            let extractor = Arc::clone(&extractor);
            let value = value.clone();

            Predicate::new(move |item: &T| extractor(item) == value)
        })
    }

    /// Provider accepting search text as its filter: items whose extracted
    /// text contains the query filter, ignoring case.
    #[must_use]
    pub fn filtering_by_text<S, K>(
        &self,
        extractor: K,
    ) -> ConvertedFilterProvider<T, String, Predicate<T>, Self>
    where
        S: AsRef<str>,
        K: Fn(&T) -> S + Send + Sync + 'static,
    {
        let extractor = Arc::new(extractor);

        self.clone().with_convert_filter(move |needle: &String| {
            let extractor = Arc::clone(&extractor);
            let needle = needle.to_lowercase();

            Predicate::new(move |item: &T| {
                extractor(item).as_ref().to_lowercase().contains(&needle)
            })
        })
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    // Query comparator (or resolved sort orders), then the default order.
    fn effective_comparator(
        &self,
        query: &Query<T, Predicate<T>>,
    ) -> Result<Option<Comparator<T>>, ProviderError> {
        let requested = match query.in_memory_sorting() {
            Some(comparator) => Some(comparator.clone()),
            None => self.properties.resolve(query.sort_orders())?,
        };

        Ok(Comparator::chain(requested.iter().chain(self.sort.iter())))
    }

    fn fetch_window(&self, query: &Query<T, Predicate<T>>) -> Result<Vec<T>, ProviderError> {
        let comparator = self.effective_comparator(query)?;
        let filter = Predicate::and_optional(self.filter.as_ref(), query.filter());

        let page: Vec<T> = match comparator {
            None => self
                .items
                .read()
                .iter()
                .filter(|item| filter.as_ref().is_none_or(|p| p.test(item)))
                .skip(query.offset_index())
                .take(query.limit_count())
                .cloned()
                .collect(),
            Some(comparator) => {
                let mut rows: Vec<T> = self
                    .items
                    .read()
                    .iter()
                    .filter(|item| filter.as_ref().is_none_or(|p| p.test(item)))
                    .cloned()
                    .collect();

                // the store lock is released before any comparator runs
                rows.sort_by(|a, b| comparator.compare(a, b));
                rows.into_iter()
                    .skip(query.offset_index())
                    .take(query.limit_count())
                    .collect()
            }
        };

        tracing::debug!(
            offset = query.offset(),
            limit = ?query.limit(),
            sort_orders = query.sort_orders().len(),
            returned = page.len(),
            "list provider fetch"
        );

        Ok(page)
    }
}

impl<T> DataProvider<T, Predicate<T>> for ListDataProvider<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn is_in_memory(&self) -> bool {
        true
    }

    fn count(&self, query: &Query<T, Predicate<T>>) -> Result<usize, ProviderError> {
        let filter = Predicate::and_optional(self.filter.as_ref(), query.filter());
        let count = self
            .items
            .read()
            .iter()
            .filter(|item| filter.as_ref().is_none_or(|p| p.test(item)))
            .count();

        tracing::debug!(count, "list provider count");
        sink::record(MetricsEvent::Count {
            kind: ProviderKind::List,
        });

        Ok(count)
    }

    fn fetch(&self, query: &Query<T, Predicate<T>>) -> Result<ItemStream<T>, ProviderError> {
        match self.fetch_window(query) {
            Ok(page) => {
                sink::record(MetricsEvent::Fetch {
                    kind: ProviderKind::List,
                    rows: saturating_rows(page.len()),
                });

                Ok(Box::new(page.into_iter()))
            }
            Err(err) => {
                sink::record(MetricsEvent::FetchFailed {
                    kind: ProviderKind::List,
                });

                Err(err)
            }
        }
    }

    fn id(&self, item: &T) -> ItemKey {
        self.identity.key(item)
    }

    fn add_listener(&self, listener: Arc<ListenerFn<T>>) -> Registration {
        self.listeners.add(listener)
    }

    fn refresh_all(&self) {
        broadcast_refresh_all(&self.listeners);
    }

    fn refresh_item(&self, item: &T) {
        broadcast_refresh_item(&self.listeners, &self.identity, item);
    }

    fn supports_sort_key(&self, key: &str) -> bool {
        self.properties.contains(key)
    }
}

impl<T> Clone for ListDataProvider<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            filter: self.filter.clone(),
            sort: self.sort.clone(),
            properties: Arc::clone(&self.properties),
            identity: self.identity.clone(),
            listeners: self.listeners.clone(),
        }
    }
}

impl<T> fmt::Debug for ListDataProvider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListDataProvider")
            .field("items", &self.items.read().len())
            .field("filtered", &self.filter.is_some())
            .field("sorted", &self.sort.is_some())
            .field("properties", &self.properties)
            .field("listeners", &self.listeners)
            .finish()
    }
}
