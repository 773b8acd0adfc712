//! Module: provider
//! Responsibility: the `DataProvider` contract and its concrete variants.
//! Does not own: rendering, transport, or caching of fetched pages.
//! Boundary: consumers call `fetch`/`count`/listener registration; backend
//! callbacks are invoked synchronously on the caller's thread.

pub mod backend;
pub mod list;
pub mod wrapper;

mod identity;

use crate::{
    error::{BoxError, ProviderError},
    event::{DataChangeEvent, ListenerFn, ListenerSet, Registration},
    obs::sink::{self, MetricsEvent},
    query::Query,
};
use std::sync::Arc;

// re-exports
pub use backend::BackendDataProvider;
pub use identity::{Identity, ItemKey};
pub use list::ListDataProvider;
pub use wrapper::{ConfigurableFilterProvider, ConvertedFilterProvider, FixedFilterProvider};

/// Finite, lazily evaluated sequence of fetched items.
pub type ItemStream<T> = Box<dyn Iterator<Item = T> + Send>;

///
/// DataProvider
///
/// Source of items for one filter type.
///
/// `fetch` and `count` must agree: for a filter value F, `count` equals the
/// number of items all `fetch` windows over `[0, count)` yield for F. Sort
/// orders and paging fields do not affect `count`. Nothing checks this at
/// runtime.
///

pub trait DataProvider<T, F>: Send + Sync {
    /// True only for collection-backed providers; consumers use it to decide
    /// whether comparator-based sorting and predicate filtering are legal.
    fn is_in_memory(&self) -> bool;

    /// Number of items matching the query filter.
    fn count(&self, query: &Query<T, F>) -> Result<usize, ProviderError>;

    /// Items matching the filter, ordered, windowed to `[offset, offset+limit)`.
    /// Fewer than `limit` items means the end of the data was reached.
    fn fetch(&self, query: &Query<T, F>) -> Result<ItemStream<T>, ProviderError>;

    /// Identity used for single-item refresh correlation.
    fn id(&self, item: &T) -> ItemKey;

    fn add_listener(&self, listener: Arc<ListenerFn<T>>) -> Registration;

    /// Notify every listener that all data may be stale.
    fn refresh_all(&self);

    /// Notify every listener that one item changed.
    fn refresh_item(&self, item: &T);

    /// Setup-time probe: may `key` appear in `Query::sort_orders`?
    fn supports_sort_key(&self, key: &str) -> bool {
        let _ = key;
        true
    }
}

macro_rules! forward_data_provider {
    ($ptr:ident) => {
        impl<T, F, P> DataProvider<T, F> for $ptr<P>
        where
            P: DataProvider<T, F> + ?Sized,
        {
            fn is_in_memory(&self) -> bool {
                (**self).is_in_memory()
            }

            fn count(&self, query: &Query<T, F>) -> Result<usize, ProviderError> {
                (**self).count(query)
            }

            fn fetch(&self, query: &Query<T, F>) -> Result<ItemStream<T>, ProviderError> {
                (**self).fetch(query)
            }

            fn id(&self, item: &T) -> ItemKey {
                (**self).id(item)
            }

            fn add_listener(&self, listener: Arc<ListenerFn<T>>) -> Registration {
                (**self).add_listener(listener)
            }

            fn refresh_all(&self) {
                (**self).refresh_all();
            }

            fn refresh_item(&self, item: &T) {
                (**self).refresh_item(item);
            }

            fn supports_sort_key(&self, key: &str) -> bool {
                (**self).supports_sort_key(key)
            }
        }
    };
}

forward_data_provider!(Arc);
forward_data_provider!(Box);

// Shared refresh plumbing for providers that own a listener set.
pub(crate) fn broadcast_refresh_all<T: 'static>(listeners: &ListenerSet<T>) {
    let called = listeners.emit(&DataChangeEvent::RefreshAll);

    sink::record(MetricsEvent::RefreshAll {
        listeners: saturating_rows(called),
    });
}

pub(crate) fn broadcast_refresh_item<T: 'static>(
    listeners: &ListenerSet<T>,
    identity: &Identity<T>,
    item: &T,
) {
    let key = identity.key(item);
    tracing::trace!(%key, "refreshing item");
    let called = listeners.emit(&DataChangeEvent::RefreshItem { item, key });

    sink::record(MetricsEvent::RefreshItem {
        listeners: saturating_rows(called),
    });
}

pub(crate) fn saturating_rows(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

///
/// Page
///
/// One materialized fetch window.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub offset: u32,
    pub limit: Option<u32>,
}

impl<T> Page<T> {
    /// True when the window came back short, i.e. no later window has items.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.limit.is_none_or(|limit| {
            usize::try_from(limit).map_or(true, |limit| self.items.len() < limit)
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

///
/// DataProviderExt
///
/// Combinators and conveniences available on every provider.
/// Each combinator consumes `self` (wrap an `Arc` to keep sharing the
/// parent) and never mutates the wrapped provider.
///

pub trait DataProviderExt<T, F>: DataProvider<T, F> + Sized {
    /// Pin the filter to `filter`; the result accepts no further filter.
    fn with_fixed_filter(self, filter: F) -> FixedFilterProvider<T, F, Self>
    where
        F: Clone + Send + Sync,
    {
        FixedFilterProvider::new(self, filter)
    }

    /// Accept filter type `G`, converted to `F` on every call.
    fn with_convert_filter<G, C>(self, converter: C) -> ConvertedFilterProvider<T, G, F, Self>
    where
        C: Fn(&G) -> F + Send + Sync + 'static,
    {
        ConvertedFilterProvider::new(self, move |value: &G| Ok::<_, BoxError>(converter(value)))
    }

    /// Like `with_convert_filter`, for converters that may fail.
    fn with_try_convert_filter<G, C, E>(
        self,
        converter: C,
    ) -> ConvertedFilterProvider<T, G, F, Self>
    where
        C: Fn(&G) -> Result<F, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        ConvertedFilterProvider::new(self, converter)
    }

    /// Wrap with a settable filter; callers pass no filter of their own.
    fn with_configurable_filter(self) -> ConfigurableFilterProvider<T, (), F, F, Self>
    where
        F: Clone + Send + Sync + 'static,
    {
        ConfigurableFilterProvider::new(self, |_: Option<&()>, configured: Option<&F>| {
            configured.cloned()
        })
    }

    /// Wrap with a settable filter of type `C`, merged with the query filter
    /// of type `Q` by `combiner`.
    fn with_configurable_filter_combiner<Q, C, M>(
        self,
        combiner: M,
    ) -> ConfigurableFilterProvider<T, Q, C, F, Self>
    where
        M: Fn(Option<&Q>, Option<&C>) -> Option<F> + Send + Sync + 'static,
    {
        ConfigurableFilterProvider::new(self, combiner)
    }

    /// Register a closure listener.
    fn on_change(
        &self,
        listener: impl Fn(&DataChangeEvent<'_, T>) + Send + Sync + 'static,
    ) -> Registration {
        self.add_listener(Arc::new(listener))
    }

    /// Fetch one window into a `Page`.
    fn fetch_page(&self, query: &Query<T, F>) -> Result<Page<T>, ProviderError> {
        let items = self.fetch(query)?.collect();

        Ok(Page {
            items,
            offset: query.offset(),
            limit: query.limit(),
        })
    }

    /// Fetch one window into a `Vec`.
    fn fetch_vec(&self, query: &Query<T, F>) -> Result<Vec<T>, ProviderError> {
        Ok(self.fetch(query)?.collect())
    }
}

impl<T, F, P: DataProvider<T, F>> DataProviderExt<T, F> for P {}
