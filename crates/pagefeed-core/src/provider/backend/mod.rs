//! Module: provider::backend
//! Responsibility: adapt caller-supplied fetch/count callbacks to the
//! provider contract.
//! Does not own: filtering, sorting, paging, retries, or timeouts; all of
//! those belong to the callback author.

#[cfg(test)]
mod tests;

use crate::{
    error::{BoxError, ProviderError},
    event::{ListenerFn, ListenerSet, Registration},
    obs::sink::{self, MetricsEvent, ProviderKind},
    provider::{
        DataProvider, Identity, ItemKey, ItemStream, broadcast_refresh_all,
        broadcast_refresh_item, saturating_rows,
    },
    query::Query,
};
use std::{fmt, hash::Hash, iter, sync::Arc};

type FetchCallback<T, F> = dyn Fn(&Query<T, F>) -> Result<ItemStream<T>, BoxError> + Send + Sync;
type CountCallback<T, F> = dyn Fn(&Query<T, F>) -> Result<usize, BoxError> + Send + Sync;

///
/// BackendDataProvider
///
/// Provider whose data lives elsewhere. Every query is forwarded verbatim to
/// the callbacks; sort directives are opaque keys for the callback to map.
///
/// Keeping `count` and `fetch` consistent for the same filter is the
/// callback author's obligation.
///

pub struct BackendDataProvider<T, F> {
    fetch: Arc<FetchCallback<T, F>>,
    count: Arc<CountCallback<T, F>>,
    identity: Identity<T>,
    listeners: ListenerSet<T>,
}

impl<T, F> BackendDataProvider<T, F>
where
    T: Send + 'static,
    F: 'static,
{
    /// Build from callbacks, with value-equality identity.
    pub fn new<FC, CC, I, FE, CE>(fetch: FC, count: CC) -> Self
    where
        T: Hash,
        FC: Fn(&Query<T, F>) -> Result<I, FE> + Send + Sync + 'static,
        CC: Fn(&Query<T, F>) -> Result<usize, CE> + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
        FE: Into<BoxError>,
        CE: Into<BoxError>,
    {
        Self::keyed(fetch, count, Identity::hashed())
    }

    /// Build from callbacks with an explicit identity.
    pub fn keyed<FC, CC, I, FE, CE>(fetch: FC, count: CC, identity: Identity<T>) -> Self
    where
        FC: Fn(&Query<T, F>) -> Result<I, FE> + Send + Sync + 'static,
        CC: Fn(&Query<T, F>) -> Result<usize, CE> + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
        FE: Into<BoxError>,
        CE: Into<BoxError>,
    {
        Self {
            fetch: Arc::new(move |query: &Query<T, F>| {
                fetch(query)
                    .map(|items| Box::new(items.into_iter()) as ItemStream<T>)
                    .map_err(Into::into)
            }),
            count: Arc::new(move |query: &Query<T, F>| count(query).map_err(Into::into)),
            identity,
            listeners: ListenerSet::new(),
        }
    }

    /// Provider with no data; useful as a placeholder.
    #[must_use]
    pub fn empty() -> Self {
        Self::keyed(
            |_: &Query<T, F>| Ok::<_, BoxError>(iter::empty()),
            |_: &Query<T, F>| Ok::<_, BoxError>(0),
            Identity::new(|_| ItemKey::Uint(0)),
        )
    }

    #[must_use]
    pub fn with_identity(mut self, key: impl Fn(&T) -> ItemKey + Send + Sync + 'static) -> Self {
        self.identity = Identity::new(key);
        self
    }
}

impl<T, F> DataProvider<T, F> for BackendDataProvider<T, F>
where
    T: Send + 'static,
    F: 'static,
{
    fn is_in_memory(&self) -> bool {
        false
    }

    fn count(&self, query: &Query<T, F>) -> Result<usize, ProviderError> {
        match (self.count)(query) {
            Ok(count) => {
                tracing::debug!(count, "backend provider count");
                sink::record(MetricsEvent::Count {
                    kind: ProviderKind::Backend,
                });

                Ok(count)
            }
            Err(source) => {
                tracing::warn!(error = %source, "backend count callback failed");
                sink::record(MetricsEvent::CountFailed {
                    kind: ProviderKind::Backend,
                });

                Err(ProviderError::backend("count", source))
            }
        }
    }

    fn fetch(&self, query: &Query<T, F>) -> Result<ItemStream<T>, ProviderError> {
        match (self.fetch)(query) {
            Ok(items) => {
                tracing::debug!(
                    offset = query.offset(),
                    limit = ?query.limit(),
                    sort_orders = query.sort_orders().len(),
                    "backend provider fetch"
                );
                // Rows are counted as the caller pulls them.
                sink::record(MetricsEvent::Fetch {
                    kind: ProviderKind::Backend,
                    rows: 0,
                });

                Ok(Box::new(CountedStream {
                    inner: items,
                    rows: 0,
                }))
            }
            Err(source) => {
                tracing::warn!(error = %source, "backend fetch callback failed");
                sink::record(MetricsEvent::FetchFailed {
                    kind: ProviderKind::Backend,
                });

                Err(ProviderError::backend("fetch", source))
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
}

impl<T, F> Clone for BackendDataProvider<T, F> {
    fn clone(&self) -> Self {
        Self {
            fetch: Arc::clone(&self.fetch),
            count: Arc::clone(&self.count),
            identity: self.identity.clone(),
            listeners: self.listeners.clone(),
        }
    }
}

impl<T, F> fmt::Debug for BackendDataProvider<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendDataProvider")
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

///
/// CountedStream
///
/// Pass-through iterator that tallies consumed rows and reports them once,
/// when dropped, so the backend stream stays lazy.
///

struct CountedStream<T> {
    inner: ItemStream<T>,
    rows: usize,
}

impl<T> Iterator for CountedStream<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.inner.next()?;
        self.rows = self.rows.saturating_add(1);

        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> Drop for CountedStream<T> {
    fn drop(&mut self) {
        if self.rows > 0 {
            sink::record(MetricsEvent::RowsStreamed {
                kind: ProviderKind::Backend,
                rows: saturating_rows(self.rows),
            });
        }
    }
}
