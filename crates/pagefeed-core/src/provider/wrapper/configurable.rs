use crate::{
    error::ProviderError,
    provider::{DataProvider, ItemStream, wrapper::delegate_identity_and_listeners},
    query::Query,
};
use parking_lot::RwLock;
use std::{fmt, marker::PhantomData, sync::Arc};

type Combiner<Q, C, F> = dyn Fn(Option<&Q>, Option<&C>) -> Option<F> + Send + Sync;

///
/// ConfigurableFilterProvider
///
/// Holds a settable filter of type `C` of its own. On each call the query
/// filter (`Q`) and the configured filter are merged by the combiner into
/// the parent's filter type `F`.
///
/// `set_filter` only changes this wrapper, then signals `refresh_all` to
/// every listener of the parent.
///

pub struct ConfigurableFilterProvider<T, Q, C, F, P> {
    inner: P,
    configured: RwLock<Option<C>>,
    combiner: Arc<Combiner<Q, C, F>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, Q, C, F, P> ConfigurableFilterProvider<T, Q, C, F, P>
where
    P: DataProvider<T, F>,
{
    pub fn new<M>(inner: P, combiner: M) -> Self
    where
        M: Fn(Option<&Q>, Option<&C>) -> Option<F> + Send + Sync + 'static,
    {
        Self {
            inner,
            configured: RwLock::new(None),
            combiner: Arc::new(combiner),
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    /// Replace the configured filter and notify listeners.
    pub fn set_filter(&self, filter: Option<C>) {
        *self.configured.write() = filter;
        tracing::debug!("configured filter replaced");

        self.inner.refresh_all();
    }

    /// Clone of the configured filter.
    #[must_use]
    pub fn configured_filter(&self) -> Option<C>
    where
        C: Clone,
    {
        self.configured.read().clone()
    }

    fn forward(&self, query: &Query<T, Q>) -> Query<T, F> {
        let configured = self.configured.read();
        let filter = (self.combiner)(query.filter(), configured.as_ref());

        query.map_filter(filter)
    }
}

impl<T, Q, C, F, P> DataProvider<T, Q> for ConfigurableFilterProvider<T, Q, C, F, P>
where
    P: DataProvider<T, F>,
    C: Send + Sync,
{
    fn is_in_memory(&self) -> bool {
        self.inner.is_in_memory()
    }

    fn count(&self, query: &Query<T, Q>) -> Result<usize, ProviderError> {
        self.inner.count(&self.forward(query))
    }

    fn fetch(&self, query: &Query<T, Q>) -> Result<ItemStream<T>, ProviderError> {
        self.inner.fetch(&self.forward(query))
    }

    delegate_identity_and_listeners!();
}

impl<T, Q, C, F, P> fmt::Debug for ConfigurableFilterProvider<T, Q, C, F, P>
where
    C: fmt::Debug,
    P: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurableFilterProvider")
            .field("inner", &self.inner)
            .field("configured", &*self.configured.read())
            .finish_non_exhaustive()
    }
}
