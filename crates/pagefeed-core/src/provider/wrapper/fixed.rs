use crate::{
    error::ProviderError,
    provider::{DataProvider, ItemStream, wrapper::delegate_identity_and_listeners},
    query::Query,
};
use std::{fmt, marker::PhantomData};

///
/// FixedFilterProvider
///
/// Every query reaches the parent carrying the same filter value, whatever
/// the caller asked for. The filter type is `()`: nothing more can be
/// filtered through this provider.
///

pub struct FixedFilterProvider<T, F, P> {
    inner: P,
    filter: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F, P> FixedFilterProvider<T, F, P>
where
    P: DataProvider<T, F>,
    F: Clone + Send + Sync,
{
    pub const fn new(inner: P, filter: F) -> Self {
        Self {
            inner,
            filter,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    #[must_use]
    pub const fn fixed_filter(&self) -> &F {
        &self.filter
    }

    fn forward(&self, query: &Query<T, ()>) -> Query<T, F> {
        query.map_filter(Some(self.filter.clone()))
    }
}

impl<T, F, P> DataProvider<T, ()> for FixedFilterProvider<T, F, P>
where
    P: DataProvider<T, F>,
    F: Clone + Send + Sync,
{
    fn is_in_memory(&self) -> bool {
        self.inner.is_in_memory()
    }

    fn count(&self, query: &Query<T, ()>) -> Result<usize, ProviderError> {
        self.inner.count(&self.forward(query))
    }

    fn fetch(&self, query: &Query<T, ()>) -> Result<ItemStream<T>, ProviderError> {
        self.inner.fetch(&self.forward(query))
    }

    delegate_identity_and_listeners!();
}

impl<T, F: fmt::Debug, P: fmt::Debug> fmt::Debug for FixedFilterProvider<T, F, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedFilterProvider")
            .field("inner", &self.inner)
            .field("filter", &self.filter)
            .finish()
    }
}
