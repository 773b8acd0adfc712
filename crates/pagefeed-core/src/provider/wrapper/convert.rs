use crate::{
    error::{BoxError, ProviderError},
    provider::{DataProvider, ItemStream, wrapper::delegate_identity_and_listeners},
    query::Query,
};
use std::{fmt, marker::PhantomData, sync::Arc};

type Converter<G, F> = dyn Fn(&G) -> Result<F, BoxError> + Send + Sync;

///
/// ConvertedFilterProvider
///
/// Accepts filter type `G` and hands the parent `converter(G)`.
/// A query without a filter is forwarded without a filter; the converter is
/// not called. Converter failures surface from `fetch`/`count` as
/// conversion errors carrying the original error.
///

pub struct ConvertedFilterProvider<T, G, F, P> {
    inner: P,
    converter: Arc<Converter<G, F>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T, G, F, P> ConvertedFilterProvider<T, G, F, P>
where
    P: DataProvider<T, F>,
{
    pub fn new<C, E>(inner: P, converter: C) -> Self
    where
        C: Fn(&G) -> Result<F, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self {
            inner,
            converter: Arc::new(move |value: &G| converter(value).map_err(Into::into)),
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    fn forward(&self, query: &Query<T, G>) -> Result<Query<T, F>, ProviderError> {
        let filter = query
            .filter()
            .map(|value| (self.converter)(value))
            .transpose()
            .map_err(|source| {
                tracing::warn!(error = %source, "filter conversion failed");
                ProviderError::conversion(source)
            })?;

        Ok(query.map_filter(filter))
    }
}

impl<T, G, F, P> DataProvider<T, G> for ConvertedFilterProvider<T, G, F, P>
where
    P: DataProvider<T, F>,
{
    fn is_in_memory(&self) -> bool {
        self.inner.is_in_memory()
    }

    fn count(&self, query: &Query<T, G>) -> Result<usize, ProviderError> {
        self.inner.count(&self.forward(query)?)
    }

    fn fetch(&self, query: &Query<T, G>) -> Result<ItemStream<T>, ProviderError> {
        self.inner.fetch(&self.forward(query)?)
    }

    delegate_identity_and_listeners!();
}

impl<T, G, F, P: fmt::Debug> fmt::Debug for ConvertedFilterProvider<T, G, F, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertedFilterProvider")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
