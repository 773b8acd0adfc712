//! Core of pagefeed: the query model, the `DataProvider` contract, in-memory
//! and callback-backed providers, filter adaptation wrappers, sort
//! projection, and the invalidation channel.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod error;
pub mod event;
pub mod filter;
pub mod obs;
pub mod provider;
pub mod query;
pub mod sort;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Vocabulary needed to build queries and wire providers.
/// Metrics and listener internals stay one module level down.
///

pub mod prelude {
    pub use crate::{
        error::{ErrorClass, ProviderError},
        event::{DataChangeEvent, Registration},
        filter::Predicate,
        provider::{
            BackendDataProvider, DataProvider, DataProviderExt, ItemKey, ListDataProvider, Page,
        },
        query::{Query, QueryContext, QuerySortOrder, SortDirection},
        sort::{ColumnSort, ColumnSortRequest, Comparator, SortColumns, SortOrderProvider},
    };
}
