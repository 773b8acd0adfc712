//! Module: sort
//! Responsibility: in-memory comparators, property sort capability, and
//! column-to-directive projection.
//! Does not own: backend-facing directive values (see `query::sort`).

pub mod column;

mod comparator;
mod registry;

// re-exports
pub use column::{
    ColumnSort, ColumnSortRequest, ProjectedSort, SortColumns, SortOrderProvider,
};
pub use comparator::Comparator;
pub use registry::SortRegistry;
