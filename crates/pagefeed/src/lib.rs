//! PageFeed: typed, composable data providers for paged, sortable,
//! filterable item sets.
//!
//! This is the public meta-crate. Downstream users depend on **pagefeed**
//! only; it re-exports the stable API of `pagefeed-core`.

pub use pagefeed_core as core;

pub use pagefeed_core::{error, event, filter, obs, provider, query, sort};

/// Crate version, for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Prelude
//

pub mod prelude {
    pub use pagefeed_core::prelude::*;

    // sort orders, item keys and query context travel to backends as data
    pub use serde::{Deserialize, Serialize};
}
