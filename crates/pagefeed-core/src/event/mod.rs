//! Module: event
//! Responsibility: the invalidation channel shared by providers and their
//! consumers.
//! Does not own: re-reading backing data (providers never cache).

mod listeners;

#[cfg(test)]
mod tests;

use crate::provider::ItemKey;

// re-exports
pub use listeners::{ListenerFn, ListenerId, ListenerSet, Registration};

///
/// DataChangeEvent
///
/// Signal that previously fetched data may be stale.
/// `RefreshItem` names the item by its provider identity, not by address.
///

#[derive(Debug, Eq, PartialEq)]
pub enum DataChangeEvent<'a, T> {
    RefreshAll,
    RefreshItem { item: &'a T, key: ItemKey },
}

impl<T> DataChangeEvent<'_, T> {
    #[must_use]
    pub const fn is_refresh_all(&self) -> bool {
        matches!(self, Self::RefreshAll)
    }

    /// Identity of the refreshed item, if this is a single-item event.
    #[must_use]
    pub const fn key(&self) -> Option<&ItemKey> {
        match self {
            Self::RefreshAll => None,
            Self::RefreshItem { key, .. } => Some(key),
        }
    }
}
