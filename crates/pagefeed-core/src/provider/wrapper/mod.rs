//! Module: provider::wrapper
//! Responsibility: filter-type adaptation over an existing provider.
//! Does not own: data, identity, or listeners; all of those are delegated to
//! the wrapped provider.
//!
//! Each wrapper owns its parent (use `Arc<P>` to share one) and never
//! mutates it.

/// Delegate identity, listener, and refresh calls to `self.inner`.
macro_rules! delegate_identity_and_listeners {
    () => {
        fn id(&self, item: &T) -> $crate::provider::ItemKey {
            self.inner.id(item)
        }

        fn add_listener(
            &self,
            listener: ::std::sync::Arc<$crate::event::ListenerFn<T>>,
        ) -> $crate::event::Registration {
            self.inner.add_listener(listener)
        }

        fn refresh_all(&self) {
            self.inner.refresh_all();
        }

        fn refresh_item(&self, item: &T) {
            self.inner.refresh_item(item);
        }

        fn supports_sort_key(&self, key: &str) -> bool {
            self.inner.supports_sort_key(key)
        }
    };
}

pub(crate) use delegate_identity_and_listeners;

mod configurable;
mod convert;
mod fixed;

#[cfg(test)]
mod tests;

// re-exports
pub use configurable::ConfigurableFilterProvider;
pub use convert::ConvertedFilterProvider;
pub use fixed::FixedFilterProvider;
