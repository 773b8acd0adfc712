use crate::{
    error::{ErrorOrigin, ProviderError},
    query::QuerySortOrder,
    sort::Comparator,
};
use std::{collections::BTreeMap, fmt};

///
/// SortRegistry
///
/// Capability map from property key to comparator.
/// A key without an entry is not sortable in memory.
///

pub struct SortRegistry<T> {
    comparators: BTreeMap<String, Comparator<T>>,
}

impl<T> Clone for SortRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            comparators: self.comparators.clone(),
        }
    }
}

impl<T> fmt::Debug for SortRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.comparators.keys()).finish()
    }
}

impl<T: 'static> SortRegistry<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            comparators: BTreeMap::new(),
        }
    }

    /// Register (or replace) the comparator for `key`.
    pub fn register(&mut self, key: impl Into<String>, comparator: Comparator<T>) {
        self.comparators.insert(key.into(), comparator);
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.comparators.contains_key(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Comparator<T>> {
        self.comparators.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.comparators.keys().map(String::as_str)
    }

    /// Build one comparator for the directive sequence, first entry primary.
    /// Returns `Ok(None)` for an empty sequence.
    pub fn resolve(
        &self,
        orders: &[QuerySortOrder],
    ) -> Result<Option<Comparator<T>>, ProviderError> {
        let resolved = orders
            .iter()
            .map(|order| {
                self.get(&order.key)
                    .map(|comparator| comparator.for_direction(order.direction))
                    .ok_or_else(|| ProviderError::unsortable_property(ErrorOrigin::Sort, &order.key))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Comparator::chain(&resolved))
    }
}

impl<T: 'static> Default for SortRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
