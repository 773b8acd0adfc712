//! In-memory item predicates, the default filter type of list providers.

use std::{fmt, sync::Arc};

///
/// Predicate
///
/// Shared boolean test over items. Composition builds new predicates and
/// leaves the operands untouched.
///

pub struct Predicate<T> {
    test: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T: 'static> Predicate<T> {
    pub fn new(test: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self {
            test: Arc::new(test),
        }
    }

    /// Predicate that accepts every item.
    #[must_use]
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// Conjunction; `other` is only evaluated when `self` accepts.
    #[must_use]
    pub fn and(&self, other: &Self) -> Self {
        let (a, b) = (Arc::clone(&self.test), Arc::clone(&other.test));

        Self::new(move |item| a(item) && b(item))
    }

    #[must_use]
    pub fn or(&self, other: &Self) -> Self {
        let (a, b) = (Arc::clone(&self.test), Arc::clone(&other.test));

        Self::new(move |item| a(item) || b(item))
    }

    #[must_use]
    pub fn not(&self) -> Self {
        let inner = Arc::clone(&self.test);

        Self::new(move |item| !inner(item))
    }

    /// Conjunction of an optional pair; `None` when both are absent.
    #[must_use]
    pub fn and_optional(first: Option<&Self>, second: Option<&Self>) -> Option<Self> {
        match (first, second) {
            (Some(a), Some(b)) => Some(a.and(b)),
            (Some(p), None) | (None, Some(p)) => Some(p.clone()),
            (None, None) => None,
        }
    }
}

impl<T> Predicate<T> {
    #[must_use]
    pub fn test(&self, item: &T) -> bool {
        (self.test)(item)
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            test: Arc::clone(&self.test),
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

///
/// TESTS
///
