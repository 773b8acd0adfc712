use crate::query::SortDirection;
use std::{cmp::Ordering, fmt, sync::Arc};

type CompareFn<T> = dyn Fn(&T, &T) -> Ordering + Send + Sync;

///
/// Comparator
///
/// Shared, total-order comparison over items.
/// Cloning is a reference-count bump; composition never mutates the source.
///

pub struct Comparator<T> {
    compare: Arc<CompareFn<T>>,
}

impl<T: 'static> Comparator<T> {
    pub fn new(compare: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Self {
        Self {
            compare: Arc::new(compare),
        }
    }

    /// Natural ordering of an extracted key.
    ///
    /// The `Ord` bound is what makes "sort by a property with no natural
    /// order" impossible to configure.
    pub fn comparing<V, K>(key: K) -> Self
    where
        V: Ord,
        K: Fn(&T) -> V + Send + Sync + 'static,
    {
        Self::new(move |a, b| key(a).cmp(&key(b)))
    }

    /// Natural ordering of the item itself.
    #[must_use]
    pub fn natural() -> Self
    where
        T: Ord,
    {
        Self::new(Ord::cmp)
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        let inner = Arc::clone(&self.compare);

        Self::new(move |a, b| inner(b, a))
    }

    /// Tie-break with `next` when this comparator reports equality.
    #[must_use]
    pub fn then(&self, next: &Self) -> Self {
        let first = Arc::clone(&self.compare);
        let second = Arc::clone(&next.compare);

        Self::new(move |a, b| first(a, b).then_with(|| second(a, b)))
    }

    #[must_use]
    pub fn for_direction(&self, direction: SortDirection) -> Self {
        match direction {
            SortDirection::Ascending => self.clone(),
            SortDirection::Descending => self.reversed(),
        }
    }

    /// Chain comparators in precedence order; `None` when empty.
    pub fn chain<'a>(comparators: impl IntoIterator<Item = &'a Self>) -> Option<Self> {
        comparators.into_iter().fold(None, |acc, next| match acc {
            None => Some(next.clone()),
            Some(acc) => Some(acc.then(next)),
        })
    }
}

impl<T> Comparator<T> {
    #[must_use]
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.compare)(a, b)
    }
}

impl<T> Clone for Comparator<T> {
    fn clone(&self) -> Self {
        Self {
            compare: Arc::clone(&self.compare),
        }
    }
}

impl<T> fmt::Debug for Comparator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Comparator(..)")
    }
}
