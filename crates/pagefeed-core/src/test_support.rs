//! Shared fixtures for unit tests.

use crate::{
    filter::Predicate,
    provider::{BackendDataProvider, ListDataProvider},
    query::{Query, SortDirection},
};
use std::{
    cmp::Reverse,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

///
/// President
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub(crate) struct President {
    pub(crate) id: u32,
    pub(crate) name: String,
    pub(crate) born: u16,
}

impl President {
    pub(crate) fn new(id: u32, name: &str, born: u16) -> Self {
        Self {
            id,
            name: name.to_string(),
            born,
        }
    }
}

pub(crate) fn presidents() -> Vec<President> {
    vec![
        President::new(1, "Washington", 1732),
        President::new(2, "Adams", 1735),
        President::new(3, "Jefferson", 1743),
        President::new(4, "Madison", 1751),
    ]
}

pub(crate) fn names(items: &[President]) -> Vec<&str> {
    items.iter().map(|p| p.name.as_str()).collect()
}

/// List provider over the fixture with `name` and `born` sortable.
pub(crate) fn list_provider() -> ListDataProvider<President> {
    ListDataProvider::new(presidents())
        .with_sortable_property("name", |p: &President| p.name.clone())
        .with_sortable_property("born", |p: &President| p.born)
}

pub(crate) fn born_before(year: u16) -> Predicate<President> {
    Predicate::new(move |p: &President| p.born < year)
}

///
/// CallLog
///
/// Counts backend callback invocations.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct CallLog {
    pub(crate) fetches: Arc<AtomicUsize>,
    pub(crate) counts: Arc<AtomicUsize>,
}

impl CallLog {
    pub(crate) fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn counts(&self) -> usize {
        self.counts.load(Ordering::SeqCst)
    }
}

/// Backend over the fixture that honors filter (minimum birth year), sort
/// keys `name`/`born`, and the window, the way a well-behaved service does.
pub(crate) fn backend_provider(log: &CallLog) -> BackendDataProvider<President, u16> {
    let (fetches, counts) = (Arc::clone(&log.fetches), Arc::clone(&log.counts));

    BackendDataProvider::new(
        move |query: &Query<President, u16>| {
            fetches.fetch_add(1, Ordering::SeqCst);
            let mut rows = matching(query);

            for order in query.sort_orders().iter().rev() {
                match (order.key.as_str(), order.direction) {
                    ("name", SortDirection::Ascending) => rows.sort_by(|a, b| a.name.cmp(&b.name)),
                    ("name", SortDirection::Descending) => {
                        rows.sort_by_key(|p| Reverse(p.name.clone()));
                    }
                    ("born", SortDirection::Ascending) => rows.sort_by_key(|p| p.born),
                    ("born", SortDirection::Descending) => rows.sort_by_key(|p| Reverse(p.born)),
                    (other, _) => return Err(format!("unknown sort key '{other}'")),
                }
            }

            Ok(rows
                .into_iter()
                .skip(query.offset_index())
                .take(query.limit_count())
                .collect::<Vec<_>>())
        },
        move |query: &Query<President, u16>| {
            counts.fetch_add(1, Ordering::SeqCst);

            Ok::<_, String>(matching(query).len())
        },
    )
}

fn matching(query: &Query<President, u16>) -> Vec<President> {
    presidents()
        .into_iter()
        .filter(|p| query.filter().is_none_or(|min| p.born >= *min))
        .collect()
}
