use super::*;
use crate::{
    error::{ErrorClass, ProviderError},
    event::DataChangeEvent,
    filter::Predicate,
    provider::{DataProvider, DataProviderExt, ListDataProvider},
    query::{Query, QuerySortOrder},
    test_support::{CallLog, President, backend_provider, born_before, list_provider, names},
};
use proptest::prelude::*;
use std::{
    num::ParseIntError,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

fn born_since(year: u16) -> Predicate<President> {
    Predicate::new(move |p: &President| p.born >= year)
}

#[test]
fn fixed_filter_ignores_whatever_the_caller_supplies() {
    let fixed = list_provider().with_fixed_filter(born_before(1740));
    let query = Query::builder()
        .sort(QuerySortOrder::asc("name"))
        .filter(())
        .build()
        .unwrap();

    let rows: Vec<_> = fixed.fetch(&query).unwrap().collect();

    assert_eq!(names(&rows), vec!["Adams", "Washington"]);
    assert_eq!(fixed.count(&Query::new()).unwrap(), 2);
    assert!(fixed.is_in_memory());
}

#[test]
fn fixed_filter_reaches_a_backend_callback() {
    let log = CallLog::default();
    let fixed = backend_provider(&log).with_fixed_filter(1743);

    assert_eq!(fixed.count(&Query::new()).unwrap(), 2);
    assert!(!fixed.is_in_memory());
    assert_eq!(*fixed.fixed_filter(), 1743);
}

#[test]
fn convert_filter_forwards_the_converted_value() {
    let log = CallLog::default();
    let by_text = backend_provider(&log).with_convert_filter(|year: &String| {
        year.trim().parse::<u16>().unwrap_or(u16::MAX)
    });

    let rows: Vec<_> = by_text
        .fetch(&Query::with_filter(" 1743 ".to_string()))
        .unwrap()
        .collect();

    assert_eq!(names(&rows), vec!["Jefferson", "Madison"]);
}

#[test]
fn absent_filter_never_invokes_the_converter() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let provider = list_provider().with_convert_filter(move |year: &u16| {
        seen.fetch_add(1, Ordering::SeqCst);
        born_since(*year)
    });

    assert_eq!(provider.count(&Query::new()).unwrap(), 4);
    assert_eq!(provider.fetch(&Query::new()).unwrap().count(), 4);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert_eq!(provider.count(&Query::with_filter(1743)).unwrap(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn failing_converter_surfaces_like_a_backend_failure() {
    let provider = list_provider()
        .with_try_convert_filter(|year: &String| year.parse::<u16>().map(born_since));

    let err = provider
        .count(&Query::with_filter("seventeen".to_string()))
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::Conversion);
    assert!(err.source_as::<ParseIntError>().is_some());

    let fetch_err: ProviderError = provider
        .fetch(&Query::with_filter("x".to_string()))
        .err()
        .unwrap();
    assert_eq!(fetch_err.class, ErrorClass::Conversion);

    assert_eq!(provider.count(&Query::with_filter("1750".to_string())).unwrap(), 1);
}

#[test]
fn wrappers_delegate_identity_listeners_and_sort_capability() {
    let parent = Arc::new(list_provider());
    let wrapped = Arc::clone(&parent).with_fixed_filter(born_before(1800));
    let hits = Arc::new(AtomicUsize::new(0));

    let seen = Arc::clone(&hits);
    let registration = wrapped.on_change(move |_: &DataChangeEvent<'_, President>| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    parent.refresh_all();
    wrapped.refresh_all();

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert!(registration.remove());

    let item = President::new(9, "Monroe", 1758);
    assert_eq!(wrapped.id(&item), parent.id(&item));
    assert!(wrapped.supports_sort_key("born"));
    assert!(!wrapped.supports_sort_key("party"));
}

#[test]
fn wrapping_never_mutates_the_parent() {
    let parent = Arc::new(list_provider());
    let _fixed = Arc::clone(&parent).with_fixed_filter(born_before(1740));
    let _converted = Arc::clone(&parent).with_convert_filter(|year: &u16| born_since(*year));

    assert_eq!(parent.count(&Query::new()).unwrap(), 4);
    assert!(parent.filter().is_none());
}

#[test]
fn configurable_filter_replaces_and_refreshes() {
    let configurable = list_provider().with_configurable_filter();
    let refreshes = Arc::new(AtomicUsize::new(0));

    let seen = Arc::clone(&refreshes);
    configurable.on_change(move |event: &DataChangeEvent<'_, President>| {
        if event.is_refresh_all() {
            seen.fetch_add(1, Ordering::SeqCst);
        }
    });

    assert_eq!(configurable.count(&Query::new()).unwrap(), 4);

    configurable.set_filter(Some(born_before(1740)));
    assert_eq!(configurable.count(&Query::new()).unwrap(), 2);
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);

    configurable.set_filter(None);
    assert_eq!(configurable.count(&Query::new()).unwrap(), 4);
    assert_eq!(refreshes.load(Ordering::SeqCst), 2);
    assert!(configurable.inner().filter().is_none());
}

#[test]
fn configurable_combiner_merges_query_and_configured_filters() {
    let provider = list_provider().with_configurable_filter_combiner(
        |query: Option<&String>, configured: Option<&u16>| {
            let text = query.map(|needle| {
                let needle = needle.to_lowercase();
                Predicate::new(move |p: &President| p.name.to_lowercase().contains(&needle))
            });
            let year = configured.map(|year| born_since(*year));

            Predicate::and_optional(text.as_ref(), year.as_ref())
        },
    );

    assert_eq!(provider.count(&Query::with_filter("son".to_string())).unwrap(), 2);

    provider.set_filter(Some(1750));
    assert_eq!(provider.count(&Query::with_filter("son".to_string())).unwrap(), 1);
    assert_eq!(provider.count(&Query::new()).unwrap(), 1);
    assert_eq!(provider.configured_filter(), Some(1750));
}

///
/// PROPERTIES
///

fn fixture(items: Vec<(u32, u16)>) -> ListDataProvider<President> {
    ListDataProvider::new(
        items
            .into_iter()
            .map(|(id, born)| President::new(id, &format!("p{id}"), born))
            .collect(),
    )
    .with_sortable_property("born", |p: &President| p.born)
}

proptest! {
    #[test]
    fn converted_provider_matches_direct_call(
        items in prop::collection::vec((0u32..40, 1700u16..1800), 0..20),
        year in 1700u16..1800,
        offset in 0u32..25,
        limit in 1u32..25,
        descending in any::<bool>(),
    ) {
        let direct = fixture(items);
        let converted = direct.clone().with_convert_filter(|year: &u16| born_since(*year));
        let order = if descending {
            QuerySortOrder::desc("born")
        } else {
            QuerySortOrder::asc("born")
        };

        let via_wrapper = Query::builder()
            .window(offset, limit)
            .sort(order.clone())
            .filter(year)
            .build()
            .unwrap();
        let via_parent = Query::builder()
            .window(offset, limit)
            .sort(order)
            .filter(born_since(year))
            .build()
            .unwrap();

        prop_assert_eq!(
            converted.count(&via_wrapper).unwrap(),
            direct.count(&via_parent).unwrap()
        );
        let left: Vec<_> = converted.fetch(&via_wrapper).unwrap().collect();
        let right: Vec<_> = direct.fetch(&via_parent).unwrap().collect();
        prop_assert_eq!(left, right);
    }
}
