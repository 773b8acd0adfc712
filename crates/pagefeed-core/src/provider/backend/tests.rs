use super::*;
use crate::{
    error::ErrorClass,
    event::DataChangeEvent,
    obs::{metrics_report, metrics_reset_all},
    provider::DataProviderExt,
    query::QuerySortOrder,
    test_support::{CallLog, President, backend_provider, names},
};
use parking_lot::Mutex;
use std::{
    fmt, io,
    sync::atomic::{AtomicUsize, Ordering},
};

#[derive(Debug)]
struct ServiceDown {
    code: u16,
}

impl fmt::Display for ServiceDown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service unavailable ({})", self.code)
    }
}

impl std::error::Error for ServiceDown {}

#[test]
fn query_reaches_the_callback_verbatim() {
    let seen = Arc::new(Mutex::new(None));
    let capture = Arc::clone(&seen);

    let provider = BackendDataProvider::<u32, String>::new(
        move |query: &Query<u32, String>| {
            *capture.lock() = Some((
                query.offset(),
                query.limit(),
                query.sort_orders().to_vec(),
                query.filter().cloned(),
            ));
            Ok::<_, io::Error>(vec![7, 8])
        },
        |_: &Query<u32, String>| Ok::<_, io::Error>(2),
    );

    let query = Query::builder()
        .window(40, 20)
        .sort(QuerySortOrder::desc("born"))
        .filter("ad".to_string())
        .build()
        .unwrap();
    let rows = provider.fetch_vec(&query).unwrap();

    assert_eq!(rows, vec![7, 8]);
    assert_eq!(
        seen.lock().clone(),
        Some((
            40,
            Some(20),
            vec![QuerySortOrder::desc("born")],
            Some("ad".to_string())
        ))
    );
    assert!(!provider.is_in_memory());
}

#[test]
fn provider_does_no_local_filtering_sorting_or_paging() {
    let provider = BackendDataProvider::<u32, u32>::new(
        |_: &Query<u32, u32>| Ok::<_, io::Error>(vec![9, 1, 5, 3, 7]),
        |_: &Query<u32, u32>| Ok::<_, io::Error>(5),
    );
    let query = Query::builder()
        .window(0, 2)
        .sort(QuerySortOrder::asc("n"))
        .filter(1)
        .build()
        .unwrap();

    assert_eq!(provider.fetch_vec(&query).unwrap(), vec![9, 1, 5, 3, 7]);
}

#[test]
fn well_behaved_backend_pages_and_counts_symmetrically() {
    let log = CallLog::default();
    let provider = backend_provider(&log);
    let filter = 1735_u16;

    let count = provider.count(&Query::with_filter(filter)).unwrap();

    let mut collected = Vec::new();
    let mut offset = 0;
    while offset < u32::try_from(count).unwrap() {
        let query = Query::builder()
            .window(offset, 2)
            .sort(QuerySortOrder::asc("name"))
            .filter(filter)
            .build()
            .unwrap();
        collected.extend(provider.fetch(&query).unwrap());
        offset += 2;
    }

    assert_eq!(count, 3);
    assert_eq!(names(&collected), vec!["Adams", "Jefferson", "Madison"]);
    assert_eq!(log.counts(), 1);
    assert_eq!(log.fetches(), 2);
}

#[test]
fn symmetric_stub_returns_every_counted_item() {
    let provider = BackendDataProvider::<u32, ()>::new(
        |query: &Query<u32, ()>| {
            Ok::<_, io::Error>(
                vec![1, 2, 3, 4]
                    .into_iter()
                    .skip(query.offset_index())
                    .take(query.limit_count()),
            )
        },
        |_: &Query<u32, ()>| Ok::<_, io::Error>(4),
    );

    let count = provider.count(&Query::new()).unwrap();
    let query = Query::builder().window(0, 10).build().unwrap();
    let rows = provider.fetch_vec(&query).unwrap();

    assert_eq!(count, 4);
    assert_eq!(rows, vec![1, 2, 3, 4]);
}

#[test]
fn asymmetric_callbacks_are_observable_but_not_rejected() {
    // count says four, fetch only ever yields three
    let provider = BackendDataProvider::<u32, ()>::new(
        |query: &Query<u32, ()>| {
            Ok::<_, io::Error>(
                vec![1, 2, 3]
                    .into_iter()
                    .skip(query.offset_index())
                    .take(query.limit_count()),
            )
        },
        |_: &Query<u32, ()>| Ok::<_, io::Error>(4),
    );

    let count = provider.count(&Query::new()).unwrap();
    let query = Query::builder().limit(4).build().unwrap();
    let page = provider.fetch_page(&query).unwrap();

    assert_eq!(count, 4);
    assert_eq!(page.len(), 3);
    assert!(page.is_last());
}

#[test]
fn short_window_is_a_valid_end_signal() {
    let log = CallLog::default();
    let provider = backend_provider(&log);
    let query = Query::builder().window(3, 10).build().unwrap();

    let page = provider.fetch_page(&query).unwrap();

    assert_eq!(names(&page.items), vec!["Madison"]);
    assert!(page.is_last());
}

#[test]
fn fetch_failure_keeps_the_original_error() {
    let provider = BackendDataProvider::<u32, ()>::new(
        |_: &Query<u32, ()>| Err::<Vec<u32>, _>(ServiceDown { code: 503 }),
        |_: &Query<u32, ()>| Ok::<_, ServiceDown>(0),
    );

    let err = provider.fetch(&Query::new()).err().unwrap();

    assert_eq!(err.class, ErrorClass::Backend);
    assert!(err.is_backend());
    assert!(err.message.contains("service unavailable (503)"));
    assert_eq!(err.source_as::<ServiceDown>().map(|e| e.code), Some(503));
}

#[test]
fn count_failure_is_not_turned_into_zero() {
    let provider = BackendDataProvider::<u32, ()>::new(
        |_: &Query<u32, ()>| Ok::<_, io::Error>(Vec::new()),
        |_: &Query<u32, ()>| Err::<usize, _>(io::Error::other("timeout")),
    );

    let err = provider.count(&Query::new()).unwrap_err();

    assert_eq!(err.class, ErrorClass::Backend);
    let source = err.into_source().unwrap();
    assert_eq!(source.to_string(), "timeout");
}

#[test]
fn unknown_sort_key_error_from_the_callback_propagates() {
    let log = CallLog::default();
    let provider = backend_provider(&log);
    let query = Query::builder()
        .sort(QuerySortOrder::asc("party"))
        .build()
        .unwrap();

    let err = provider.fetch(&query).err().unwrap();

    assert!(err.message.contains("unknown sort key 'party'"));
    // backends accept any key at setup time
    assert!(provider.supports_sort_key("party"));
}

#[test]
fn refresh_notifies_every_listener_in_order() {
    let log = CallLog::default();
    let provider = backend_provider(&log);
    let calls = Arc::new(Mutex::new(Vec::new()));

    for tag in ["grid", "combo"] {
        let calls = Arc::clone(&calls);
        provider.on_change(move |event: &DataChangeEvent<'_, President>| {
            calls.lock().push((tag, event.is_refresh_all()));
        });
    }

    provider.refresh_all();

    assert_eq!(*calls.lock(), vec![("grid", true), ("combo", true)]);
    // the provider itself holds no data and re-fetches nothing
    assert_eq!(log.fetches(), 0);
}

#[test]
fn clones_share_callbacks_and_listeners() {
    let hits = Arc::new(AtomicUsize::new(0));
    let provider = BackendDataProvider::<u32, ()>::empty();
    let clone = provider.clone();

    let seen = Arc::clone(&hits);
    provider.on_change(move |_: &DataChangeEvent<'_, u32>| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    clone.refresh_all();

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(clone.count(&Query::new()).unwrap(), 0);
    assert!(clone.fetch_vec(&Query::new()).unwrap().is_empty());
}

#[test]
fn streamed_rows_are_counted_once_consumed() {
    metrics_reset_all();
    let provider = BackendDataProvider::<u32, ()>::new(
        |_: &Query<u32, ()>| Ok::<_, io::Error>(vec![1, 2, 3]),
        |_: &Query<u32, ()>| Ok::<_, io::Error>(3),
    );

    let mut stream = provider.fetch(&Query::new()).unwrap();
    assert_eq!(stream.next(), Some(1));
    assert_eq!(stream.next(), Some(2));
    drop(stream);
    provider.count(&Query::new()).unwrap();

    let report = metrics_report();
    assert_eq!(report.ops.fetch_calls, 1);
    assert_eq!(report.ops.rows_fetched, 2);
    assert_eq!(report.ops.count_calls, 1);
    assert_eq!(report.providers["backend"].rows_fetched, 2);
}
