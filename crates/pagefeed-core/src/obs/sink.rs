//! Metrics sink boundary.
//!
//! Provider logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.

use crate::obs::metrics;
use derive_more::Display;
use std::{cell::RefCell, sync::Arc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Arc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// ProviderKind
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ProviderKind {
    #[display("list")]
    List,
    #[display("backend")]
    Backend,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    Fetch { kind: ProviderKind, rows: u64 },
    RowsStreamed { kind: ProviderKind, rows: u64 },
    FetchFailed { kind: ProviderKind },
    Count { kind: ProviderKind },
    CountFailed { kind: ProviderKind },
    RefreshAll { listeners: u64 },
    RefreshItem { listeners: u64 },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local metrics state.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        metrics::with_state_mut(|m| match event {
            MetricsEvent::Fetch { kind, rows } => {
                m.ops.fetch_calls = m.ops.fetch_calls.saturating_add(1);
                m.ops.rows_fetched = m.ops.rows_fetched.saturating_add(rows);

                let entry = metrics::provider_entry(m, kind);
                entry.fetch_calls = entry.fetch_calls.saturating_add(1);
                entry.rows_fetched = entry.rows_fetched.saturating_add(rows);
            }

            MetricsEvent::RowsStreamed { kind, rows } => {
                m.ops.rows_fetched = m.ops.rows_fetched.saturating_add(rows);

                let entry = metrics::provider_entry(m, kind);
                entry.rows_fetched = entry.rows_fetched.saturating_add(rows);
            }

            MetricsEvent::FetchFailed { kind } => {
                m.ops.fetch_calls = m.ops.fetch_calls.saturating_add(1);
                m.ops.fetch_errors = m.ops.fetch_errors.saturating_add(1);

                let entry = metrics::provider_entry(m, kind);
                entry.fetch_calls = entry.fetch_calls.saturating_add(1);
                entry.errors = entry.errors.saturating_add(1);
            }

            MetricsEvent::Count { kind } => {
                m.ops.count_calls = m.ops.count_calls.saturating_add(1);

                let entry = metrics::provider_entry(m, kind);
                entry.count_calls = entry.count_calls.saturating_add(1);
            }

            MetricsEvent::CountFailed { kind } => {
                m.ops.count_calls = m.ops.count_calls.saturating_add(1);
                m.ops.count_errors = m.ops.count_errors.saturating_add(1);

                let entry = metrics::provider_entry(m, kind);
                entry.count_calls = entry.count_calls.saturating_add(1);
                entry.errors = entry.errors.saturating_add(1);
            }

            MetricsEvent::RefreshAll { listeners } => {
                m.ops.refresh_all = m.ops.refresh_all.saturating_add(1);
                m.ops.listener_calls = m.ops.listener_calls.saturating_add(listeners);
            }

            MetricsEvent::RefreshItem { listeners } => {
                m.ops.refresh_item = m.ops.refresh_item.saturating_add(1);
                m.ops.listener_calls = m.ops.listener_calls.saturating_add(listeners);
            }
        });
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let override_sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match override_sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state of the calling thread.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state on the calling thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override on this thread.
/// The previous sink is restored on every exit path, including unwind.
pub fn with_metrics_sink<R>(sink: Arc<dyn MetricsSink>, f: impl FnOnce() -> R) -> R {
    struct Guard(Option<Arc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///
