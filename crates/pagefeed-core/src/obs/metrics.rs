use crate::obs::sink::ProviderKind;
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for provider operations.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct EventState {
    pub ops: EventOps,
    pub providers: BTreeMap<String, ProviderCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Entrypoints
    pub fetch_calls: u64,
    pub count_calls: u64,

    // Rows materialized into fetch results
    pub rows_fetched: u64,

    // Failures surfaced to callers
    pub fetch_errors: u64,
    pub count_errors: u64,

    // Invalidation channel
    pub refresh_all: u64,
    pub refresh_item: u64,
    pub listener_calls: u64,
}

///
/// ProviderCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ProviderCounters {
    pub fetch_calls: u64,
    pub count_calls: u64,
    pub rows_fetched: u64,
    pub errors: u64,
}

///
/// EventReport
/// Point-in-time snapshot of the counters on the calling thread.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub providers: BTreeMap<String, ProviderCounters>,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Per-provider counter entry, created on first use.
pub(crate) fn provider_entry(state: &mut EventState, kind: ProviderKind) -> &mut ProviderCounters {
    state.providers.entry(kind.to_string()).or_default()
}

/// Reset all counters (useful in tests).
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

#[must_use]
pub(crate) fn report() -> EventReport {
    EVENT_STATE.with(|m| {
        let state = m.borrow();

        EventReport {
            ops: state.ops.clone(),
            providers: state.providers.clone(),
        }
    })
}
