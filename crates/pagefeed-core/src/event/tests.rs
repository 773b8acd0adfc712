use super::*;
use parking_lot::Mutex;
use std::sync::Arc;

fn recorder(log: &Arc<Mutex<Vec<String>>>, name: &'static str) -> Arc<ListenerFn<u32>> {
    let log = Arc::clone(log);

    Arc::new(move |event: &DataChangeEvent<'_, u32>| {
        let entry = match event {
            DataChangeEvent::RefreshAll => format!("{name}:all"),
            DataChangeEvent::RefreshItem { item, .. } => format!("{name}:item:{item}"),
        };
        log.lock().push(entry);
    })
}

#[test]
fn emit_calls_listeners_once_in_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let set = ListenerSet::new();
    set.add(recorder(&log, "first"));
    set.add(recorder(&log, "second"));

    let called = set.emit(&DataChangeEvent::RefreshAll);

    assert_eq!(called, 2);
    assert_eq!(*log.lock(), vec!["first:all", "second:all"]);
}

#[test]
fn removed_listener_is_not_called_and_remove_is_idempotent() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let set = ListenerSet::new();
    let first = set.add(recorder(&log, "first"));
    set.add(recorder(&log, "second"));

    assert!(first.remove());
    assert!(!first.remove());

    let item = 7;
    set.emit(&DataChangeEvent::RefreshItem {
        item: &item,
        key: ItemKey::Uint(7),
    });

    assert_eq!(*log.lock(), vec!["second:item:7"]);
    assert_eq!(set.len(), 1);
}

#[test]
fn listener_added_during_emit_waits_for_next_round() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let set: ListenerSet<u32> = ListenerSet::new();

    let inner_set = set.clone();
    let inner_log = Arc::clone(&log);
    set.add(Arc::new(move |_: &DataChangeEvent<'_, u32>| {
        inner_log.lock().push("outer".to_string());
        if inner_set.len() == 1 {
            inner_set.add(recorder(&inner_log, "late"));
        }
    }));

    set.emit(&DataChangeEvent::RefreshAll);
    assert_eq!(*log.lock(), vec!["outer"]);

    set.emit(&DataChangeEvent::RefreshAll);
    assert_eq!(*log.lock(), vec!["outer", "outer", "late:all"]);
}

#[test]
fn registration_does_not_keep_listener_set_alive() {
    let set: ListenerSet<u32> = ListenerSet::new();
    let registration = set.add(Arc::new(|_: &DataChangeEvent<'_, u32>| {}));
    drop(set);

    assert!(!registration.remove());
}

#[test]
fn event_key_is_only_present_for_item_events() {
    let item = 1_u32;
    let event = DataChangeEvent::RefreshItem {
        item: &item,
        key: ItemKey::Uint(1),
    };

    assert_eq!(event.key(), Some(&ItemKey::Uint(1)));
    assert!(!event.is_refresh_all());
    assert_eq!(DataChangeEvent::<u32>::RefreshAll.key(), None);
}
