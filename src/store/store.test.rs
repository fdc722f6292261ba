//! Tests for the record store

use super::*;
use crate::tests::test_util;
use crate::{assert_err, assert_ok};

#[derive(Debug, Clone, PartialEq)]
struct Widget {
    id: RecordId,
    name: String,
}

impl Record for Widget {
    const KIND: &'static str = "widget";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

fn widget(name: &str) -> Widget {
    Widget {
        id: 0,
        name: name.to_string(),
    }
}

#[tokio::test]
async fn insert_assigns_sequential_ids() {
    test_util::setup();
    let store = MemoryStore::new();

    let a = assert_ok!(store.insert(widget("a")).await);
    let b = assert_ok!(store.insert(widget("b")).await);
    let c = assert_ok!(store.insert(widget("c")).await);

    assert_eq!(a.id, 1);
    assert_eq!(b.id, 2);
    assert_eq!(c.id, 3);
}

#[tokio::test]
async fn newest_record_lists_first() {
    test_util::setup();
    let store = MemoryStore::new();

    assert_ok!(store.insert(widget("old")).await);
    assert_ok!(store.insert(widget("new")).await);

    let all = assert_ok!(store.list().await);
    assert_eq!(all[0].name, "new");
    assert_eq!(all[1].name, "old");
}

#[tokio::test]
async fn get_returns_owned_copy() {
    test_util::setup();
    let store = MemoryStore::new();
    let inserted = assert_ok!(store.insert(widget("a")).await);

    let mut copy = assert_ok!(store.get(inserted.id).await);
    copy.name = "mutated".to_string();

    let fresh = assert_ok!(store.get(inserted.id).await);
    assert_eq!(fresh.name, "a");
}

#[tokio::test]
async fn update_replaces_record_and_pins_id() {
    test_util::setup();
    let store = MemoryStore::new();
    let inserted = assert_ok!(store.insert(widget("a")).await);

    // A caller-supplied id in the record body is ignored.
    let mut replacement = widget("b");
    replacement.id = 999;

    let updated = assert_ok!(store.update(inserted.id, replacement).await);
    assert_eq!(updated.id, inserted.id);
    assert_eq!(updated.name, "b");
    assert_eq!(assert_ok!(store.list().await).len(), 1);
}

#[tokio::test]
async fn missing_ids_surface_not_found() {
    test_util::setup();
    let store = MemoryStore::<Widget>::new();

    assert_err!(store.get(42).await);
    assert_err!(store.update(42, widget("x")).await);
    assert_err!(store.delete(42).await);
}

#[tokio::test]
async fn delete_twice_fails_the_second_time() {
    test_util::setup();
    let store = MemoryStore::new();
    let inserted = assert_ok!(store.insert(widget("a")).await);

    assert_ok!(store.delete(inserted.id).await);
    let err = assert_err!(store.delete(inserted.id).await);
    assert!(matches!(err, CrmError::NotFound(_)));
}

#[tokio::test]
async fn highest_id_is_reused_after_delete() {
    test_util::setup();
    let store = MemoryStore::new();

    assert_ok!(store.insert(widget("a")).await);
    let b = assert_ok!(store.insert(widget("b")).await);
    assert_eq!(b.id, 2);

    assert_ok!(store.delete(b.id).await);
    let c = assert_ok!(store.insert(widget("c")).await);
    assert_eq!(c.id, 2);
}

#[tokio::test]
async fn seeded_store_keeps_given_ids() {
    test_util::setup();
    let store = MemoryStore::seeded(vec![
        Widget {
            id: 7,
            name: "seven".to_string(),
        },
        Widget {
            id: 3,
            name: "three".to_string(),
        },
    ]);

    assert_eq!(assert_ok!(store.get(7).await).name, "seven");
    let next = assert_ok!(store.insert(widget("next")).await);
    assert_eq!(next.id, 8);
}

#[tokio::test]
async fn latency_is_bounded_and_resolves() {
    test_util::setup();
    let store = MemoryStore::new().with_latency(1..3);

    let inserted = assert_ok!(store.insert(widget("a")).await);
    assert_eq!(assert_ok!(store.get(inserted.id).await).name, "a");
}
