//! Stores shared between threads while one of them holds a transaction.

use blogstore_core::{Filter, Query, Record, Store};
use blogstore_testkit::prelude::*;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn tag(title: &str) -> Record {
    Record::new().with("tag_title", title)
}

#[test]
fn open_transaction_does_not_hide_committed_records() {
    let store = TestStore::temporary(tag_schema());
    let tags = store.repository("tag").unwrap();
    let committed = tags.add(tag("committed")).unwrap();

    let (held_tx, held_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let shared: &Store = &store;

    thread::scope(|s| {
        s.spawn(move || {
            let store = shared;
            let tags = store.repository("tag").unwrap();
            let mut txn = store.begin().unwrap();
            tags.add(tag("pending")).unwrap();
            held_tx.send(()).unwrap();
            release_rx.recv().unwrap();
            txn.commit().unwrap();
        });

        let release = release_tx;
        held_rx.recv().unwrap();
        let found = tags.get(&committed).unwrap().expect("committed tag visible");
        assert_eq!(found.opt_str("tag_title").as_deref(), Some("committed"));
        assert_eq!(tags.count().unwrap(), 1);
        let pending = Query::new().filter(Filter::eq("tag_title", "pending"));
        assert!(tags.query(&pending).unwrap().records.is_empty());
        release.send(()).unwrap();
    });

    assert_eq!(tags.count().unwrap(), 2);
}

#[test]
fn second_writer_waits_for_the_open_transaction() {
    let store = TestStore::temporary(tag_schema());
    let tags = store.repository("tag").unwrap();

    let mut txn = store.begin().unwrap();
    tags.add(tag("first")).unwrap();

    thread::scope(|s| {
        let writer = s.spawn(|| {
            let tags = store.repository("tag").unwrap();
            tags.add(tag("second"))
        });

        thread::sleep(Duration::from_millis(100));
        txn.commit().unwrap();
        writer.join().unwrap().unwrap();
    });

    assert_eq!(tags.count().unwrap(), 2);
}
