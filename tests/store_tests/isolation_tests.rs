//! Isolation and Concurrency Tests
//!
//! These tests verify:
//! - Readers keep their snapshot across later commits (same and other threads)
//! - A commit's changes appear all at once to new readers
//! - Write transactions on one table are mutually exclusive
//! - Block / FailFast / Timeout writer policies
//! - Writers on different tables do not contend

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use petstore::record::pet_schema;
use petstore::{
    FieldKind, FieldValue, IndexSchema, Pet, Schema, Store, StoreError, TableSchema, WritePolicy,
    PRIMARY_INDEX,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn id(v: i64) -> FieldValue {
    FieldValue::Int(v)
}

fn seeded_store(policy: WritePolicy) -> Arc<Store<Pet>> {
    let store = Store::open_with_policy(pet_schema(), policy).unwrap();
    let mut txn = store.begin_write("pet").unwrap();
    txn.insert(Pet::new(1, "Rex")).unwrap();
    txn.commit();
    Arc::new(store)
}

fn name_at(store: &Store<Pet>, key: i64) -> Option<String> {
    store
        .begin_read("pet")
        .unwrap()
        .get(PRIMARY_INDEX, &id(key))
        .ok()
        .and_then(|pet| pet.name.clone())
}

// =============================================================================
// Snapshot Isolation Tests
// =============================================================================

#[test]
fn test_reader_keeps_snapshot_after_commit() {
    let store = seeded_store(WritePolicy::Block);
    let reader = store.begin_read("pet").unwrap();

    let mut txn = store.begin_write("pet").unwrap();
    txn.replace(&id(1), Pet::new(1, "Rex II")).unwrap();
    txn.insert(Pet::new(2, "Fido")).unwrap();
    txn.commit();

    // Old reader: pre-commit view for every call
    assert_eq!(reader.get(PRIMARY_INDEX, &id(1)).unwrap().name.as_deref(), Some("Rex"));
    assert!(reader.get(PRIMARY_INDEX, &id(2)).is_err());
    assert_eq!(reader.len(), 1);
    assert_eq!(reader.version(), 1);

    // New reader: post-commit view
    assert_eq!(name_at(&store, 1).as_deref(), Some("Rex II"));
    assert_eq!(name_at(&store, 2).as_deref(), Some("Fido"));
}

#[test]
fn test_reader_snapshot_survives_commit_on_other_thread() {
    let store = seeded_store(WritePolicy::Block);
    let reader = store.begin_read("pet").unwrap();

    let writer_store = Arc::clone(&store);
    thread::spawn(move || {
        let mut txn = writer_store.begin_write("pet").unwrap();
        txn.delete(&id(1)).unwrap();
        txn.commit();
    })
    .join()
    .unwrap();

    assert_eq!(reader.get(PRIMARY_INDEX, &id(1)).unwrap().name.as_deref(), Some("Rex"));
    assert_eq!(name_at(&store, 1), None);
}

#[test]
fn test_reader_never_sees_uncommitted_writes() {
    let store = seeded_store(WritePolicy::Block);

    let mut txn = store.begin_write("pet").unwrap();
    txn.insert(Pet::new(2, "Fido")).unwrap();

    let reader = store.begin_read("pet").unwrap();
    assert!(reader.get(PRIMARY_INDEX, &id(2)).is_err());

    txn.commit();
    assert!(reader.get(PRIMARY_INDEX, &id(2)).is_err());
    assert!(store.begin_read("pet").unwrap().get(PRIMARY_INDEX, &id(2)).is_ok());
}

#[test]
fn test_concurrent_readers_see_whole_commits_only() {
    const BATCH: i64 = 20;
    const ROUNDS: i64 = 50;

    let store = Arc::new(Store::<Pet>::open(pet_schema()).unwrap());
    let done = Arc::new(AtomicBool::new(false));

    // Each commit inserts a full batch; readers must always see a multiple of BATCH
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut observations = 0;
                while !done.load(Ordering::Acquire) {
                    let txn = store.begin_read("pet").unwrap();
                    let len = txn.len() as i64;
                    assert_eq!(len % BATCH, 0, "partial commit visible: {} records", len);
                    assert_eq!(txn.version() as i64 * BATCH, len);
                    assert_eq!(txn.records().len() as i64, len);
                    observations += 1;
                }
                observations
            })
        })
        .collect();

    for round in 0..ROUNDS {
        let mut txn = store.begin_write("pet").unwrap();
        for i in 0..BATCH {
            txn.insert(Pet::new(round * BATCH + i, "batch")).unwrap();
        }
        txn.commit();
    }
    done.store(true, Ordering::Release);

    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }
    assert_eq!(store.begin_read("pet").unwrap().len() as i64, BATCH * ROUNDS);
}

// =============================================================================
// Writer Exclusion Tests
// =============================================================================

#[test]
fn test_second_writer_blocks_until_first_commits() {
    let store = seeded_store(WritePolicy::Block);
    let mut first = store.begin_write("pet").unwrap();
    first.insert(Pet::new(2, "Fido")).unwrap();

    let (started_tx, started_rx) = mpsc::channel();
    let (acquired_tx, acquired_rx) = mpsc::channel();
    let second_store = Arc::clone(&store);
    let handle = thread::spawn(move || {
        started_tx.send(()).unwrap();
        let txn = second_store.begin_write("pet").unwrap();
        // Started from the state the first writer committed
        let seen = txn.get(PRIMARY_INDEX, &id(2)).is_ok();
        acquired_tx.send(seen).unwrap();
    });

    started_rx.recv().unwrap();
    assert!(acquired_rx.recv_timeout(Duration::from_millis(100)).is_err());

    first.commit();
    let seen = acquired_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(seen);
    handle.join().unwrap();
}

#[test]
fn test_blocked_writer_wakes_on_abort() {
    let store = seeded_store(WritePolicy::Block);
    let first = store.begin_write("pet").unwrap();

    let second_store = Arc::clone(&store);
    let handle = thread::spawn(move || {
        let txn = second_store.begin_write("pet").unwrap();
        txn.version()
    });

    thread::sleep(Duration::from_millis(50));
    first.abort();
    assert_eq!(handle.join().unwrap(), 1);
}

#[test]
fn test_fail_fast_policy_returns_busy() {
    let store = seeded_store(WritePolicy::FailFast);
    let first = store.begin_write("pet").unwrap();

    let err = store.begin_write("pet").unwrap_err();
    assert!(matches!(err, StoreError::Busy { ref table } if table == "pet"));
    assert!(err.is_retryable());

    // Readers are unaffected by the active writer
    assert_eq!(name_at(&store, 1).as_deref(), Some("Rex"));

    first.abort();
    assert!(store.begin_write("pet").is_ok());
}

#[test]
fn test_timeout_policy_gives_up_after_deadline() {
    let store = seeded_store(WritePolicy::Timeout { ms: 50 });
    let _first = store.begin_write("pet").unwrap();

    let started = Instant::now();
    let err = store.begin_write("pet").unwrap_err();
    assert!(matches!(err, StoreError::Busy { .. }));
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[test]
fn test_timeout_policy_acquires_when_released_in_time() {
    let store = seeded_store(WritePolicy::Timeout { ms: 5000 });
    let first = store.begin_write("pet").unwrap();

    let second_store = Arc::clone(&store);
    let handle = thread::spawn(move || second_store.begin_write("pet").map(|txn| txn.version()));

    thread::sleep(Duration::from_millis(20));
    first.commit();
    assert_eq!(handle.join().unwrap().unwrap(), 1);
}

#[test]
fn test_concurrent_writers_serialize_without_lost_updates() {
    const THREADS: usize = 8;
    const PER_THREAD: i64 = 25;

    let store = Arc::new(Store::<Pet>::open(pet_schema()).unwrap());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..PER_THREAD {
                    let mut txn = store.begin_write("pet").unwrap();
                    let key = txn.next_int_key();
                    txn.insert(Pet::new(key, format!("t{}-{}", t, i))).unwrap();
                    txn.commit();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let read = store.begin_read("pet").unwrap();
    let total = THREADS as i64 * PER_THREAD;
    assert_eq!(read.len() as i64, total);
    assert_eq!(read.version() as i64, total);
    assert_eq!(read.next_int_key(), total + 1);
}

#[test]
fn test_writers_on_different_tables_do_not_contend() {
    let table = |name: &str| {
        TableSchema::new(name)
            .field("id", FieldKind::Int)
            .field("name", FieldKind::Str)
            .index(IndexSchema::new("id", "id").unique())
    };
    let schema = Schema::new().table(table("dog")).table(table("cat"));
    let store = Store::<Pet>::open_with_policy(schema, WritePolicy::FailFast).unwrap();

    let mut dogs = store.begin_write("dog").unwrap();
    let mut cats = store.begin_write("cat").unwrap();
    dogs.insert(Pet::new(1, "Rex")).unwrap();
    cats.insert(Pet::new(1, "Tom")).unwrap();
    dogs.commit();
    cats.commit();

    assert_eq!(
        store.begin_read("cat").unwrap().get(PRIMARY_INDEX, &id(1)).unwrap().name.as_deref(),
        Some("Tom")
    );
    assert_eq!(
        store.begin_read("dog").unwrap().get(PRIMARY_INDEX, &id(1)).unwrap().name.as_deref(),
        Some("Rex")
    );
}
