//! No-lost-updates: the counter store's core obligation under
//! concurrent writers.

use chatfight_core::{
    CounterKey, CounterStore, Database, EntityKey, Scope, WindowKind, WindowManager,
};
use std::thread;

fn shared_store() -> (tempfile::TempDir, CounterStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("counters.sqlite3");
    let store = CounterStore::new(Database::open(&path).expect("open db"));
    (dir, store)
}

fn key_for(user: i64) -> CounterKey {
    let windows = WindowManager::utc();
    let now = "2026-08-28T12:00:00Z".parse().expect("instant");
    CounterKey {
        scope: Scope::Group(-100),
        window: WindowKind::Day,
        bucket: windows.bucket_key(WindowKind::Day, now),
        entity: EntityKey::User(user),
    }
}

#[test]
fn concurrent_increments_to_one_key_all_land() {
    let (_dir, store) = shared_store();
    let key = key_for(1);
    store.increment(&key, 5).expect("seed");

    let threads: u64 = 8;
    let per_thread: u64 = 50;
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let store = store.clone();
            let key = key.clone();
            thread::spawn(move || {
                for _ in 0..per_thread {
                    store.increment(&key, 1).expect("increment");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("join thread");
    }

    assert_eq!(store.get(&key).expect("get"), 5 + threads * per_thread);
}

#[test]
fn concurrent_increments_to_distinct_keys_stay_isolated() {
    let (_dir, store) = shared_store();

    let handles: Vec<_> = (0..4)
        .map(|user| {
            let store = store.clone();
            thread::spawn(move || {
                let key = key_for(user);
                for _ in 0..=user {
                    store.increment(&key, 1).expect("increment");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("join thread");
    }

    for user in 0..4 {
        assert_eq!(store.get(&key_for(user)).expect("get"), u64::try_from(user).expect("cast") + 1);
    }
}
