mod common;

use common::CountingStore;
use marketplace_core::{ItemPatch, ItemService, NewItem, SqliteItemStore};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn assert_coherent(names: &[String], expected_len: usize) {
    assert_eq!(names.len(), expected_len, "snapshot truncated: {names:?}");
    let unique: HashSet<&String> = names.iter().collect();
    assert_eq!(unique.len(), names.len(), "snapshot has duplicates: {names:?}");
}

#[test]
fn parallel_misses_each_return_a_full_snapshot() {
    let service = ItemService::new(CountingStore::with_find_delay(Duration::from_millis(20)));
    let drafts: Vec<NewItem> = (0..25).map(|n| NewItem::new(format!("item-{n}"))).collect();
    service.create_many(&drafts).unwrap();

    let readers = 8;
    let barrier = Barrier::new(readers);
    let snapshots: Vec<Vec<String>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..readers)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    let snapshot = service.list().unwrap();
                    snapshot.iter().map(|item| item.name.clone()).collect()
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    for names in &snapshots {
        assert_coherent(names, drafts.len());
    }
    assert!(service.store().find_calls() >= 1);
    assert!(service.store().find_calls() <= readers);
    assert!(service.cache().is_populated());
}

#[test]
fn list_after_completed_write_never_returns_older_snapshot() {
    let service = ItemService::new(CountingStore::with_find_delay(Duration::from_millis(2)));
    let ids = service.create_many(&[NewItem::new("v0")]).unwrap();
    let id = ids[0].to_string();

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..50 {
                    let snapshot = service.list().unwrap();
                    assert_eq!(snapshot.len(), 1);
                }
            });
        }

        scope.spawn(|| {
            for version in 1..=30 {
                let name = format!("v{version}");
                service.update(&id, &ItemPatch::new().name(name.clone())).unwrap();

                let seen = service.list().unwrap()[0].name.clone();
                let seen_version: u32 = seen.trim_start_matches('v').parse().unwrap();
                assert!(
                    seen_version >= version,
                    "stale read after write: wrote {name}, listed {seen}"
                );
            }
        });
    });

    assert_eq!(service.list().unwrap()[0].name, "v30");
}

#[test]
fn concurrent_batches_all_land_with_distinct_ids() {
    let service = ItemService::new(CountingStore::new());
    let writers = 6;
    let per_batch = 10;

    let all_ids: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..writers)
            .map(|writer| {
                let service = &service;
                scope.spawn(move || {
                    let drafts: Vec<NewItem> = (0..per_batch)
                        .map(|n| NewItem::new(format!("w{writer}-{n}")))
                        .collect();
                    let ids = service.create_many(&drafts).unwrap();
                    service.list().unwrap();
                    ids
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(all_ids.iter().collect::<HashSet<_>>().len(), writers * per_batch);
    let listed = service.list().unwrap();
    assert_eq!(listed.len(), writers * per_batch);
}

#[test]
fn sqlite_backed_service_is_shareable_across_threads() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteItemStore::open(dir.path().join("items.db")).unwrap();
    let service = Arc::new(ItemService::new(store));
    service
        .create_many(&[NewItem::new("A"), NewItem::new("B")])
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|n| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                service
                    .create_many(&[NewItem::new(format!("t{n}"))])
                    .unwrap();
                service.list().unwrap().len()
            })
        })
        .collect();
    for handle in handles {
        let seen = handle.join().unwrap();
        assert!((3..=6).contains(&seen));
    }

    let names: Vec<String> = service
        .list()
        .unwrap()
        .iter()
        .map(|item| item.name.clone())
        .collect();
    assert_coherent(&names, 6);
}
