//! Concurrency integration test
//!
//! Tests that a shared store hands out distinct ids and never duplicates an
//! edge when called from many threads at once.

use friendgraph::{GraphError, GraphStore, OpContext};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;

#[test]
fn test_concurrent_create_user_ids_are_distinct() {
    let store = Arc::new(GraphStore::in_memory());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let ctx = OpContext::background();
                barrier.wait();
                (0..50)
                    .map(|i| {
                        store
                            .create_user(&ctx, &format!("user_{t}_{i}"), 20)
                            .unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all_ids = HashSet::new();
    for handle in handles {
        let ids = handle.join().unwrap();
        // Each thread sees its own ids strictly increasing
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        for id in ids {
            assert!(all_ids.insert(id), "id {id} issued twice");
        }
    }

    let ctx = OpContext::background();
    assert_eq!(all_ids.len(), THREADS * 50);
    assert_eq!(store.user_count(&ctx).unwrap(), THREADS * 50);
    assert_eq!(store.last_issued_id(&ctx).unwrap(), Some((THREADS * 50) as u64));
}

#[test]
fn test_racing_add_friend_records_one_edge() {
    let store = Arc::new(GraphStore::in_memory());
    let ctx = OpContext::background();
    let source = store.create_user(&ctx, "Alice", 30).unwrap();
    let target = store.create_user(&ctx, "Bob", 25).unwrap();

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.add_friend(&OpContext::background(), source, target)
            })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(()) => succeeded += 1,
            Err(GraphError::FriendshipAlreadyExists { .. }) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(store.get_user(&ctx, target).unwrap().friends, vec![source]);
}

#[test]
fn test_concurrent_age_updates_do_not_lose_friend_edges() {
    let store = Arc::new(GraphStore::in_memory());
    let ctx = OpContext::background();
    let target = store.create_user(&ctx, "Hub", 40).unwrap();
    let sources: Vec<_> = (0..THREADS)
        .map(|i| store.create_user(&ctx, &format!("spoke_{i}"), 20).unwrap())
        .collect();

    let handles: Vec<_> = sources
        .iter()
        .enumerate()
        .map(|(i, &source)| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let ctx = OpContext::background();
                store.add_friend(&ctx, source, target).unwrap();
                store.update_age(&ctx, target, 40 + i as i64).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let hub = store.get_user(&ctx, target).unwrap();
    let friends: HashSet<_> = hub.friends.iter().copied().collect();
    assert_eq!(friends, sources.iter().copied().collect());
    assert_eq!(hub.friends.len(), THREADS);
}
