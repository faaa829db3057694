//! Crash recovery integration test
//!
//! Tests that the store recovers users, friend lists and the id sequence
//! after a simulated process interruption.

use friendgraph::{GraphStore, OpContext, StoreConfig};
use tempfile::TempDir;

#[test]
fn test_crash_recovery_with_wal() {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig::rocksdb(temp_dir.path().join("crash_recovery.db"));

    // Phase 1: Create users and edges WITHOUT calling flush()
    // This simulates a process that crashes before a clean shutdown
    let user_ids = {
        let store = GraphStore::open(&config).unwrap();
        let ctx = OpContext::background();

        let user_ids: Vec<_> = (0..100)
            .map(|i| store.create_user(&ctx, &format!("user_{i}"), i).unwrap())
            .collect();

        for pair in user_ids.windows(2) {
            store.add_friend(&ctx, pair[0], pair[1]).unwrap();
        }

        // Drop store without close()
        user_ids
    };

    // Phase 2: Reopen and verify data is recovered
    // RocksDB's WAL should ensure all committed writes are recovered
    let store = GraphStore::open(&config).unwrap();
    let ctx = store.context();

    assert_eq!(store.user_count(&ctx).unwrap(), 100, "All users should be recovered");
    assert_eq!(store.last_issued_id(&ctx).unwrap(), Some(100));

    for (i, id) in user_ids.iter().enumerate() {
        let user = store.get_user(&ctx, *id).unwrap();
        assert_eq!(user.name, format!("user_{i}"));
        assert_eq!(user.age, i as i64);
        if i > 0 {
            assert_eq!(user.friends, vec![user_ids[i - 1]]);
        }
    }
}

#[test]
fn test_partial_delete_recovery() {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig::rocksdb(temp_dir.path().join("partial_delete.db"));

    // Phase 1: Build a small graph and flush it
    {
        let store = GraphStore::open(&config).unwrap();
        let ctx = store.context();
        for name in ["Alice", "Bob", "Carol"] {
            store.create_user(&ctx, name, 30).unwrap();
        }
        store.add_friend(&ctx, 1, 2).unwrap();
        store.add_friend(&ctx, 1, 3).unwrap();
        store.close().unwrap();
    }

    // Phase 2: Delete a user, simulate crash
    {
        let store = GraphStore::open(&config).unwrap();
        let ctx = store.context();
        assert_eq!(store.delete_user(&ctx, 1).unwrap(), "Alice");
    }

    // Phase 3: Both the delete and the scrub are durable
    let store = GraphStore::open(&config).unwrap();
    let ctx = store.context();
    assert_eq!(store.user_count(&ctx).unwrap(), 2);
    assert!(store.get_user(&ctx, 2).unwrap().friends.is_empty());
    assert!(store.get_user(&ctx, 3).unwrap().friends.is_empty());
    assert_eq!(store.create_user(&ctx, "Dave", 22).unwrap(), 4);
}
