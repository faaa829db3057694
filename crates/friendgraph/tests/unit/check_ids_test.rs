//! Unit tests for existence validation (check_ids).

use friendgraph::{GraphError, GraphStore};

fn store_with_users(n: usize) -> GraphStore {
    let store = GraphStore::in_memory();
    let ctx = store.context();
    for i in 0..n {
        store.create_user(&ctx, &format!("user_{i}"), 20).unwrap();
    }
    store
}

#[test]
fn test_all_present() {
    let store = store_with_users(3);
    store.check_ids(&store.context(), &[1, 2, 3]).unwrap();
}

#[test]
fn test_empty_request_passes() {
    let store = store_with_users(0);
    store.check_ids(&store.context(), &[]).unwrap();
}

#[test]
fn test_missing_reports_full_request_and_missing_ids() {
    let store = store_with_users(2);

    let err = store.check_ids(&store.context(), &[1, 2, 999]).unwrap_err();
    match err {
        GraphError::UndefinedIndexes { requested, missing } => {
            assert_eq!(requested, vec![1, 2, 999]);
            assert_eq!(missing, vec![999]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_display_lists_full_request() {
    let store = store_with_users(2);
    let err = store.check_ids(&store.context(), &[1, 2, 999]).unwrap_err();
    assert_eq!(err.to_string(), "Undefined indexes: [1, 2, 999]");
}

#[test]
fn test_duplicates_collapse_before_counting() {
    let store = store_with_users(1);
    store.check_ids(&store.context(), &[1, 1]).unwrap();
}

#[test]
fn test_duplicate_missing_id_reported_once() {
    let store = store_with_users(1);

    let err = store.check_ids(&store.context(), &[7, 1, 7]).unwrap_err();
    match err {
        GraphError::UndefinedIndexes { requested, missing } => {
            assert_eq!(requested, vec![7, 1, 7]);
            assert_eq!(missing, vec![7]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_deleted_user_is_undefined() {
    let store = store_with_users(2);
    let ctx = store.context();
    store.delete_user(&ctx, 1).unwrap();

    let err = store.check_ids(&ctx, &[1, 2]).unwrap_err();
    assert!(matches!(err, GraphError::UndefinedIndexes { ref missing, .. } if missing == &vec![1]));
}
