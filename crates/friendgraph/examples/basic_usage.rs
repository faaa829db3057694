//! Basic usage example for friendgraph
//!
//! This example demonstrates:
//! - Opening a store from a JSON config
//! - Creating users and friend edges
//! - Querying friend lists and deleting users

use friendgraph::{ErrorKind, GraphStore, StoreConfig};

fn main() -> friendgraph::Result<()> {
    // Use {"kind": "rocksdb", "path": "./example.db"} for a persistent store
    let config = StoreConfig::from_json(
        r#"{"backend": {"kind": "memory"}, "operation_timeout": 1}"#,
    )?;
    let store = GraphStore::open(&config)?;
    let ctx = store.context();

    println!("Creating a small friend graph...\n");

    let alice = store.create_user(&ctx, "Alice", 30)?;
    println!("✓ Created user Alice (ID: {alice})");
    let bob = store.create_user(&ctx, "Bob", 25)?;
    println!("✓ Created user Bob (ID: {bob})");
    let carol = store.create_user(&ctx, "Carol", 41)?;
    println!("✓ Created user Carol (ID: {carol})");

    // Edges are directional: Alice appears in Bob's list only
    store.add_friend(&ctx, alice, bob)?;
    store.add_friend(&ctx, carol, bob)?;
    store.add_friend(&ctx, bob, alice)?;
    println!("✓ Added friend edges\n");

    match store.add_friend(&ctx, alice, bob) {
        Err(e) if e.kind() == ErrorKind::FriendshipAlreadyExists => println!("✗ {e}"),
        other => other?,
    }

    store.update_age(&ctx, bob, 26)?;

    let friends = store.get_friends(&ctx, bob)?;
    println!("Bob's friends:");
    for friend in &friends {
        println!("  - {} ({}), id {}", friend.name, friend.age, friend.id);
    }

    let name = store.delete_user(&ctx, alice)?;
    println!("\n✓ Deleted {name}");

    let bob_record = store.get_user(&ctx, bob)?;
    println!("Bob's friend ids after delete: {:?}", bob_record.friends);

    if let Err(e) = store.get_friends(&ctx, alice) {
        println!("✗ {e}");
    }

    store.close()
}
