use pretty_assertions::assert_eq;
use std::sync::Arc;
use tablekey_codec::OpaqueIdCodec;
use tablekey_entity::{
    Entity, Error, ErrorKind, MemoryEngine, PrimaryKey, StorageEngine, StorageError,
};
use tablekey_schema::{Attribute, Item, KeyDerivation, SchemaBuilder};

fn setup() -> (Entity, Arc<MemoryEngine>) {
    let schema = SchemaBuilder::with_non_key_attributes([
        Attribute::required("userId"),
        Attribute::required("orderId"),
        Attribute::defaulted("status", "open"),
        Attribute::optional("total"),
    ])
    .unwrap()
    .add_partition_key("PK", KeyDerivation::prefixed("USER", ["userId"]))
    .unwrap()
    .add_sort_key("SK", KeyDerivation::prefixed("ORDER", ["orderId"]))
    .unwrap()
    .add_index_keys([("GSI1PK", KeyDerivation::prefixed("STATUS", ["status"]))])
    .unwrap()
    .build();

    let engine = Arc::new(MemoryEngine::new());
    let entity = Entity::new("Order", schema)
        .with_table("app")
        .with_codec(Arc::new(OpaqueIdCodec::with_secret("s3cr3t-salt").unwrap()))
        .with_engine(engine.clone());
    (entity, engine)
}

fn order(user: &str, id: &str) -> Item {
    Item::new().with("userId", user).with("orderId", id)
}

// ── Entity delegation ────────────────────────────────────────────

#[test]
fn put_then_get() {
    let (orders, engine) = setup();

    let key = orders.put(order("u1", "o1").with("total", 30)).unwrap();
    assert_eq!(key.partition_value(), "USER#u1");
    assert_eq!(key.sort_value(), Some("ORDER#o1"));
    assert_eq!(engine.len("app").unwrap(), 1);

    let fetched = orders.get(&order("u1", "o1")).unwrap().unwrap();
    assert_eq!(
        fetched,
        order("u1", "o1").with("total", 30).with("status", "open")
    );
    assert_eq!(orders.get(&order("u1", "o2")).unwrap(), None);
}

#[test]
fn engine_holds_materialized_item() {
    let (orders, engine) = setup();
    let key = orders.put(order("u1", "o1")).unwrap();

    let stored = engine.get("app", &key).unwrap().unwrap();
    assert_eq!(stored.get_str("PK"), Some("USER#u1"));
    assert_eq!(stored.get_str("SK"), Some("ORDER#o1"));
    assert_eq!(stored.get_str("GSI1PK"), Some("STATUS#open"));
}

#[test]
fn get_by_hash_id() {
    let (orders, _) = setup();
    orders.put(order("u1", "o1")).unwrap();

    let id = orders.get_hash_id(&order("u1", "o1")).unwrap();
    let fetched = orders.get_by_hash_id(&id).unwrap().unwrap();
    assert_eq!(fetched.get_str("orderId"), Some("o1"));
}

#[test]
fn update_rederives_touched_index_keys() {
    let (orders, engine) = setup();
    let key = orders.put(order("u1", "o1")).unwrap();

    let updated = orders
        .update(&order("u1", "o1"), Item::new().with("status", "shipped"))
        .unwrap();
    assert_eq!(updated.get_str("status"), Some("shipped"));
    assert!(!updated.contains("GSI1PK"));

    let stored = engine.get("app", &key).unwrap().unwrap();
    assert_eq!(stored.get_str("GSI1PK"), Some("STATUS#shipped"));
}

#[test]
fn update_leaves_untouched_index_keys() {
    let (orders, engine) = setup();
    let key = orders.put(order("u1", "o1")).unwrap();

    orders
        .update(&order("u1", "o1"), Item::new().with("total", 12))
        .unwrap();

    let stored = engine.get("app", &key).unwrap().unwrap();
    assert_eq!(stored.get_str("GSI1PK"), Some("STATUS#open"));
    assert_eq!(stored.get("total"), Some(&serde_json::json!(12)));
}

#[test]
fn update_rejects_derived_key_attributes() {
    let (orders, _) = setup();
    let err = orders
        .update(&order("u1", "o1"), Item::new().with("GSI1PK", "STATUS#x"))
        .unwrap_err();

    assert!(matches!(err, Error::KeyAttributeUpdate(ref name) if name == "GSI1PK"));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn update_rejects_primary_key_dependencies() {
    let (orders, engine) = setup();
    let key = orders.put(order("u1", "o1")).unwrap();

    let err = orders
        .update(&order("u1", "o1"), Item::new().with("userId", "u2"))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::KeyDependencyUpdate { ref key, ref attribute } if key == "PK" && attribute == "userId"
    ));
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = orders
        .update(&order("u1", "o1"), Item::new().with("orderId", "o2"))
        .unwrap_err();
    assert!(matches!(err, Error::KeyDependencyUpdate { ref key, .. } if key == "SK"));

    let stored = engine.get("app", &key).unwrap().unwrap();
    assert_eq!(stored.get_str("userId"), Some("u1"));
    assert_eq!(stored.get_str("orderId"), Some("o1"));
}

#[test]
fn delete_removes_item() {
    let (orders, engine) = setup();
    orders.put(order("u1", "o1")).unwrap();

    orders.delete(&order("u1", "o1")).unwrap();
    assert_eq!(engine.len("app").unwrap(), 0);
    // Deleting again is fine.
    orders.delete(&order("u1", "o1")).unwrap();
}

#[test]
fn batch_get_skips_absent_items() {
    let (orders, _) = setup();
    orders.put(order("u1", "o1")).unwrap();
    orders.put(order("u1", "o3")).unwrap();

    let fetched = orders
        .batch_get(&[order("u1", "o1"), order("u1", "o2"), order("u1", "o3")])
        .unwrap();
    let ids: Vec<&str> = fetched.iter().filter_map(|i| i.get_str("orderId")).collect();
    assert_eq!(ids, ["o1", "o3"]);
}

#[test]
fn transact_put_writes_all_items() {
    let (orders, engine) = setup();
    let keys = orders
        .transact_put(vec![order("u1", "o1"), order("u2", "o1")])
        .unwrap();

    assert_eq!(keys.len(), 2);
    assert_eq!(keys[1].partition_value(), "USER#u2");
    assert_eq!(engine.len("app").unwrap(), 2);
}

#[test]
fn transact_put_rejects_invalid_item_before_writing() {
    let (orders, engine) = setup();
    let err = orders
        .transact_put(vec![order("u1", "o1"), Item::new().with("userId", "u2")])
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DependencyMissing);
    assert_eq!(engine.len("app").unwrap(), 0);
}

#[test]
fn transact_put_rejects_repeated_key() {
    let (orders, engine) = setup();
    let err = orders
        .transact_put(vec![order("u1", "o1"), order("u1", "o1")])
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Storage(StorageError::TransactionRejected(_))
    ));
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert_eq!(engine.len("app").unwrap(), 0);
}

// ── MemoryEngine ─────────────────────────────────────────────────

#[test]
fn engine_rejects_item_without_key_attributes() {
    let engine = MemoryEngine::new();
    let key = PrimaryKey::new("PK", "a");

    let err = engine.put("t", &key, Item::new().with("x", 1)).unwrap_err();
    assert!(matches!(err, StorageError::InvalidData(_)));
    assert_eq!(engine.len("t").unwrap(), 0);
}

#[test]
fn engine_update_upserts() {
    let engine = MemoryEngine::new();
    let key = PrimaryKey::new("PK", "a").with_sort("SK", "b");

    let stored = engine.update("t", &key, Item::new().with("x", 1)).unwrap();
    assert_eq!(stored, key.to_item().with("x", 1));
}

#[test]
fn engine_update_rejects_key_change() {
    let engine = MemoryEngine::new();
    let key = PrimaryKey::new("PK", "a");
    engine.put("t", &key, key.to_item()).unwrap();

    let err = engine
        .update("t", &key, Item::new().with("PK", "b"))
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidData(_)));
    assert_eq!(engine.get("t", &key).unwrap(), Some(key.to_item()));
}

#[test]
fn tables_are_isolated() {
    let engine = MemoryEngine::new();
    let key = PrimaryKey::new("PK", "a");
    engine.put("one", &key, key.to_item()).unwrap();

    assert_eq!(engine.get("two", &key).unwrap(), None);
    assert!(engine.batch_get("two", &[key]).unwrap().is_empty());
}
