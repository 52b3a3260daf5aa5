use tablekey_schema::{
    Item, KeyDefinition, KeyPart, KeyRole, RoleDefinition, SchemaDefinition, SchemaError,
};

const ORDERS: &str = r#"
attributes = [
    { name = "userId", required = true },
    { name = "orderId", required = true },
    { name = "status", default = "open" },
]

[[keys]]
name = "PK"
role = "partition"
parts = [{ literal = "USER" }, { attribute = "userId" }]

[[keys]]
name = "SK"
role = "sort"
parts = [{ literal = "ORDER" }, { attribute = "orderId" }]

[[keys]]
name = "GSI1PK"
role = "index"
parts = [{ attribute = "status" }]

[[indexes]]
name = "GSI1"
partition_key = "GSI1PK"
sort_key = "SK"
"#;

fn key(name: &str, role: RoleDefinition, parts: &[&str]) -> KeyDefinition {
    KeyDefinition {
        name: name.into(),
        role,
        parts: parts.iter().map(|p| KeyPart::Attribute(p.to_string())).collect(),
    }
}

fn definition(keys: Vec<KeyDefinition>) -> SchemaDefinition {
    SchemaDefinition::from_json(
        r#"{"attributes":[{"name":"a","required":true},{"name":"b","required":true}]}"#,
    )
    .map(|d| SchemaDefinition { keys, ..d })
    .unwrap()
}

#[test]
fn toml_definition_compiles() {
    let def: SchemaDefinition = toml::from_str(ORDERS).unwrap();
    let schema = def.compile().unwrap();

    let item = Item::new().with("userId", "u1").with("orderId", "o42");
    assert_eq!(schema.derive(&KeyRole::Partition, &item).unwrap(), "USER#u1");
    assert_eq!(schema.derive(&KeyRole::Sort, &item).unwrap(), "ORDER#o42");
    assert_eq!(schema.derive(&KeyRole::index("GSI1PK"), &item).unwrap(), "open");
    assert_eq!(schema.partition_key().dependencies(), ["userId"]);
}

#[test]
fn json_definition_compiles() {
    let def = SchemaDefinition::from_json(
        r#"{
            "attributes": [{"name": "id", "required": true}],
            "keys": [{"name": "PK", "role": "partition", "parts": [{"attribute": "id"}]}]
        }"#,
    )
    .unwrap();
    let schema = def.compile().unwrap();
    assert_eq!(schema.partition_key().name(), "PK");
    assert!(schema.sort_key().is_none());
}

#[test]
fn second_partition_key_rejected() {
    let def = definition(vec![
        key("PK", RoleDefinition::Partition, &["a"]),
        key("PK2", RoleDefinition::Partition, &["b"]),
    ]);
    assert_eq!(
        def.compile().unwrap_err(),
        SchemaError::DuplicatePartitionKey {
            existing: "PK".into(),
            name: "PK2".into(),
        }
    );
}

#[test]
fn sort_key_before_partition_key_rejected() {
    let def = definition(vec![
        key("SK", RoleDefinition::Sort, &["b"]),
        key("PK", RoleDefinition::Partition, &["a"]),
    ]);
    assert_eq!(
        def.compile().unwrap_err(),
        SchemaError::SortKeyBeforePartitionKey("SK".into())
    );
}

#[test]
fn second_sort_key_rejected() {
    let def = definition(vec![
        key("PK", RoleDefinition::Partition, &["a"]),
        key("SK", RoleDefinition::Sort, &["b"]),
        key("SK2", RoleDefinition::Sort, &["a"]),
    ]);
    assert!(matches!(
        def.compile(),
        Err(SchemaError::DuplicateSortKey { .. })
    ));
}

#[test]
fn index_key_before_partition_key_rejected() {
    let def = definition(vec![
        key("GSI1PK", RoleDefinition::Index, &["a"]),
        key("PK", RoleDefinition::Partition, &["a"]),
    ]);
    assert_eq!(
        def.compile().unwrap_err(),
        SchemaError::IndexKeysBeforePartitionKey("GSI1PK".into())
    );
}

#[test]
fn sort_key_after_index_keys_rejected() {
    let def = definition(vec![
        key("PK", RoleDefinition::Partition, &["a"]),
        key("GSI1PK", RoleDefinition::Index, &["a"]),
        key("SK", RoleDefinition::Sort, &["b"]),
    ]);
    assert_eq!(
        def.compile().unwrap_err(),
        SchemaError::SortKeyAfterIndexKeys("SK".into())
    );
}

#[test]
fn missing_partition_key_rejected() {
    let def = definition(vec![]);
    assert_eq!(def.compile().unwrap_err(), SchemaError::MissingPartitionKey);
}

#[test]
fn unknown_index_dependency_rejected() {
    let def = definition(vec![
        key("PK", RoleDefinition::Partition, &["a"]),
        key("GSI1PK", RoleDefinition::Index, &["zzz"]),
    ]);
    assert!(matches!(
        def.compile(),
        Err(SchemaError::UnknownDependency { .. })
    ));
}

#[test]
fn index_descriptor_must_reference_known_attribute() {
    let mut def = definition(vec![key("PK", RoleDefinition::Partition, &["a"])]);
    def.indexes.push(tablekey_schema::Gsi::new("GSI1").with_partition_key("GSI1PK"));
    assert_eq!(
        def.compile().unwrap_err(),
        SchemaError::UnknownIndexAttribute {
            index: "GSI1".into(),
            attribute: "GSI1PK".into(),
        }
    );
}
