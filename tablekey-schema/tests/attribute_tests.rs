use pretty_assertions::assert_eq;
use serde_json::json;
use tablekey_schema::{Attribute, AttributeSchema, Gsi, Item, SchemaError};

// ── Attribute constructors ───────────────────────────────────────

#[test]
fn required_attribute_is_key_eligible() {
    let a = Attribute::required("userId");
    assert!(a.required);
    assert!(!a.has_default());
    assert!(a.is_key_eligible());
}

#[test]
fn defaulted_attribute_is_key_eligible() {
    let a = Attribute::defaulted("status", "open");
    assert!(!a.required);
    assert_eq!(a.default, Some(json!("open")));
    assert!(a.is_key_eligible());
}

#[test]
fn optional_attribute_is_not_key_eligible() {
    assert!(!Attribute::optional("note").is_key_eligible());
}

#[test]
fn attribute_serde_defaults() {
    let a: Attribute = serde_json::from_str(r#"{"name":"note"}"#).unwrap();
    assert_eq!(a, Attribute::optional("note"));

    let json = serde_json::to_string(&Attribute::required("id")).unwrap();
    assert_eq!(json, r#"{"name":"id","required":true}"#);
}

// ── AttributeSchema ──────────────────────────────────────────────

fn schema() -> AttributeSchema {
    AttributeSchema::new([
        Attribute::required("id"),
        Attribute::defaulted("status", "open"),
        Attribute::defaulted("count", 0),
        Attribute::optional("note"),
    ])
    .unwrap()
}

#[test]
fn schema_preserves_declaration_order() {
    let schema = schema();
    let names: Vec<&str> = schema.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["id", "status", "count", "note"]);
    assert_eq!(schema.len(), 4);
    assert!(!schema.is_empty());
}

#[test]
fn validate_accepts_complete_item() {
    let item = Item::new().with("id", "1");
    assert!(schema().validate(&item).is_ok());
}

#[test]
fn validate_reports_missing_required() {
    let item = Item::new().with("note", "hi");
    assert_eq!(
        schema().validate(&item).unwrap_err(),
        SchemaError::MissingRequired("id".into())
    );
}

#[test]
fn validate_treats_null_as_missing() {
    let item = Item::new().with("id", json!(null));
    assert!(schema().validate(&item).is_err());
}

#[test]
fn apply_defaults_fills_only_absent() {
    let mut item = Item::new().with("id", "1").with("status", "closed");
    schema().apply_defaults(&mut item);
    assert_eq!(
        serde_json::Value::from(item),
        json!({"id": "1", "status": "closed", "count": 0})
    );
}

#[test]
fn apply_defaults_replaces_null() {
    let mut item = Item::new()
        .with("id", "1")
        .with("status", serde_json::Value::Null);
    schema().apply_defaults(&mut item);
    assert_eq!(item.get_str("status"), Some("open"));
}

// ── Item ─────────────────────────────────────────────────────────

#[test]
fn item_accessors() {
    let mut item = Item::new().with("a", "x").with("n", 3);
    assert_eq!(item.get_str("a"), Some("x"));
    assert_eq!(item.get_str("n"), None);
    assert_eq!(item.get("n"), Some(&json!(3)));
    assert!(item.contains("a"));
    assert_eq!(item.remove("a"), Some(json!("x")));
    assert!(!item.contains("a"));
    assert_eq!(item.len(), 1);
}

#[test]
fn item_from_json_object_only() {
    assert!(Item::try_from(json!({"a": 1})).is_ok());
    assert_eq!(Item::try_from(json!([1])).unwrap_err(), json!([1]));
}

#[test]
fn item_serializes_as_plain_object() {
    let item = Item::new().with("b", 2).with("a", 1);
    assert_eq!(serde_json::to_value(&item).unwrap(), json!({"b": 2, "a": 1}));
}

// ── Gsi ──────────────────────────────────────────────────────────

#[test]
fn gsi_displays_as_name() {
    let gsi = Gsi::new("GSI1")
        .with_partition_key("GSI1PK")
        .with_sort_key("GSI1SK");
    assert_eq!(gsi.to_string(), "GSI1");
    assert_eq!(gsi.name(), "GSI1");
    assert_eq!(gsi.partition_key(), Some("GSI1PK"));
    assert_eq!(gsi.sort_key(), Some("GSI1SK"));
}

#[test]
fn gsi_without_keys() {
    let gsi = Gsi::new("byStatus");
    assert_eq!(gsi.partition_key(), None);
    assert_eq!(gsi.sort_key(), None);
    assert_eq!(serde_json::to_string(&gsi).unwrap(), r#"{"name":"byStatus"}"#);
}
