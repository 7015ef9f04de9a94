//! Schema Tests
//!
//! Tests verify that invalid table and index declarations are rejected
//! when a store is opened, and that valid ones open cleanly.

use petstore::record::pet_schema;
use petstore::{FieldKind, IndexSchema, Pet, Schema, Store, StoreError, TableSchema};

// =============================================================================
// Helper Functions
// =============================================================================

fn pet_table(name: &str) -> TableSchema {
    TableSchema::new(name)
        .field("id", FieldKind::Int)
        .field("name", FieldKind::Str)
        .index(IndexSchema::new("id", "id").unique())
}

fn assert_schema_error(schema: Schema, fragment: &str) {
    match Store::<Pet>::open(schema) {
        Err(StoreError::Schema(message)) => assert!(
            message.contains(fragment),
            "expected '{}' in '{}'",
            fragment,
            message
        ),
        Err(other) => panic!("expected schema error, got {:?}", other),
        Ok(_) => panic!("expected schema error, store opened"),
    }
}

// =============================================================================
// Valid Schemas
// =============================================================================

#[test]
fn test_pet_schema_is_valid() {
    pet_schema().validate().unwrap();

    let store = Store::<Pet>::open(pet_schema()).unwrap();
    assert_eq!(store.table_names(), vec!["pet"]);

    let layout = store.layout("pet").unwrap();
    assert_eq!(layout.key_field(), "id");
    assert!(layout.secondary().is_empty());
    assert_eq!(layout.fields().len(), 3);
}

#[test]
fn test_multiple_tables_and_secondary_indexes() {
    let schema = Schema::new()
        .table(pet_table("dog").index(IndexSchema::new("name", "name")))
        .table(pet_table("cat"));

    let store = Store::<Pet>::open(schema).unwrap();
    assert_eq!(store.table_names(), vec!["cat", "dog"]);
    assert_eq!(store.layout("dog").unwrap().secondary().len(), 1);
}

#[test]
fn test_primary_index_may_use_any_field_name() {
    let schema = Schema::new().table(
        TableSchema::new("pet")
            .field("name", FieldKind::Str)
            .index(IndexSchema::new("id", "name").unique()),
    );

    let store = Store::<Pet>::open(schema).unwrap();
    assert_eq!(store.layout("pet").unwrap().key_field(), "name");
}

#[test]
fn test_unknown_table_lookup() {
    let store = Store::<Pet>::open(pet_schema()).unwrap();
    assert!(matches!(store.layout("owner"), Err(StoreError::UnknownTable(_))));
    assert!(matches!(store.begin_read("owner"), Err(StoreError::UnknownTable(_))));
    assert!(matches!(store.begin_write("owner"), Err(StoreError::UnknownTable(_))));
}

// =============================================================================
// Invalid Schemas
// =============================================================================

#[test]
fn test_empty_schema_rejected() {
    assert_schema_error(Schema::new(), "no tables");
}

#[test]
fn test_empty_table_name_rejected() {
    assert_schema_error(Schema::new().table(pet_table("")), "table name");
}

#[test]
fn test_duplicate_table_rejected() {
    let schema = Schema::new().table(pet_table("pet")).table(pet_table("pet"));
    assert_schema_error(schema, "duplicate table 'pet'");
}

#[test]
fn test_duplicate_field_rejected() {
    let schema = Schema::new().table(pet_table("pet").field("name", FieldKind::Str));
    assert_schema_error(schema, "duplicate field 'name'");
}

#[test]
fn test_index_on_unknown_field_rejected() {
    let schema = Schema::new().table(pet_table("pet").index(IndexSchema::new("status", "status")));
    assert_schema_error(schema, "unknown field 'status'");
}

#[test]
fn test_duplicate_index_name_rejected() {
    let schema = Schema::new().table(
        pet_table("pet")
            .index(IndexSchema::new("by_name", "name"))
            .index(IndexSchema::new("by_name", "id")),
    );
    assert_schema_error(schema, "duplicate index 'by_name'");
}

#[test]
fn test_missing_primary_index_rejected() {
    let schema = Schema::new().table(
        TableSchema::new("pet")
            .field("id", FieldKind::Int)
            .index(IndexSchema::new("by_id", "id").unique()),
    );
    assert_schema_error(schema, "missing 'id' index");
}

#[test]
fn test_non_unique_primary_index_rejected() {
    let schema = Schema::new().table(
        TableSchema::new("pet")
            .field("id", FieldKind::Int)
            .index(IndexSchema::new("id", "id")),
    );
    assert_schema_error(schema, "must be unique");
}

#[test]
fn test_primary_index_allowing_missing_rejected() {
    let schema = Schema::new().table(
        TableSchema::new("pet")
            .field("id", FieldKind::Int)
            .index(IndexSchema::new("id", "id").unique().allow_missing()),
    );
    assert_schema_error(schema, "cannot allow missing");
}

#[test]
fn test_validate_reports_same_errors_as_open() {
    let schema = Schema::new().table(pet_table("pet").index(IndexSchema::new("x", "nope")));
    assert!(matches!(schema.validate(), Err(StoreError::Schema(_))));
}
