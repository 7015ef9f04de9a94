//! Pet record
//!
//! The record type served by the pet store binaries.

use serde::{Deserialize, Serialize};

use super::{FieldValue, Record};
use crate::schema::{FieldKind, IndexSchema, Schema, TableSchema, PRIMARY_INDEX};

/// Name of the table holding pets
pub const PET_TABLE: &str = "pet";

/// A pet; every field may be omitted by the client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub status: Option<String>,
}

impl Pet {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: Some(name.into()),
            status: None,
        }
    }

    /// A pet without an id, to be assigned on create
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            status: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

impl Record for Pet {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => self.id.map(FieldValue::Int),
            "name" => self.name.clone().map(FieldValue::Str),
            "status" => self.status.clone().map(FieldValue::Str),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> bool {
        match (name, value) {
            ("id", FieldValue::Int(v)) => self.id = Some(v),
            ("name", FieldValue::Str(v)) => self.name = Some(v),
            ("status", FieldValue::Str(v)) => self.status = Some(v),
            _ => return false,
        }
        true
    }
}

/// Schema with the single `pet` table, uniquely indexed by `id`
pub fn pet_schema() -> Schema {
    Schema::new().table(
        TableSchema::new(PET_TABLE)
            .field("id", FieldKind::Int)
            .field("name", FieldKind::Str)
            .field("status", FieldKind::Str)
            .index(IndexSchema::new(PRIMARY_INDEX, "id").unique()),
    )
}
