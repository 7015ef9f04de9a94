//! Schema definitions
//!
//! Declares tables, their field layout and their indexes, and validates
//! them when a store is opened.
//!
//! ## Rules
//! - Every table has a unique index named `id`; it owns the records and
//!   its key is what `replace`/`delete` address
//! - Every index references a declared field
//! - Table, field and index names are unique within their scope

use std::collections::HashSet;
use std::fmt;

use crate::error::{Result, StoreError};

/// Name of the index every table must declare
pub const PRIMARY_INDEX: &str = "id";

/// Kind of value a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Int,
    Str,
    Bool,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Int => "int",
            FieldKind::Str => "string",
            FieldKind::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// A named, typed field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
}

/// An index over one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSchema {
    pub name: String,
    pub field: String,
    /// At most one record per value
    pub unique: bool,
    /// Records lacking the field are left out of the index instead of rejected
    pub allow_missing: bool,
}

impl IndexSchema {
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            unique: false,
            allow_missing: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn allow_missing(mut self) -> Self {
        self.allow_missing = true;
        self
    }
}

/// Declaration of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub fields: Vec<FieldDef>,
    pub indexes: Vec<IndexSchema>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn index(mut self, index: IndexSchema) -> Self {
        self.indexes.push(index);
        self
    }

    /// Check the table declaration and split out its primary index
    fn compile(&self) -> Result<TableLayout> {
        if self.name.is_empty() {
            return Err(StoreError::Schema("table name must not be empty".into()));
        }

        let mut field_names = HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(StoreError::Schema(format!(
                    "table '{}': field name must not be empty",
                    self.name
                )));
            }
            if !field_names.insert(field.name.as_str()) {
                return Err(StoreError::Schema(format!(
                    "table '{}': duplicate field '{}'",
                    self.name, field.name
                )));
            }
        }

        let mut index_names = HashSet::new();
        for index in &self.indexes {
            if !index_names.insert(index.name.as_str()) {
                return Err(StoreError::Schema(format!(
                    "table '{}': duplicate index '{}'",
                    self.name, index.name
                )));
            }
            if !field_names.contains(index.field.as_str()) {
                return Err(StoreError::Schema(format!(
                    "table '{}': index '{}' references unknown field '{}'",
                    self.name, index.name, index.field
                )));
            }
        }

        let primary = self
            .indexes
            .iter()
            .find(|index| index.name == PRIMARY_INDEX)
            .ok_or_else(|| {
                StoreError::Schema(format!(
                    "table '{}': missing '{}' index",
                    self.name, PRIMARY_INDEX
                ))
            })?;
        if !primary.unique {
            return Err(StoreError::Schema(format!(
                "table '{}': '{}' index must be unique",
                self.name, PRIMARY_INDEX
            )));
        }
        if primary.allow_missing {
            return Err(StoreError::Schema(format!(
                "table '{}': '{}' index cannot allow missing values",
                self.name, PRIMARY_INDEX
            )));
        }

        Ok(TableLayout {
            name: self.name.clone(),
            fields: self.fields.clone(),
            key_field: primary.field.clone(),
            secondary: self
                .indexes
                .iter()
                .filter(|index| index.name != PRIMARY_INDEX)
                .cloned()
                .collect(),
        })
    }
}

/// The full set of tables a store holds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub tables: Vec<TableSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, table: TableSchema) -> Self {
        self.tables.push(table);
        self
    }

    /// Validate without opening a store
    pub fn validate(&self) -> Result<()> {
        self.compile().map(|_| ())
    }

    pub(crate) fn compile(&self) -> Result<Vec<TableLayout>> {
        if self.tables.is_empty() {
            return Err(StoreError::Schema("schema declares no tables".into()));
        }

        let mut names = HashSet::new();
        let mut layouts = Vec::with_capacity(self.tables.len());
        for table in &self.tables {
            if !names.insert(table.name.as_str()) {
                return Err(StoreError::Schema(format!(
                    "duplicate table '{}'",
                    table.name
                )));
            }
            layouts.push(table.compile()?);
        }
        Ok(layouts)
    }
}

/// Validated table declaration, as the store uses it
#[derive(Debug, Clone)]
pub struct TableLayout {
    name: String,
    fields: Vec<FieldDef>,
    key_field: String,
    secondary: Vec<IndexSchema>,
}

impl TableLayout {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field holding the primary key
    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    /// Indexes other than the primary one, in declaration order
    pub fn secondary(&self) -> &[IndexSchema] {
        &self.secondary
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Position of a secondary index; `None` for the primary or unknown names
    pub(crate) fn secondary_position(&self, index: &str) -> Option<usize> {
        self.secondary.iter().position(|s| s.name == index)
    }
}
