//! Record Module
//!
//! Typed records and the values their indexed fields produce.
//!
//! ## Responsibilities
//! - Expose named field values to the index layer
//! - Provide a total order over field values for index keys
//! - Allow the service layer to fill in auto-assigned keys

mod pet;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::FieldKind;

pub use pet::{pet_schema, Pet, PET_TABLE};

/// A value read from a record field, usable as an index key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldValue {
    Int(i64),
    Str(String),
    Bool(bool),
}

impl FieldValue {
    /// Kind of this value, checked against the declared field kind
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::Str(_) => FieldKind::Str,
            FieldValue::Bool(_) => FieldKind::Bool,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Str(v) => write!(f, "{:?}", v),
            FieldValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Str(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

/// A value that can be stored in a table
///
/// The store never inspects a record except through `field`, so any
/// struct can be stored as long as it reports the fields its table's
/// schema declares.
pub trait Record: Clone + Send + Sync + 'static {
    /// Current value of the named field, `None` when absent
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Overwrite the named field
    ///
    /// Returns false when the record type does not support setting
    /// that field (or any field).
    fn set_field(&mut self, _name: &str, _value: FieldValue) -> bool {
        false
    }
}
