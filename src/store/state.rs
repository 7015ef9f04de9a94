//! Table snapshot
//!
//! One immutable version of a table: its records keyed by primary key
//! plus one secondary index per declared non-primary index. Cloning is
//! O(number of indexes); every index shares its nodes with the source.

use std::sync::Arc;

use crate::error::{Result, StoreError};
use crate::index::{PersistentMap, SecondaryIndex};
use crate::record::{FieldValue, Record};
use crate::schema::{TableLayout, PRIMARY_INDEX};

/// A point-in-time view of one table
pub struct TableState<R> {
    layout: Arc<TableLayout>,
    version: u64,
    rows: PersistentMap<FieldValue, Arc<R>>,
    secondary: Vec<SecondaryIndex>,
}

impl<R> Clone for TableState<R> {
    fn clone(&self) -> Self {
        Self {
            layout: Arc::clone(&self.layout),
            version: self.version,
            rows: self.rows.clone(),
            secondary: self.secondary.clone(),
        }
    }
}

impl<R: Record> TableState<R> {
    pub(crate) fn empty(layout: Arc<TableLayout>) -> Self {
        let secondary = layout.secondary().iter().map(|_| SecondaryIndex::new()).collect();
        Self {
            layout,
            version: 0,
            rows: PersistentMap::new(),
            secondary,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn table(&self) -> &str {
        self.layout.name()
    }

    /// Number of commits applied to reach this state
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up one record by index value
    ///
    /// For a non-unique index this is the match with the lowest primary key.
    pub fn get(&self, index: &str, key: &FieldValue) -> Result<Arc<R>> {
        let found = if index == PRIMARY_INDEX {
            self.rows.get(key)
        } else {
            let position = self.secondary_position(index)?;
            self.secondary[position]
                .first(key)
                .and_then(|primary| self.rows.get(primary))
        };

        found.cloned().ok_or_else(|| StoreError::NotFound {
            table: self.table().to_string(),
            index: index.to_string(),
            key: key.clone(),
        })
    }

    /// All records matching an index value, in primary-key order
    pub fn get_all(&self, index: &str, key: &FieldValue) -> Result<Vec<Arc<R>>> {
        if index == PRIMARY_INDEX {
            return Ok(self.rows.get(key).cloned().into_iter().collect());
        }

        let position = self.secondary_position(index)?;
        Ok(self.secondary[position]
            .get(key)
            .filter_map(|primary| self.rows.get(primary).cloned())
            .collect())
    }

    /// Every record, in primary-key order
    pub fn records(&self) -> Vec<Arc<R>> {
        self.rows.iter().map(|(_, record)| Arc::clone(record)).collect()
    }

    /// One past the largest integer primary key, starting at 1
    pub fn next_int_key(&self) -> i64 {
        self.rows
            .last_key()
            .and_then(FieldValue::as_int)
            .map_or(1, |max| max.saturating_add(1))
    }

    fn secondary_position(&self, index: &str) -> Result<usize> {
        self.layout
            .secondary_position(index)
            .ok_or_else(|| StoreError::UnknownIndex {
                table: self.table().to_string(),
                index: index.to_string(),
            })
    }

    // =========================================================================
    // Writes (applied to a write transaction's private copy)
    // =========================================================================

    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Add a record after checking every constraint; on error nothing changes
    pub(crate) fn insert(&mut self, record: R) -> Result<Arc<R>> {
        self.check_kinds(&record)?;

        let key = record
            .field(self.layout.key_field())
            .ok_or_else(|| StoreError::MissingField {
                table: self.table().to_string(),
                field: self.layout.key_field().to_string(),
            })?;
        if self.rows.contains_key(&key) {
            return Err(StoreError::DuplicateKey {
                table: self.table().to_string(),
                index: PRIMARY_INDEX.to_string(),
                key,
            });
        }

        let mut values = Vec::with_capacity(self.secondary.len());
        for (schema, index) in self.layout.secondary().iter().zip(&self.secondary) {
            match record.field(&schema.field) {
                Some(value) => {
                    if schema.unique && index.contains(&value) {
                        return Err(StoreError::DuplicateKey {
                            table: self.table().to_string(),
                            index: schema.name.clone(),
                            key: value,
                        });
                    }
                    values.push(Some(value));
                }
                None if schema.allow_missing => values.push(None),
                None => {
                    return Err(StoreError::MissingField {
                        table: self.table().to_string(),
                        field: schema.field.clone(),
                    })
                }
            }
        }

        let record = Arc::new(record);
        for (index, value) in self.secondary.iter_mut().zip(values) {
            if let Some(value) = value {
                index.insert(value, key.clone());
            }
        }
        self.rows.insert(key, Arc::clone(&record));
        Ok(record)
    }

    /// Remove the record at a primary key, returning it
    pub(crate) fn remove(&mut self, key: &FieldValue) -> Result<Arc<R>> {
        let record = self.rows.remove(key).ok_or_else(|| StoreError::NotFound {
            table: self.layout.name().to_string(),
            index: PRIMARY_INDEX.to_string(),
            key: key.clone(),
        })?;

        for (schema, index) in self.layout.secondary().iter().zip(self.secondary.iter_mut()) {
            if let Some(value) = record.field(&schema.field) {
                index.remove(&value, key);
            }
        }
        Ok(record)
    }

    /// Swap the record at `key` for `record` as one change
    ///
    /// The new record may carry a different primary key; all unique
    /// constraints are checked against the table without the old record.
    pub(crate) fn replace(&mut self, key: &FieldValue, record: R) -> Result<Arc<R>> {
        let mut next = self.clone();
        next.remove(key)?;
        let record = next.insert(record)?;
        *self = next;
        Ok(record)
    }

    fn check_kinds(&self, record: &R) -> Result<()> {
        for field in self.layout.fields() {
            if let Some(value) = record.field(&field.name) {
                if value.kind() != field.kind {
                    return Err(StoreError::TypeMismatch {
                        table: self.table().to_string(),
                        field: field.name.clone(),
                        expected: field.kind,
                        found: value.kind(),
                    });
                }
            }
        }
        Ok(())
    }
}
