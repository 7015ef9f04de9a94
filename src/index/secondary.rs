//! Secondary index
//!
//! Maps a field value to the primary keys of the records holding it.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::PersistentMap;
use crate::record::FieldValue;

/// Value → primary keys, with per-value sets copied on write
#[derive(Debug, Clone, Default)]
pub struct SecondaryIndex {
    entries: PersistentMap<FieldValue, Arc<BTreeSet<FieldValue>>>,
}

impl SecondaryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primary keys holding `value`, in ascending order
    pub fn get(&self, value: &FieldValue) -> impl Iterator<Item = &FieldValue> {
        self.entries.get(value).into_iter().flat_map(|keys| keys.iter())
    }

    /// Lowest primary key holding `value`
    pub fn first(&self, value: &FieldValue) -> Option<&FieldValue> {
        self.get(value).next()
    }

    pub fn contains(&self, value: &FieldValue) -> bool {
        self.entries.contains_key(value)
    }

    /// Number of distinct indexed values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, value: FieldValue, primary: FieldValue) {
        let mut keys = self
            .entries
            .get(&value)
            .map(|keys| BTreeSet::clone(keys))
            .unwrap_or_default();
        keys.insert(primary);
        self.entries.insert(value, Arc::new(keys));
    }

    pub fn remove(&mut self, value: &FieldValue, primary: &FieldValue) {
        let Some(existing) = self.entries.get(value) else {
            return;
        };
        if !existing.contains(primary) {
            return;
        }

        let mut keys = BTreeSet::clone(existing);
        keys.remove(primary);
        if keys.is_empty() {
            self.entries.remove(value);
        } else {
            self.entries.insert(value.clone(), Arc::new(keys));
        }
    }
}
