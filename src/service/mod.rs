//! Service Module
//!
//! Turns create/fetch/replace/remove requests into store transactions.
//!
//! ## Responsibilities
//! - One transaction per request, committed on success and aborted on
//!   any failure
//! - Assign primary keys to records created without one
//! - Translate store errors into caller-facing outcomes
//!
//! The service knows nothing about how requests arrive; the network
//! layer decodes them and encodes whatever comes back.

mod error;

use std::sync::Arc;

use crate::error::Result;
use crate::record::{FieldValue, Record};
use crate::schema::PRIMARY_INDEX;
use crate::store::{Store, WriteTxn};

pub use error::{ServiceError, ServiceResult};

/// CRUD front for one table of a shared store
pub struct Service<R: Record> {
    store: Arc<Store<R>>,
    table: String,
    key_field: String,
}

impl<R: Record> Service<R> {
    /// Bind the service to `table`, which must exist in `store`
    pub fn new(store: Arc<Store<R>>, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        let key_field = store.layout(&table)?.key_field().to_string();
        Ok(Self {
            store,
            table,
            key_field,
        })
    }

    pub fn store(&self) -> &Arc<Store<R>> {
        &self.store
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Insert a new record and return it as committed
    ///
    /// A record without a primary key gets the next free integer key.
    pub fn create(&self, mut record: R) -> ServiceResult<R> {
        let mut txn = self.store.begin_write(&self.table)?;

        if record.field(&self.key_field).is_none() {
            let key = FieldValue::Int(txn.next_int_key());
            if !record.set_field(&self.key_field, key) {
                txn.abort();
                return Err(ServiceError::BadRequest(format!(
                    "record is missing key field '{}'",
                    self.key_field
                )));
            }
        }

        let result = txn.insert(record);
        Self::finish(txn, result)
    }

    /// Look up a record by primary key
    pub fn fetch(&self, key: impl Into<FieldValue>) -> ServiceResult<R> {
        let txn = self.store.begin_read(&self.table)?;
        let record = txn.get(PRIMARY_INDEX, &key.into())?;
        Ok(R::clone(&record))
    }

    /// Replace the record at `key` and return the new record
    ///
    /// A body without a primary key keeps `key`; a body with a different
    /// key moves the record to that key.
    pub fn replace(&self, key: impl Into<FieldValue>, mut record: R) -> ServiceResult<R> {
        let key = key.into();
        if record.field(&self.key_field).is_none() && !record.set_field(&self.key_field, key.clone()) {
            return Err(ServiceError::BadRequest(format!(
                "record is missing key field '{}'",
                self.key_field
            )));
        }

        let mut txn = self.store.begin_write(&self.table)?;
        let result = txn.replace(&key, record);
        Self::finish(txn, result)
    }

    /// Delete the record at `key` and return what was deleted
    pub fn remove(&self, key: impl Into<FieldValue>) -> ServiceResult<R> {
        let key = key.into();
        let mut txn = self.store.begin_write(&self.table)?;
        let result = txn.delete(&key);
        Self::finish(txn, result)
    }

    fn finish(txn: WriteTxn<R>, result: Result<Arc<R>>) -> ServiceResult<R> {
        match result {
            Ok(record) => {
                txn.commit();
                Ok(R::clone(&record))
            }
            Err(err) => {
                txn.abort();
                Err(err.into())
            }
        }
    }
}
