//! Transactions
//!
//! Read transactions pin a committed snapshot. Write transactions hold
//! the table's writer slot and stage changes on a private copy of the
//! snapshot they started from; commit publishes that copy.

use std::fmt;
use std::sync::Arc;

use super::state::TableState;
use super::table::Table;
use crate::error::Result;
use crate::record::{FieldValue, Record};

// =============================================================================
// Read Transaction
// =============================================================================

/// Shared, snapshot-isolated view of one table
///
/// Later commits are never visible through this handle. Dropping it
/// releases the snapshot.
pub struct ReadTxn<R: Record> {
    id: u64,
    snapshot: Arc<TableState<R>>,
}

impl<R: Record> ReadTxn<R> {
    pub(crate) fn new(id: u64, snapshot: Arc<TableState<R>>) -> Self {
        Self { id, snapshot }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn table(&self) -> &str {
        self.snapshot.table()
    }

    /// Version of the snapshot this transaction reads
    pub fn version(&self) -> u64 {
        self.snapshot.version()
    }

    pub fn get(&self, index: &str, key: &FieldValue) -> Result<Arc<R>> {
        self.snapshot.get(index, key)
    }

    pub fn get_all(&self, index: &str, key: &FieldValue) -> Result<Vec<Arc<R>>> {
        self.snapshot.get_all(index, key)
    }

    pub fn records(&self) -> Vec<Arc<R>> {
        self.snapshot.records()
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn next_int_key(&self) -> i64 {
        self.snapshot.next_int_key()
    }

    /// Discard the transaction
    pub fn release(self) {
        tracing::trace!(txn = self.id, table = self.table(), "read snapshot released");
    }
}

impl<R: Record> fmt::Debug for ReadTxn<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadTxn")
            .field("id", &self.id)
            .field("table", &self.table())
            .field("version", &self.version())
            .finish()
    }
}

// =============================================================================
// Write Transaction
// =============================================================================

/// Exclusive unit of work on one table
///
/// Reads through this handle see the transaction's own staged changes.
/// Nothing is visible to other transactions until `commit`. Dropping the
/// handle without committing aborts it.
pub struct WriteTxn<R: Record> {
    id: u64,
    table: Arc<Table<R>>,
    base_version: u64,
    working: TableState<R>,
    staged: usize,
    finished: bool,
}

impl<R: Record> WriteTxn<R> {
    /// Caller must already hold the table's writer slot
    pub(crate) fn new(id: u64, table: Arc<Table<R>>) -> Self {
        let working = (*table.snapshot()).clone();
        Self {
            id,
            base_version: working.version(),
            table,
            working,
            staged: 0,
            finished: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn table(&self) -> &str {
        self.table.name()
    }

    /// Version of the committed state this transaction started from
    pub fn version(&self) -> u64 {
        self.base_version
    }

    /// Number of successful insert/replace/delete calls so far
    pub fn staged_changes(&self) -> usize {
        self.staged
    }

    // -------------------------------------------------------------------------
    // Reads (see staged changes)
    // -------------------------------------------------------------------------

    pub fn get(&self, index: &str, key: &FieldValue) -> Result<Arc<R>> {
        self.working.get(index, key)
    }

    pub fn get_all(&self, index: &str, key: &FieldValue) -> Result<Vec<Arc<R>>> {
        self.working.get_all(index, key)
    }

    pub fn records(&self) -> Vec<Arc<R>> {
        self.working.records()
    }

    pub fn len(&self) -> usize {
        self.working.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    pub fn next_int_key(&self) -> i64 {
        self.working.next_int_key()
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Stage a new record
    ///
    /// Fails with `DuplicateKey` if any unique index already holds one of
    /// the record's values. The transaction stays open either way.
    pub fn insert(&mut self, record: R) -> Result<Arc<R>> {
        let record = self.working.insert(record)?;
        self.staged += 1;
        Ok(record)
    }

    /// Stage replacing the record at primary key `key`
    ///
    /// Fails with `NotFound` if there is no such record.
    pub fn replace(&mut self, key: &FieldValue, record: R) -> Result<Arc<R>> {
        let record = self.working.replace(key, record)?;
        self.staged += 1;
        Ok(record)
    }

    /// Stage removing the record at primary key `key`, returning it
    pub fn delete(&mut self, key: &FieldValue) -> Result<Arc<R>> {
        let record = self.working.remove(key)?;
        self.staged += 1;
        Ok(record)
    }

    /// Publish every staged change at once and return the new version
    ///
    /// A transaction with nothing staged publishes nothing and returns the
    /// version it started from.
    pub fn commit(mut self) -> u64 {
        self.finished = true;

        if self.staged == 0 {
            tracing::debug!(txn = self.id, table = self.table(), "commit with no changes");
            return self.base_version;
        }

        let version = self.base_version + 1;
        let mut next = self.working.clone();
        next.set_version(version);
        self.table.publish(next);

        tracing::debug!(
            txn = self.id,
            table = self.table(),
            version,
            changes = self.staged,
            "write transaction committed"
        );
        version
    }

    /// Discard every staged change
    pub fn abort(mut self) {
        self.finished = true;
        tracing::debug!(
            txn = self.id,
            table = self.table(),
            discarded = self.staged,
            "write transaction aborted"
        );
    }
}

impl<R: Record> fmt::Debug for WriteTxn<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteTxn")
            .field("id", &self.id)
            .field("table", &self.table())
            .field("version", &self.base_version)
            .field("staged", &self.staged)
            .finish()
    }
}

impl<R: Record> Drop for WriteTxn<R> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(
                txn = self.id,
                table = self.table.name(),
                discarded = self.staged,
                "write transaction dropped without commit"
            );
        }
        self.table.release_writer();
    }
}
