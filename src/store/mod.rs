//! Store Module
//!
//! The transactional indexed record store.
//!
//! ## Responsibilities
//! - Hold one table per schema entry with its indexes
//! - Enforce unique-index constraints on every staged change
//! - Admit one write transaction per table at a time
//! - Give every read transaction a stable point-in-time snapshot
//!
//! ## Concurrency Model: Single-Writer / Multiple-Reader per table
//!
//! ```text
//!            begin_read ──► Arc<TableState> (v3) ──► get/get_all
//!                                   ▲
//!   current ────────────────────────┘   (pointer swap on commit)
//!                                   │
//!            begin_write ──► clone of v3 ──► insert/replace/delete ──► commit ──► v4
//! ```
//!
//! - Writers stage changes on a private clone of the snapshot they began
//!   from. Clones share index nodes, so staging costs O(log n) per change.
//! - Commit replaces the table's current snapshot pointer. Readers that
//!   began earlier keep their old `Arc` and never see the new version.
//! - The store spawns no threads and never retries; a `Busy` result is
//!   for the caller to handle.

mod state;
mod table;
mod txn;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::WritePolicy;
use crate::error::{Result, StoreError};
use crate::record::Record;
use crate::schema::{Schema, TableLayout};

use table::Table;

pub use state::TableState;
pub use txn::{ReadTxn, WriteTxn};

/// In-memory store of typed records
///
/// All state is volatile and dropped with the store.
pub struct Store<R: Record> {
    tables: HashMap<String, Arc<Table<R>>>,
    write_policy: WritePolicy,
    next_txn_id: AtomicU64,
}

impl<R: Record> Store<R> {
    /// Open an empty store for `schema`, blocking contended writers
    pub fn open(schema: Schema) -> Result<Self> {
        Self::open_with_policy(schema, WritePolicy::default())
    }

    /// Open an empty store for `schema` with an explicit writer policy
    ///
    /// Fails with `Schema` if any table or index declaration is invalid.
    pub fn open_with_policy(schema: Schema, write_policy: WritePolicy) -> Result<Self> {
        let tables = schema
            .compile()?
            .into_iter()
            .map(|layout| (layout.name().to_string(), Arc::new(Table::new(layout))))
            .collect::<HashMap<_, _>>();

        tracing::debug!(tables = tables.len(), ?write_policy, "store opened");

        Ok(Self {
            tables,
            write_policy,
            next_txn_id: AtomicU64::new(1),
        })
    }

    /// Start a read transaction on the latest committed state
    pub fn begin_read(&self, table: &str) -> Result<ReadTxn<R>> {
        let table = self.table(table)?;
        let id = self.next_txn_id();
        let snapshot = table.snapshot();
        tracing::trace!(txn = id, table = table.name(), version = snapshot.version(), "read snapshot");
        Ok(ReadTxn::new(id, snapshot))
    }

    /// Start the table's write transaction
    ///
    /// While another write transaction on the same table is open, this
    /// waits or fails with `Busy` according to the store's `WritePolicy`.
    pub fn begin_write(&self, table: &str) -> Result<WriteTxn<R>> {
        let table = self.table(table)?;
        if !table.acquire_writer(self.write_policy.wait_budget()) {
            return Err(StoreError::Busy {
                table: table.name().to_string(),
            });
        }

        let id = self.next_txn_id();
        let txn = WriteTxn::new(id, Arc::clone(table));
        tracing::debug!(txn = id, table = txn.table(), version = txn.version(), "write transaction started");
        Ok(txn)
    }

    /// Names of all tables, sorted
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Validated declaration of a table
    pub fn layout(&self, table: &str) -> Result<&TableLayout> {
        self.table(table).map(|table| table.layout())
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    fn table(&self, name: &str) -> Result<&Arc<Table<R>>> {
        self.tables
            .get(name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))
    }

    fn next_txn_id(&self) -> u64 {
        self.next_txn_id.fetch_add(1, Ordering::Relaxed)
    }
}
