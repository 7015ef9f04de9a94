//! # Pet Store
//!
//! A CRUD service over an in-memory, transactional indexed record store:
//! - Typed records with unique and non-unique field indexes
//! - Single-writer/multi-reader transactions per table
//! - Snapshot isolation from persistent (structurally shared) indexes
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Service                                 │
//! │        (create / fetch / replace / remove → one txn)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Store                                  │
//! │     (one writer per table, unlimited snapshot readers)       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌───────────────┐
//!               │  TableState   │  immutable, swapped on commit
//!               │ (Persistent   │
//!               │  AVL indexes) │
//!               └───────────────┘
//! ```
//!
//! Nothing is persisted; all state lives as long as the `Store`.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod schema;
pub mod record;
pub mod index;
pub mod store;
pub mod service;
pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::{Config, WritePolicy};
pub use record::{FieldValue, Pet, Record};
pub use schema::{FieldKind, IndexSchema, Schema, TableSchema, PRIMARY_INDEX};
pub use service::{Service, ServiceError};
pub use store::{ReadTxn, Store, WriteTxn};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the pet store
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
