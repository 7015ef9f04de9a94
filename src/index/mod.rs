//! Index Module
//!
//! Immutable index structures that table snapshots are built from.
//!
//! ## Responsibilities
//! - Ordered point lookups by field value
//! - O(1) snapshots: cloning an index shares all of its nodes
//! - Updates that never disturb existing snapshots
//!
//! ## Data Structure Choice
//! A path-copying AVL tree with `Arc` nodes:
//! - Ordered keys (deterministic iteration, max-key for id assignment)
//! - An update allocates O(log n) nodes and leaves older roots intact
//! - Readers hold a root pointer and need no lock while traversing

mod secondary;
mod tree;

pub use secondary::SecondaryIndex;
pub use tree::{Iter, PersistentMap};
