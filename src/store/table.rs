//! Table handle
//!
//! Owns the pointer to a table's current committed state and the gate
//! that admits one write transaction at a time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, RwLock};

use super::state::TableState;
use crate::record::Record;
use crate::schema::TableLayout;

/// A table shared by the store and every open transaction on it
///
/// ## Concurrency:
/// - `current`: the committed snapshot. Readers clone the `Arc` under a
///   read lock; a commit swaps it under a write lock. Neither side holds
///   the lock beyond that pointer copy.
/// - `gate`: held for the whole life of a write transaction
pub(crate) struct Table<R> {
    layout: Arc<TableLayout>,
    current: RwLock<Arc<TableState<R>>>,
    gate: WriteGate,
}

impl<R: Record> Table<R> {
    pub fn new(layout: TableLayout) -> Self {
        let layout = Arc::new(layout);
        let state = TableState::empty(Arc::clone(&layout));
        Self {
            layout,
            current: RwLock::new(Arc::new(state)),
            gate: WriteGate::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.layout.name()
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    /// Latest committed state
    pub fn snapshot(&self) -> Arc<TableState<R>> {
        Arc::clone(&self.current.read())
    }

    /// Make `state` the committed state (caller holds the gate)
    pub fn publish(&self, state: TableState<R>) {
        *self.current.write() = Arc::new(state);
    }

    /// Claim the writer slot, waiting at most `budget` (`None` = forever)
    pub fn acquire_writer(&self, budget: Option<Duration>) -> bool {
        self.gate.acquire(budget)
    }

    pub fn release_writer(&self) {
        self.gate.release();
    }
}

/// Single-holder gate with blocking, fail-fast and deadline acquisition
struct WriteGate {
    held: Mutex<bool>,
    released: Condvar,
}

impl WriteGate {
    fn new() -> Self {
        Self {
            held: Mutex::new(false),
            released: Condvar::new(),
        }
    }

    fn acquire(&self, budget: Option<Duration>) -> bool {
        let mut held = self.held.lock();

        match budget {
            None => {
                while *held {
                    self.released.wait(&mut held);
                }
            }
            Some(budget) => {
                let deadline = Instant::now() + budget;
                while *held {
                    if self.released.wait_until(&mut held, deadline).timed_out() && *held {
                        return false;
                    }
                }
            }
        }

        *held = true;
        true
    }

    fn release(&self) {
        *self.held.lock() = false;
        self.released.notify_one();
    }
}
