//! Per-request transaction scope
//!
//! Column-type lookups run against a database session that can be left in
//! an aborted state by a failed query. Until the session is rolled back,
//! every subsequent query on it fails. Each request owns exactly one
//! session; sessions are never shared across in-flight requests, so a
//! rollback triggered by one request cannot disturb another.

use std::cell::Cell;

/// Transaction scope owned by a single request.
///
/// Single-threaded by design (interior mutability via `Cell`, not atomics):
/// the request model is synchronous and one session never crosses threads.
#[derive(Debug, Default)]
pub struct Session {
    /// Whether the current transaction is aborted
    poisoned: Cell<bool>,
    /// Number of rollbacks issued over the session's lifetime
    rollbacks: Cell<u32>,
}

impl Session {
    /// Opens a fresh session for one request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the current transaction as aborted.
    ///
    /// Models a query failing mid-transaction; subsequent queries fail
    /// until `rollback` is called.
    pub fn poison(&self) {
        self.poisoned.set(true);
    }

    /// Returns whether the current transaction is aborted.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.get()
    }

    /// Rolls back the current transaction, clearing the aborted state.
    pub fn rollback(&self) {
        self.poisoned.set(false);
        self.rollbacks.set(self.rollbacks.get() + 1);
    }

    /// Number of rollbacks issued so far.
    pub fn rollback_count(&self) -> u32 {
        self.rollbacks.get()
    }
}
