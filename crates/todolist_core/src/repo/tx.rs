//! Transaction scoping for multi-step use cases.
//!
//! # Invariants
//! - The scope is committed only when the closure returns `Ok`.
//! - Every other exit path (error or unwinding) rolls back.

use crate::repo::error::RepoError;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Runs a lookup-then-mutate sequence atomically.
pub trait TransactionScope {
    fn run_in_transaction<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<RepoError>;
}

/// SQLite transaction scope over the connection shared with the repositories.
///
/// Uses `BEGIN IMMEDIATE` so the write lock is taken before the first read,
/// which serializes concurrent read-modify-write callers.
pub struct SqliteTransactionScope<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTransactionScope<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TransactionScope for SqliteTransactionScope<'_> {
    fn run_in_transaction<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<RepoError>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        let value = op()?;
        tx.commit().map_err(RepoError::from)?;
        Ok(value)
    }
}
