//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the ToDo-store and User-store contracts consumed by services.
//! - Isolate SQLite query details from business orchestration.
//!
//! # Invariants
//! - ToDo writes must enforce `ToDo::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod error;
pub mod todo_repo;
pub mod tx;
pub mod user_repo;

use crate::db::migrations::latest_version;
use error::{RepoError, RepoResult};
use rusqlite::Connection;

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected = latest_version();
    let actual: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual != expected {
        return Err(RepoError::SchemaMismatch { expected, actual });
    }
    Ok(())
}
