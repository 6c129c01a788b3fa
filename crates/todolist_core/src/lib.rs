//! Core domain logic for the shared todo list.
//! This crate is the single source of truth for ownership and collaborator
//! invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::todo::{ToDo, ToDoId, ToDoValidationError};
pub use model::user::{User, UserId};
pub use repo::error::{EntityKind, RepoError, RepoResult};
pub use repo::todo_repo::{SqliteToDoRepository, ToDoRepository};
pub use repo::tx::{SqliteTransactionScope, TransactionScope};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use service::todo_service::{ServiceResult, ToDoService, ToDoServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
