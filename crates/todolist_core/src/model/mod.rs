//! Domain model for owned, shareable ToDo records.
//!
//! # Responsibility
//! - Define the canonical `ToDo` and `User` shapes used by core logic.
//! - Keep collaborator membership changes behind explicit operations.
//!
//! # Invariants
//! - Identifiers are assigned by persistence, never by callers.
//! - A ToDo owner is never a member of its collaborator set.

pub mod todo;
pub mod user;
