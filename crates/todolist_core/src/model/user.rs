//! User domain model.

use serde::{Deserialize, Serialize};

/// Persistence-assigned user identifier.
pub type UserId = i64;

/// A person who can own ToDos or collaborate on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Display name. Not used by any business rule.
    pub name: String,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
