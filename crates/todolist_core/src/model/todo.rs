//! ToDo domain model.
//!
//! # Responsibility
//! - Hold the title, owner and collaborator set of one task record.
//! - Guard the owner/collaborator separation at mutation time.
//!
//! # Invariants
//! - `owner_id` is fixed once the value is constructed.
//! - `collaborators` never contains `owner_id`.
//! - `id == None` means the record was never persisted.
//! - Collaborator membership only changes inside the crate; callers go through
//!   `ToDoService::add_collaborator`/`remove_collaborator`.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Persistence-assigned ToDo identifier.
pub type ToDoId = i64;

/// Validation failures for ToDo state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToDoValidationError {
    /// The owner was found (or offered) as a collaborator.
    OwnerIsCollaborator(UserId),
}

impl Display for ToDoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OwnerIsCollaborator(user_id) => {
                write!(f, "owner (id={user_id}) cannot be a collaborator")
            }
        }
    }
}

impl Error for ToDoValidationError {}

/// Task record owned by one user and optionally shared with others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToDo {
    id: Option<ToDoId>,
    title: String,
    owner_id: UserId,
    #[serde(default)]
    collaborators: BTreeSet<UserId>,
}

impl ToDo {
    /// Creates an unsaved ToDo. Persistence assigns the id on first save.
    pub fn new(title: impl Into<String>, owner_id: UserId) -> Self {
        Self {
            id: None,
            title: title.into(),
            owner_id,
            collaborators: BTreeSet::new(),
        }
    }

    /// Creates a ToDo with a known identity, e.g. when loading from storage.
    pub fn with_id(id: ToDoId, title: impl Into<String>, owner_id: UserId) -> Self {
        Self {
            id: Some(id),
            ..Self::new(title, owner_id)
        }
    }

    pub fn id(&self) -> Option<ToDoId> {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn collaborators(&self) -> &BTreeSet<UserId> {
        &self.collaborators
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Adds a collaborator and returns whether membership changed.
    ///
    /// # Errors
    /// - `OwnerIsCollaborator` when `user_id` is the owner.
    pub(crate) fn add_collaborator(
        &mut self,
        user_id: UserId,
    ) -> Result<bool, ToDoValidationError> {
        if self.is_owned_by(user_id) {
            return Err(ToDoValidationError::OwnerIsCollaborator(user_id));
        }
        Ok(self.collaborators.insert(user_id))
    }

    /// Removes a collaborator. Returns `false` when the user was not a member.
    pub(crate) fn remove_collaborator(&mut self, user_id: UserId) -> bool {
        self.collaborators.remove(&user_id)
    }

    /// Checks the owner/collaborator separation.
    ///
    /// Deserialized values bypass `add_collaborator`, so write paths call this
    /// before touching storage.
    pub fn validate(&self) -> Result<(), ToDoValidationError> {
        if self.collaborators.contains(&self.owner_id) {
            return Err(ToDoValidationError::OwnerIsCollaborator(self.owner_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ToDo, ToDoValidationError};

    #[test]
    fn new_todo_is_unsaved_and_unshared() {
        let todo = ToDo::new("write report", 7);
        assert_eq!(todo.id(), None);
        assert_eq!(todo.owner_id(), 7);
        assert!(todo.collaborators().is_empty());
    }

    #[test]
    fn add_collaborator_is_idempotent() {
        let mut todo = ToDo::with_id(1, "plan", 1);
        assert!(todo.add_collaborator(2).unwrap());
        assert!(!todo.add_collaborator(2).unwrap());
        assert_eq!(todo.collaborators().len(), 1);
    }

    #[test]
    fn add_collaborator_rejects_owner() {
        let mut todo = ToDo::with_id(1, "plan", 1);
        let err = todo.add_collaborator(1).unwrap_err();
        assert_eq!(err, ToDoValidationError::OwnerIsCollaborator(1));
        assert!(todo.collaborators().is_empty());
    }

    #[test]
    fn remove_missing_collaborator_is_noop() {
        let mut todo = ToDo::with_id(1, "plan", 1);
        assert!(!todo.remove_collaborator(5));
    }

    #[test]
    fn validate_catches_owner_smuggled_through_serde() {
        let todo: ToDo = serde_json::from_str(
            r#"{"id":3,"title":"t","owner_id":4,"collaborators":[4,5]}"#,
        )
        .unwrap();
        assert_eq!(
            todo.validate(),
            Err(ToDoValidationError::OwnerIsCollaborator(4))
        );
    }
}
