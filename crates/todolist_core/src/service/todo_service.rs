//! ToDo use-case service.
//!
//! # Responsibility
//! - Validate inputs and ownership rules above the repository layer.
//! - Provide save/read/delete/list and collaborator add/remove operations.
//!
//! # Invariants
//! - Lookup failures surface as `EntityNotFound`, never as empty results.
//! - The owner of a ToDo can be neither added nor removed as collaborator.
//! - Delete and collaborator changes run inside one transaction scope.

use crate::model::todo::{ToDo, ToDoId};
use crate::model::user::{User, UserId};
use crate::repo::error::{EntityKind, RepoError};
use crate::repo::todo_repo::ToDoRepository;
use crate::repo::tx::TransactionScope;
use crate::repo::user_repo::UserRepository;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const NULL_TODO_MESSAGE: &str = "Given ToDo cannot be null";

pub type ServiceResult<T> = Result<T, ToDoServiceError>;

/// Errors from ToDo service operations.
#[derive(Debug)]
pub enum ToDoServiceError {
    /// A required input was absent.
    NullReference(&'static str),
    /// The requested id does not resolve.
    EntityNotFound { entity: EntityKind, id: i64 },
    /// The user is the owner, so it cannot be treated as a collaborator.
    UserIsOwner { todo_id: ToDoId, user_id: UserId },
    /// Persistence-layer failure, passed through unchanged.
    Repo(RepoError),
}

impl Display for ToDoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NullReference(message) => write!(f, "{message}"),
            Self::EntityNotFound { entity, id } => write!(f, "{entity} (id={id}) was not found"),
            Self::UserIsOwner { todo_id, user_id } => write!(
                f,
                "User (id={user_id}) is the owner of ToDo (id={todo_id})"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ToDoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ToDoServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::EntityNotFound { entity, id },
            other => Self::Repo(other),
        }
    }
}

/// Business-rule facade over the ToDo and User stores.
pub struct ToDoService<T, U, S>
where
    T: ToDoRepository,
    U: UserRepository,
    S: TransactionScope,
{
    todos: T,
    users: U,
    scope: S,
}

impl<T, U, S> ToDoService<T, U, S>
where
    T: ToDoRepository,
    U: UserRepository,
    S: TransactionScope,
{
    pub fn new(todos: T, users: U, scope: S) -> Self {
        Self {
            todos,
            users,
            scope,
        }
    }

    /// Creates or updates a ToDo and returns the persisted value.
    ///
    /// Only the title and owner are written; the stored collaborator set is
    /// changed solely by `add_collaborator`/`remove_collaborator`.
    ///
    /// # Errors
    /// - `NullReference` when `todo` is `None`.
    /// - `EntityNotFound` when `todo` carries an id that is not stored.
    pub fn save(&self, todo: Option<ToDo>) -> ServiceResult<ToDo> {
        let todo = todo.ok_or(ToDoServiceError::NullReference(NULL_TODO_MESSAGE))?;
        let saved = self.todos.upsert(&todo)?;
        info!(
            "event=todo_save module=service status=ok todo_id={} inserted={}",
            saved.id().unwrap_or_default(),
            todo.id().is_none()
        );
        Ok(saved)
    }

    pub fn read_by_id(&self, id: ToDoId) -> ServiceResult<ToDo> {
        self.require_todo(id)
    }

    /// Deletes an existing ToDo. Nothing is deleted when the lookup fails.
    pub fn delete(&self, id: ToDoId) -> ServiceResult<()> {
        self.scope.run_in_transaction(|| {
            let todo = self.require_todo(id)?;
            self.todos.delete(&todo)?;
            Ok::<_, ToDoServiceError>(())
        })?;
        info!("event=todo_delete module=service status=ok todo_id={id}");
        Ok(())
    }

    /// Returns every ToDo in storage order.
    pub fn get_all(&self) -> ServiceResult<Vec<ToDo>> {
        Ok(self.todos.find_all()?)
    }

    /// Returns ToDos owned by `user_id`; empty when the user owns none.
    ///
    /// # Errors
    /// - `EntityNotFound` when `user_id` is not a known user.
    pub fn get_all_todo_of_user(&self, user_id: UserId) -> ServiceResult<Vec<ToDo>> {
        self.require_user(user_id)?;
        Ok(self.todos.find_by_owner_id(user_id)?)
    }

    /// Shares a ToDo with a user. Adding an existing collaborator is a no-op.
    ///
    /// # Errors
    /// - `EntityNotFound` for a missing ToDo (checked first) or User.
    /// - `UserIsOwner` when the user owns the ToDo.
    pub fn add_collaborator(&self, todo_id: ToDoId, user_id: UserId) -> ServiceResult<ToDo> {
        let saved = self.scope.run_in_transaction(|| {
            let (mut todo, user) = self.resolve_pair(todo_id, user_id)?;
            todo.add_collaborator(user.id)
                .map_err(|_| ToDoServiceError::UserIsOwner { todo_id, user_id })?;
            self.todos.link_collaborator(todo_id, user.id)?;
            Ok::<_, ToDoServiceError>(todo)
        })?;
        info!(
            "event=collaborator_add module=service status=ok todo_id={todo_id} user_id={user_id}"
        );
        Ok(saved)
    }

    /// Revokes a user's access. Removing a non-member is a no-op.
    ///
    /// # Errors
    /// - `EntityNotFound` for a missing ToDo (checked first) or User.
    /// - `UserIsOwner` when the user owns the ToDo.
    pub fn remove_collaborator(&self, todo_id: ToDoId, user_id: UserId) -> ServiceResult<ToDo> {
        let saved = self.scope.run_in_transaction(|| {
            let (mut todo, user) = self.resolve_pair(todo_id, user_id)?;
            todo.remove_collaborator(user.id);
            self.todos.unlink_collaborator(todo_id, user.id)?;
            Ok::<_, ToDoServiceError>(todo)
        })?;
        info!(
            "event=collaborator_remove module=service status=ok todo_id={todo_id} user_id={user_id}"
        );
        Ok(saved)
    }

    fn resolve_pair(&self, todo_id: ToDoId, user_id: UserId) -> ServiceResult<(ToDo, User)> {
        let todo = self.require_todo(todo_id)?;
        let user = self.require_user(user_id)?;
        if todo.is_owned_by(user.id) {
            warn!(
                "event=collaborator_rejected module=service status=error reason=owner todo_id={todo_id} user_id={user_id}"
            );
            return Err(ToDoServiceError::UserIsOwner { todo_id, user_id });
        }
        Ok((todo, user))
    }

    fn require_todo(&self, id: ToDoId) -> ServiceResult<ToDo> {
        self.todos
            .find_by_id(id)?
            .ok_or_else(|| not_found(EntityKind::ToDo, id))
    }

    fn require_user(&self, id: UserId) -> ServiceResult<User> {
        self.users
            .find_by_id(id)?
            .ok_or_else(|| not_found(EntityKind::User, id))
    }
}

fn not_found(entity: EntityKind, id: i64) -> ToDoServiceError {
    warn!("event=lookup module=service status=not_found entity={entity} id={id}");
    ToDoServiceError::EntityNotFound { entity, id }
}

#[cfg(test)]
mod tests {
    use super::{ToDoService, ToDoServiceError};
    use crate::model::todo::ToDo;
    use crate::model::user::User;
    use crate::repo::error::{EntityKind, RepoError};
    use crate::repo::todo_repo::MockToDoRepository;
    use crate::repo::tx::TransactionScope;
    use crate::repo::user_repo::MockUserRepository;

    const TODO_ID: i64 = 1;
    const OWNER_ID: i64 = 2;
    const OTHER_ID: i64 = 3;

    struct Inline;

    impl TransactionScope for Inline {
        fn run_in_transaction<T, E, F>(&self, op: F) -> Result<T, E>
        where
            F: FnOnce() -> Result<T, E>,
            E: From<RepoError>,
        {
            op()
        }
    }

    fn owned_todo() -> ToDo {
        ToDo::with_id(TODO_ID, "title", OWNER_ID)
    }

    fn service(
        todos: MockToDoRepository,
        users: MockUserRepository,
    ) -> ToDoService<MockToDoRepository, MockUserRepository, Inline> {
        ToDoService::new(todos, users, Inline)
    }

    #[test]
    fn save_none_reports_null_reference() {
        let mut todos = MockToDoRepository::new();
        todos.expect_upsert().times(0);
        let service = service(todos, MockUserRepository::new());

        let err = service.save(None).unwrap_err();
        assert!(matches!(err, ToDoServiceError::NullReference(_)));
        assert_eq!(err.to_string(), "Given ToDo cannot be null");
    }

    #[test]
    fn save_returns_persisted_value_with_assigned_id() {
        let mut todos = MockToDoRepository::new();
        todos
            .expect_upsert()
            .times(1)
            .withf(|todo| todo.id().is_none())
            .return_once(|_| Ok(owned_todo()));
        let service = service(todos, MockUserRepository::new());

        let saved = service.save(Some(ToDo::new("title", OWNER_ID))).unwrap();
        assert_eq!(saved.id(), Some(TODO_ID));
    }

    #[test]
    fn delete_missing_todo_never_calls_delete() {
        let mut todos = MockToDoRepository::new();
        todos.expect_find_by_id().times(1).return_once(|_| Ok(None));
        todos.expect_delete().times(0);
        let service = service(todos, MockUserRepository::new());

        let err = service.delete(TODO_ID).unwrap_err();
        assert_eq!(err.to_string(), "ToDo (id=1) was not found");
    }

    #[test]
    fn delete_existing_todo_looks_up_once_and_deletes_once() {
        let mut todos = MockToDoRepository::new();
        todos
            .expect_find_by_id()
            .times(1)
            .return_once(|_| Ok(Some(owned_todo())));
        todos
            .expect_delete()
            .times(1)
            .withf(|todo| todo.id() == Some(TODO_ID))
            .return_once(|_| Ok(()));
        let service = service(todos, MockUserRepository::new());

        service.delete(TODO_ID).unwrap();
    }

    #[test]
    fn get_all_returns_every_stored_todo() {
        let mut todos = MockToDoRepository::new();
        todos.expect_find_all().times(1).return_once(|| {
            Ok(vec![
                ToDo::with_id(1, "a", OWNER_ID),
                ToDo::with_id(2, "b", OWNER_ID),
                ToDo::with_id(3, "c", OWNER_ID),
            ])
        });
        let service = service(todos, MockUserRepository::new());

        assert_eq!(service.get_all().unwrap().len(), 3);
    }

    #[test]
    fn get_all_todo_of_unknown_user_skips_owner_query() {
        let mut todos = MockToDoRepository::new();
        todos.expect_find_by_owner_id().times(0);
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().times(1).return_once(|_| Ok(None));
        let service = service(todos, users);

        let err = service.get_all_todo_of_user(OWNER_ID).unwrap_err();
        assert!(matches!(
            err,
            ToDoServiceError::EntityNotFound {
                entity: EntityKind::User,
                id: OWNER_ID
            }
        ));
    }

    #[test]
    fn get_all_todo_of_user_without_todos_is_empty() {
        let mut todos = MockToDoRepository::new();
        todos
            .expect_find_by_owner_id()
            .times(1)
            .return_once(|_| Ok(Vec::new()));
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|id| Ok(Some(User::new(id, "owner"))));
        let service = service(todos, users);

        assert!(service.get_all_todo_of_user(OWNER_ID).unwrap().is_empty());
    }

    #[test]
    fn add_owner_as_collaborator_is_rejected_without_write() {
        let mut todos = MockToDoRepository::new();
        let mut existing = owned_todo();
        existing.add_collaborator(OTHER_ID).unwrap();
        todos
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(existing)));
        todos.expect_link_collaborator().times(0);
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|id| Ok(Some(User::new(id, "owner"))));
        let service = service(todos, users);

        let err = service.add_collaborator(TODO_ID, OWNER_ID).unwrap_err();
        assert!(matches!(
            err,
            ToDoServiceError::UserIsOwner {
                todo_id: TODO_ID,
                user_id: OWNER_ID
            }
        ));
    }

    #[test]
    fn add_collaborator_links_user_without_rewriting_todo() {
        let mut todos = MockToDoRepository::new();
        todos
            .expect_find_by_id()
            .return_once(|_| Ok(Some(owned_todo())));
        todos.expect_upsert().times(0);
        todos
            .expect_link_collaborator()
            .times(1)
            .withf(|todo_id, user_id| *todo_id == TODO_ID && *user_id == OTHER_ID)
            .return_once(|_, _| Ok(()));
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|id| Ok(Some(User::new(id, "friend"))));
        let service = service(todos, users);

        let saved = service.add_collaborator(TODO_ID, OTHER_ID).unwrap();
        assert!(saved.collaborators().contains(&OTHER_ID));
    }

    #[test]
    fn missing_todo_takes_precedence_over_missing_user() {
        let mut todos = MockToDoRepository::new();
        todos.expect_find_by_id().return_once(|_| Ok(None));
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().times(0);
        let service = service(todos, users);

        let err = service.remove_collaborator(TODO_ID, OTHER_ID).unwrap_err();
        assert!(matches!(
            err,
            ToDoServiceError::EntityNotFound {
                entity: EntityKind::ToDo,
                id: TODO_ID
            }
        ));
    }

    #[test]
    fn remove_collaborator_unlinks_member() {
        let mut todos = MockToDoRepository::new();
        let mut existing = owned_todo();
        existing.add_collaborator(OTHER_ID).unwrap();
        todos
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(existing)));
        todos
            .expect_unlink_collaborator()
            .times(1)
            .withf(|todo_id, user_id| *todo_id == TODO_ID && *user_id == OTHER_ID)
            .return_once(|_, _| Ok(()));
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(|id| Ok(Some(User::new(id, "friend"))));
        let service = service(todos, users);

        let saved = service.remove_collaborator(TODO_ID, OTHER_ID).unwrap();
        assert!(saved.collaborators().is_empty());
    }

    #[test]
    fn remove_collaborator_with_missing_user_reports_user() {
        let mut todos = MockToDoRepository::new();
        todos
            .expect_find_by_id()
            .return_once(|_| Ok(Some(owned_todo())));
        todos.expect_unlink_collaborator().times(0);
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(|_| Ok(None));
        let service = service(todos, users);

        let err = service.remove_collaborator(TODO_ID, OTHER_ID).unwrap_err();
        assert_eq!(err.to_string(), "User (id=3) was not found");
    }

    #[test]
    fn repository_failures_pass_through() {
        let mut todos = MockToDoRepository::new();
        todos
            .expect_find_all()
            .return_once(|| Err(RepoError::InvalidData("broken row".to_string())));
        let service = service(todos, MockUserRepository::new());

        let err = service.get_all().unwrap_err();
        assert!(matches!(err, ToDoServiceError::Repo(RepoError::InvalidData(_))));
    }
}
