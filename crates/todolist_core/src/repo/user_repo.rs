//! User repository contract and SQLite implementation.

use crate::model::user::{User, UserId};
use crate::repo::ensure_connection_ready;
use crate::repo::error::RepoResult;
use rusqlite::{Connection, OptionalExtension, Row};

/// User-store contract consumed by `ToDoService`.
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository {
    fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Persists a new user and returns it with its assigned id.
    fn create_user(&self, name: &str) -> RepoResult<User>;
    fn find_all(&self) -> RepoResult<Vec<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row("SELECT id, name FROM users WHERE id = ?1;", [id], parse_user_row)
            .optional()?;
        Ok(user)
    }

    fn create_user(&self, name: &str) -> RepoResult<User> {
        self.conn
            .execute("INSERT INTO users (name) VALUES (?1);", [name])?;
        Ok(User::new(self.conn.last_insert_rowid(), name))
    }

    fn find_all(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM users ORDER BY id ASC;")?;
        let users = stmt
            .query_map([], parse_user_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User::new(row.get("id")?, row.get::<_, String>("name")?))
}
