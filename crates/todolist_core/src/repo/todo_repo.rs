//! ToDo repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide upsert/find/delete/list APIs over `todos`.
//! - Own the `todo_collaborators` link table through single-link operations.
//!
//! # Invariants
//! - Write paths call `ToDo::validate()` before SQL mutations.
//! - Upsert writes the `todos` row only; it never touches collaborator links.
//! - Upsert never changes the owner and never invents ids for missing rows.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::run_in_savepoint;
use crate::model::todo::{ToDo, ToDoId};
use crate::model::user::UserId;
use crate::repo::ensure_connection_ready;
use crate::repo::error::{EntityKind, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Params, Row};

const TODO_SELECT_SQL: &str = "SELECT id, title, owner_id FROM todos";

/// ToDo-store contract consumed by `ToDoService`.
#[cfg_attr(test, mockall::automock)]
pub trait ToDoRepository {
    /// Inserts when `todo.id()` is `None`, otherwise updates the stored row.
    /// Collaborators in `todo` are ignored. Returns the stored representation.
    fn upsert(&self, todo: &ToDo) -> RepoResult<ToDo>;
    fn find_by_id(&self, id: ToDoId) -> RepoResult<Option<ToDo>>;
    fn delete(&self, todo: &ToDo) -> RepoResult<()>;
    /// Returns every ToDo ordered by id.
    fn find_all(&self) -> RepoResult<Vec<ToDo>>;
    fn find_by_owner_id(&self, owner_id: UserId) -> RepoResult<Vec<ToDo>>;
    /// Adds one collaborator link. Linking an existing member is a no-op.
    fn link_collaborator(&self, todo_id: ToDoId, user_id: UserId) -> RepoResult<()>;
    /// Drops one collaborator link. Unlinking a non-member is a no-op.
    fn unlink_collaborator(&self, todo_id: ToDoId, user_id: UserId) -> RepoResult<()>;
}

/// SQLite-backed ToDo repository.
pub struct SqliteToDoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteToDoRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn write_row(&self, todo: &ToDo) -> RepoResult<ToDoId> {
        let Some(id) = todo.id() else {
            self.conn.execute(
                "INSERT INTO todos (title, owner_id) VALUES (?1, ?2);",
                params![todo.title(), todo.owner_id()],
            )?;
            return Ok(self.conn.last_insert_rowid());
        };

        let changed = self.conn.execute(
            "UPDATE todos
             SET
                title = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND owner_id = ?3;",
            params![id, todo.title(), todo.owner_id()],
        )?;
        if changed == 0 {
            let stored_owner: Option<UserId> = self
                .conn
                .query_row("SELECT owner_id FROM todos WHERE id = ?1;", [id], |row| {
                    row.get(0)
                })
                .optional()?;
            return Err(match stored_owner {
                None => RepoError::NotFound {
                    entity: EntityKind::ToDo,
                    id,
                },
                Some(_) => {
                    RepoError::InvalidData(format!("owner of ToDo (id={id}) cannot change"))
                }
            });
        }
        Ok(id)
    }

    fn load_many(&self, sql: &str, bind: impl Params) -> RepoResult<Vec<ToDo>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(self.conn, row)?);
        }
        Ok(todos)
    }
}

impl ToDoRepository for SqliteToDoRepository<'_> {
    fn upsert(&self, todo: &ToDo) -> RepoResult<ToDo> {
        todo.validate()?;

        run_in_savepoint(self.conn, "todo_upsert", || -> RepoResult<ToDo> {
            let id = self.write_row(todo)?;
            self.find_by_id(id)?.ok_or_else(|| {
                RepoError::InvalidData(format!("ToDo (id={id}) missing in read-back"))
            })
        })
    }

    fn find_by_id(&self, id: ToDoId) -> RepoResult<Option<ToDo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TODO_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_todo_row(self.conn, row)?));
        }
        Ok(None)
    }

    fn delete(&self, todo: &ToDo) -> RepoResult<()> {
        let id = todo
            .id()
            .ok_or_else(|| RepoError::InvalidData("cannot delete an unsaved ToDo".to_string()))?;

        let changed = self.conn.execute("DELETE FROM todos WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::ToDo,
                id,
            });
        }
        Ok(())
    }

    fn find_all(&self) -> RepoResult<Vec<ToDo>> {
        self.load_many(&format!("{TODO_SELECT_SQL} ORDER BY id ASC;"), [])
    }

    fn find_by_owner_id(&self, owner_id: UserId) -> RepoResult<Vec<ToDo>> {
        self.load_many(
            &format!("{TODO_SELECT_SQL} WHERE owner_id = ?1 ORDER BY id ASC;"),
            [owner_id],
        )
    }

    fn link_collaborator(&self, todo_id: ToDoId, user_id: UserId) -> RepoResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO todo_collaborators (todo_id, user_id) VALUES (?1, ?2);",
            params![todo_id, user_id],
        )?;
        Ok(())
    }

    fn unlink_collaborator(&self, todo_id: ToDoId, user_id: UserId) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM todo_collaborators WHERE todo_id = ?1 AND user_id = ?2;",
            params![todo_id, user_id],
        )?;
        Ok(())
    }
}

fn parse_todo_row(conn: &Connection, row: &Row<'_>) -> RepoResult<ToDo> {
    let id: ToDoId = row.get("id")?;
    let mut todo = ToDo::with_id(id, row.get::<_, String>("title")?, row.get("owner_id")?);
    for user_id in load_collaborator_ids(conn, id)? {
        todo.add_collaborator(user_id)?;
    }
    Ok(todo)
}

fn load_collaborator_ids(conn: &Connection, todo_id: ToDoId) -> RepoResult<Vec<UserId>> {
    let mut stmt = conn.prepare(
        "SELECT user_id
         FROM todo_collaborators
         WHERE todo_id = ?1
         ORDER BY user_id ASC;",
    )?;
    let mut rows = stmt.query([todo_id])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}
