//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `todolist_core` linkage.
//! - Run one owner/collaborator round trip against a real database.
//!
//! Environment:
//! - `TODOLIST_DB`: database file; defaults to in-memory.
//! - `TODOLIST_LOG_DIR`: absolute directory for rolling logs; logging stays
//!   off when unset.
//! - `TODOLIST_LOG_LEVEL`: overrides the build-mode default level.

use log::{error, info};
use std::error::Error;
use std::path::PathBuf;
use todolist_core::db::{open_db, open_db_in_memory};
use todolist_core::{
    default_log_level, init_logging, SqliteToDoRepository, SqliteTransactionScope,
    SqliteUserRepository, ToDo, ToDoService, UserRepository,
};

const DB_PATH_ENV: &str = "TODOLIST_DB";
const LOG_DIR_ENV: &str = "TODOLIST_LOG_DIR";
const LOG_LEVEL_ENV: &str = "TODOLIST_LOG_LEVEL";

fn main() {
    println!("todolist_core ping={}", todolist_core::ping());
    println!("todolist_core version={}", todolist_core::core_version());

    let log_level = std::env::var(LOG_LEVEL_ENV).ok();
    match setup_logging(std::env::var(LOG_DIR_ENV).ok(), log_level.as_deref()) {
        Ok(Some(dir)) => println!("logging to {}", dir.display()),
        Ok(None) => {}
        Err(err) => eprintln!("logging disabled: {err}"),
    }

    if let Err(err) = run_demo() {
        error!("event=cli_demo module=cli status=error error={err}");
        eprintln!("demo failed: {err}");
        std::process::exit(1);
    }
}

/// Starts core logging when a log directory is configured.
///
/// Returns the active directory, or `None` when no directory was given.
fn setup_logging(
    log_dir: Option<String>,
    level: Option<&str>,
) -> Result<Option<PathBuf>, String> {
    let Some(log_dir) = log_dir.filter(|dir| !dir.trim().is_empty()) else {
        return Ok(None);
    };
    init_logging(level.unwrap_or_else(|| default_log_level()), &log_dir)?;
    Ok(Some(PathBuf::from(log_dir.trim())))
}

fn run_demo() -> Result<(), Box<dyn Error>> {
    let conn = match std::env::var_os(DB_PATH_ENV) {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };

    let users = SqliteUserRepository::try_new(&conn)?;
    let owner = users.create_user("owner")?;
    let friend = users.create_user("friend")?;

    let service = ToDoService::new(
        SqliteToDoRepository::try_new(&conn)?,
        users,
        SqliteTransactionScope::new(&conn),
    );
    let todo = service.save(Some(ToDo::new("try the todolist core", owner.id)))?;
    let todo_id = todo.id().ok_or("saved todo has no id")?;
    let shared = service.add_collaborator(todo_id, friend.id)?;
    info!("event=cli_demo module=cli status=ok todo_id={todo_id}");

    println!(
        "todo id={} owner={} collaborators={:?}",
        todo_id,
        shared.owner_id(),
        shared.collaborators()
    );
    println!(
        "owned by {}: {}",
        owner.name,
        service.get_all_todo_of_user(owner.id)?.len()
    );
    Ok(())
}
