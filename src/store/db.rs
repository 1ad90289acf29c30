// Vaultline — SQLite Database Management
//
// A single SQLite connection shared by every connection worker. Access is
// serialized through a mutex; callers hold the guard only for the duration
// of one repository operation, and it is released on every exit path when
// the guard drops.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use super::StoreError;

/// Serialized handle to the vault database.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.run_migrations()?;

        tracing::debug!(path = %path.display(), "Database opened");
        Ok(db)
    }

    /// Open a private in-memory database. Used by tests and ephemeral servers.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Acquire the connection for one operation.
    pub fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Create the schema if it does not exist yet.
    fn run_migrations(&self) -> Result<(), StoreError> {
        self.lock()?.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id                        INTEGER PRIMARY KEY AUTOINCREMENT,
                username                  TEXT NOT NULL UNIQUE,
                master_verifier           TEXT NOT NULL,
                security_question         TEXT,
                security_answer_verifier  TEXT,
                created_at                TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS categories (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                user_id     INTEGER NOT NULL REFERENCES users(id),
                UNIQUE(name, user_id)
            );

            CREATE TABLE IF NOT EXISTS entries (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                title       TEXT NOT NULL,
                entry_user  TEXT NOT NULL,
                url         TEXT NOT NULL,
                notes       TEXT NOT NULL,
                secret      TEXT NOT NULL,
                user_id     INTEGER NOT NULL REFERENCES users(id),
                category_id INTEGER NOT NULL REFERENCES categories(id),
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL,
                UNIQUE(title, user_id)
            );

            CREATE INDEX IF NOT EXISTS idx_entries_category
                ON entries(category_id);
            ",
        )?;

        tracing::debug!("Database migrations completed successfully");
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
