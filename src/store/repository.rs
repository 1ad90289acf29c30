// Vaultline — Credential Store Repository
//
// CRUD over users, categories and entries. Vault operations take the owner's
// username and resolve it inside the same locked section, so one user can
// never read or write another user's rows. Unique-constraint violations are
// reported as `StoreError::Conflict`, missing rows as `StoreError::NotFound`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::db::Database;
use super::models::{Category, Entry, EntryFields, NewUser, User};
use super::StoreError;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over vault storage operations.
pub trait VaultStore: Send + Sync {
    /// Look up a user by username.
    fn find_user(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Register a user. `Conflict` if the username is taken.
    fn insert_user(&self, user: NewUser) -> Result<i64, StoreError>;

    /// Replace a user's master verifier. `NotFound` if the user is missing.
    fn update_master_verifier(&self, username: &str, verifier: &str) -> Result<(), StoreError>;

    /// Look up one of the owner's categories by name.
    fn find_category(&self, owner: &str, name: &str) -> Result<Option<Category>, StoreError>;

    /// Create a category. `Conflict` if the owner already has one with this name.
    fn insert_category(&self, owner: &str, name: &str) -> Result<i64, StoreError>;

    /// All of the owner's categories in creation order.
    fn list_categories(&self, owner: &str) -> Result<Vec<Category>, StoreError>;

    /// Delete a category and every entry in it as one transaction.
    /// Returns the number of entries removed.
    fn delete_category(&self, owner: &str, name: &str) -> Result<usize, StoreError>;

    /// Look up one of the owner's entries by title.
    fn find_entry(&self, owner: &str, title: &str) -> Result<Option<Entry>, StoreError>;

    /// Create an entry in the owner's category. `NotFound` if the category
    /// is missing, `Conflict` if the title is already used by this owner.
    fn insert_entry(
        &self,
        owner: &str,
        category: &str,
        fields: EntryFields,
    ) -> Result<i64, StoreError>;

    /// All of the owner's entries in the named category, in creation order.
    fn list_entries(&self, owner: &str, category: &str) -> Result<Vec<Entry>, StoreError>;

    /// Rewrite every field of the entry currently titled `old_title`.
    fn update_entry(
        &self,
        owner: &str,
        old_title: &str,
        fields: EntryFields,
    ) -> Result<(), StoreError>;

    /// Delete one of the owner's entries by title.
    fn delete_entry(&self, owner: &str, title: &str) -> Result<(), StoreError>;
}

// ─── SQLite Implementation ──────────────────────────────────────────────────

const ENTRY_COLUMNS: &str = "e.id, e.title, e.entry_user, e.url, e.notes, e.secret,
                             e.user_id, e.category_id, e.created_at, e.updated_at";

#[derive(Clone)]
pub struct SqliteVaultStore {
    db: Arc<Database>,
}

impl SqliteVaultStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        let created_at: String = row.get(5)?;
        Ok(User::new(
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            parse_timestamp(&created_at),
        ))
    }

    fn row_to_category(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            user_id: row.get(2)?,
        })
    }

    fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entry> {
        let created_at: String = row.get(8)?;
        let updated_at: String = row.get(9)?;
        Ok(Entry::new(
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
            parse_timestamp(&created_at),
            parse_timestamp(&updated_at),
        ))
    }
}

/// Resolve the owner's row id.
fn owner_id(conn: &Connection, username: &str) -> Result<i64, StoreError> {
    conn.query_row(
        "SELECT id FROM users WHERE username = ?1",
        params![username],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| StoreError::NotFound(format!("user '{}'", username)))
}

fn category_id(conn: &Connection, owner_id: i64, name: &str) -> Result<Option<i64>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT id FROM categories WHERE user_id = ?1 AND name = ?2",
            params![owner_id, name],
            |row| row.get(0),
        )
        .optional()?)
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl VaultStore for SqliteVaultStore {
    fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        let conn = self.db.lock()?;
        Ok(conn
            .query_row(
                "SELECT id, username, master_verifier, security_question,
                        security_answer_verifier, created_at
                 FROM users WHERE username = ?1",
                params![username],
                Self::row_to_user,
            )
            .optional()?)
    }

    fn insert_user(&self, user: NewUser) -> Result<i64, StoreError> {
        let conn = self.db.lock()?;
        conn.execute(
            "INSERT INTO users
                (username, master_verifier, security_question,
                 security_answer_verifier, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.username,
                user.master_verifier,
                user.security_question,
                user.security_answer_verifier,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| StoreError::from_write(e, format!("user '{}'", user.username)))?;

        let id = conn.last_insert_rowid();
        tracing::info!(
            user_id = id,
            username = %user.username,
            with_question = user.security_question.is_some(),
            "User registered"
        );
        Ok(id)
    }

    fn update_master_verifier(&self, username: &str, verifier: &str) -> Result<(), StoreError> {
        let affected = self.db.lock()?.execute(
            "UPDATE users SET master_verifier = ?1 WHERE username = ?2",
            params![verifier, username],
        )?;

        if affected == 0 {
            return Err(StoreError::NotFound(format!("user '{}'", username)));
        }
        tracing::info!(username = %username, "Master verifier updated");
        Ok(())
    }

    fn find_category(&self, owner: &str, name: &str) -> Result<Option<Category>, StoreError> {
        let conn = self.db.lock()?;
        Ok(conn
            .query_row(
                "SELECT c.id, c.name, c.user_id
                 FROM categories c JOIN users u ON u.id = c.user_id
                 WHERE u.username = ?1 AND c.name = ?2",
                params![owner, name],
                Self::row_to_category,
            )
            .optional()?)
    }

    fn insert_category(&self, owner: &str, name: &str) -> Result<i64, StoreError> {
        let conn = self.db.lock()?;
        let user_id = owner_id(&conn, owner)?;

        conn.execute(
            "INSERT INTO categories (name, user_id) VALUES (?1, ?2)",
            params![name, user_id],
        )
        .map_err(|e| StoreError::from_write(e, format!("category '{}'", name)))?;

        let id = conn.last_insert_rowid();
        tracing::debug!(user_id, category_id = id, "Category created");
        Ok(id)
    }

    fn list_categories(&self, owner: &str) -> Result<Vec<Category>, StoreError> {
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.name, c.user_id
             FROM categories c JOIN users u ON u.id = c.user_id
             WHERE u.username = ?1
             ORDER BY c.id ASC",
        )?;

        let rows = stmt.query_map(params![owner], Self::row_to_category)?;

        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }
        Ok(categories)
    }

    fn delete_category(&self, owner: &str, name: &str) -> Result<usize, StoreError> {
        let mut conn = self.db.lock()?;
        // Dropping `tx` without commit rolls both deletes back.
        let tx = conn.transaction()?;

        let user_id = owner_id(&tx, owner)?;
        let cat_id = category_id(&tx, user_id, name)?
            .ok_or_else(|| StoreError::NotFound(format!("category '{}'", name)))?;

        let removed = tx.execute(
            "DELETE FROM entries WHERE category_id = ?1 AND user_id = ?2",
            params![cat_id, user_id],
        )?;
        tx.execute(
            "DELETE FROM categories WHERE id = ?1 AND user_id = ?2",
            params![cat_id, user_id],
        )?;

        tx.commit()?;

        tracing::info!(
            user_id,
            category_id = cat_id,
            entries_removed = removed,
            "Category deleted"
        );
        Ok(removed)
    }

    fn find_entry(&self, owner: &str, title: &str) -> Result<Option<Entry>, StoreError> {
        let conn = self.db.lock()?;
        let sql = format!(
            "SELECT {ENTRY_COLUMNS}
             FROM entries e JOIN users u ON u.id = e.user_id
             WHERE u.username = ?1 AND e.title = ?2"
        );
        Ok(conn
            .query_row(&sql, params![owner, title], Self::row_to_entry)
            .optional()?)
    }

    fn insert_entry(
        &self,
        owner: &str,
        category: &str,
        fields: EntryFields,
    ) -> Result<i64, StoreError> {
        let conn = self.db.lock()?;
        let user_id = owner_id(&conn, owner)?;
        let cat_id = category_id(&conn, user_id, category)?
            .ok_or_else(|| StoreError::NotFound(format!("category '{}'", category)))?;

        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO entries
                (title, entry_user, url, notes, secret, user_id, category_id,
                 created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                fields.title,
                fields.entry_user,
                fields.url,
                fields.notes,
                fields.secret,
                user_id,
                cat_id,
                now,
                now,
            ],
        )
        .map_err(|e| StoreError::from_write(e, format!("entry '{}'", fields.title)))?;

        let id = conn.last_insert_rowid();
        tracing::debug!(user_id, category_id = cat_id, entry_id = id, "Entry created");
        Ok(id)
    }

    fn list_entries(&self, owner: &str, category: &str) -> Result<Vec<Entry>, StoreError> {
        let conn = self.db.lock()?;
        let sql = format!(
            "SELECT {ENTRY_COLUMNS}
             FROM entries e
             JOIN users u ON u.id = e.user_id
             JOIN categories c ON c.id = e.category_id
             WHERE u.username = ?1 AND c.name = ?2
             ORDER BY e.id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt.query_map(params![owner, category], Self::row_to_entry)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn update_entry(
        &self,
        owner: &str,
        old_title: &str,
        fields: EntryFields,
    ) -> Result<(), StoreError> {
        let conn = self.db.lock()?;
        let user_id = owner_id(&conn, owner)?;

        let affected = conn
            .execute(
                "UPDATE entries
                 SET title = ?1, entry_user = ?2, url = ?3, notes = ?4, secret = ?5,
                     updated_at = ?6
                 WHERE title = ?7 AND user_id = ?8",
                params![
                    fields.title,
                    fields.entry_user,
                    fields.url,
                    fields.notes,
                    fields.secret,
                    Utc::now().to_rfc3339(),
                    old_title,
                    user_id,
                ],
            )
            .map_err(|e| StoreError::from_write(e, format!("entry '{}'", fields.title)))?;

        if affected == 0 {
            return Err(StoreError::NotFound(format!("entry '{}'", old_title)));
        }
        tracing::debug!(user_id, "Entry updated");
        Ok(())
    }

    fn delete_entry(&self, owner: &str, title: &str) -> Result<(), StoreError> {
        let conn = self.db.lock()?;
        let user_id = owner_id(&conn, owner)?;

        let affected = conn.execute(
            "DELETE FROM entries WHERE title = ?1 AND user_id = ?2",
            params![title, user_id],
        )?;

        if affected == 0 {
            return Err(StoreError::NotFound(format!("entry '{}'", title)));
        }
        tracing::debug!(user_id, "Entry deleted");
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
