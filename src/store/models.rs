// Vaultline — Vault data models
//
// SECURITY: verifiers and entry secrets are private fields. They are never
// included in Debug output or log messages; the entry secret leaves the
// model only through `secret()` and the explicit listing line.

use std::fmt;

use chrono::{DateTime, Utc};

/// A registered account.
pub struct User {
    pub id: i64,
    pub username: String,
    master_verifier: String,
    pub security_question: Option<String>,
    security_answer_verifier: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: i64,
        username: String,
        master_verifier: String,
        security_question: Option<String>,
        security_answer_verifier: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            master_verifier,
            security_question,
            security_answer_verifier,
            created_at,
        }
    }

    pub fn master_verifier(&self) -> &str {
        &self.master_verifier
    }

    pub fn security_answer_verifier(&self) -> Option<&str> {
        self.security_answer_verifier.as_deref()
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("master_verifier", &"[REDACTED]")
            .field("security_question", &self.security_question)
            .field(
                "security_answer_verifier",
                &self.security_answer_verifier.as_ref().map(|_| "[REDACTED]"),
            )
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Input struct for registering a user. Verifiers are already derived.
pub struct NewUser {
    pub username: String,
    pub master_verifier: String,
    pub security_question: Option<String>,
    pub security_answer_verifier: Option<String>,
}

/// A named grouping of entries, unique per owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}

/// A titled secret record inside a category.
pub struct Entry {
    pub id: i64,
    pub title: String,
    pub entry_user: String,
    pub url: String,
    pub notes: String,
    secret: String,
    pub user_id: i64,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        title: String,
        entry_user: String,
        url: String,
        notes: String,
        secret: String,
        user_id: i64,
        category_id: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            entry_user,
            url,
            notes,
            secret,
            user_id,
            category_id,
            created_at,
            updated_at,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// The single-line rendering sent to the owner by LIST_ENTRIES.
    /// Contains the secret; never log it.
    pub fn listing_line(&self) -> String {
        format!(
            "Title:{}, User:{}, URL:{}, Notes:{}, Pass:{}",
            self.title, self.entry_user, self.url, self.notes, self.secret
        )
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("entry_user", &self.entry_user)
            .field("url", &self.url)
            .field("notes", &self.notes)
            .field("secret", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("category_id", &self.category_id)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Every user-editable field of an entry, as written by NEW_ENTRY and MOD_ENTRY.
pub struct EntryFields {
    pub title: String,
    pub entry_user: String,
    pub url: String,
    pub notes: String,
    pub secret: String,
}

impl fmt::Debug for EntryFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryFields")
            .field("title", &self.title)
            .field("entry_user", &self.entry_user)
            .field("url", &self.url)
            .field("notes", &self.notes)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> Entry {
        let now = Utc::now();
        Entry::new(
            7,
            "Email".to_string(),
            "alice@x".to_string(),
            "http://x".to_string(),
            "notes".to_string(),
            "pw1".to_string(),
            1,
            2,
            now,
            now,
        )
    }

    #[test]
    fn test_entry_debug_redacts_secret() {
        let debug = format!("{:?}", sample_entry());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("pw1"));
    }

    #[test]
    fn test_listing_line_has_every_field() {
        assert_eq!(
            sample_entry().listing_line(),
            "Title:Email, User:alice@x, URL:http://x, Notes:notes, Pass:pw1"
        );
    }

    #[test]
    fn test_user_debug_redacts_verifiers() {
        let user = User::new(
            1,
            "alice".to_string(),
            "$argon2id$master".to_string(),
            Some("Pet?".to_string()),
            Some("$argon2id$answer".to_string()),
            Utc::now(),
        );
        let debug = format!("{:?}", user);
        assert!(!debug.contains("$argon2id$"));
        assert!(debug.contains("Pet?"));
    }
}
