// Vaultline — Command Parsing
//
// Splits a message into fields and matches the verb together with the exact
// number of arguments. Empty fields are kept so handlers can report missing
// values; anything that does not match a known (verb, arity) pair is
// rejected before any handler runs.

use super::protocol::{trim_line_ending, ProtocolError, FIELD_DELIMITER, MAX_FIELDS};

/// A recognized command with its borrowed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Register {
        username: &'a str,
        password: &'a str,
    },
    RegisterWithQuestion {
        username: &'a str,
        password: &'a str,
        question: &'a str,
        answer: &'a str,
    },
    Login {
        username: &'a str,
        password: &'a str,
    },
    Logout,
    SecurityQuestion {
        username: &'a str,
    },
    RecoverPassword {
        username: &'a str,
        answer: &'a str,
    },
    ChangePassword {
        username: &'a str,
        old_password: &'a str,
        new_password: &'a str,
    },
    NewCategory {
        name: &'a str,
    },
    ListCategories,
    DeleteCategory {
        name: &'a str,
    },
    NewEntry {
        category: &'a str,
        entry: EntryArgs<'a>,
    },
    ListEntries {
        category: &'a str,
    },
    ModifyEntry {
        old_title: &'a str,
        entry: EntryArgs<'a>,
    },
    DeleteEntry {
        title: &'a str,
    },
}

/// The five entry fields shared by NEW_ENTRY and MOD_ENTRY.
#[derive(Clone, PartialEq, Eq)]
pub struct EntryArgs<'a> {
    pub title: &'a str,
    pub user: &'a str,
    pub url: &'a str,
    pub notes: &'a str,
    pub password: &'a str,
}

impl std::fmt::Debug for EntryArgs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryArgs")
            .field("title", &self.title)
            .field("user", &self.user)
            .field("url", &self.url)
            .field("notes", &self.notes)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl<'a> Command<'a> {
    /// Parse one inbound message.
    pub fn parse(message: &'a str) -> Result<Self, ProtocolError> {
        let fields = split_fields(message)?;
        Self::from_fields(&fields).ok_or(ProtocolError::Invalid)
    }

    /// Match verb and exact arity.
    fn from_fields(fields: &[&'a str]) -> Option<Self> {
        let command = match *fields {
            ["REGISTER", username, password] => Self::Register { username, password },
            ["REGISTER_SEC", username, password, question, answer] => {
                Self::RegisterWithQuestion {
                    username,
                    password,
                    question,
                    answer,
                }
            }
            ["LOGIN", username, password] => Self::Login { username, password },
            ["LOGOUT"] => Self::Logout,
            ["SEC_QUESTION", username] => Self::SecurityQuestion { username },
            ["RECOVER_PASS", username, answer] => Self::RecoverPassword { username, answer },
            ["CHANGE_PASS", username, old_password, new_password] => Self::ChangePassword {
                username,
                old_password,
                new_password,
            },
            ["NEW_CAT", name] => Self::NewCategory { name },
            ["LIST_CATS"] => Self::ListCategories,
            ["DEL_CAT", name] => Self::DeleteCategory { name },
            ["NEW_ENTRY", category, title, user, url, notes, password] => Self::NewEntry {
                category,
                entry: EntryArgs {
                    title,
                    user,
                    url,
                    notes,
                    password,
                },
            },
            ["LIST_ENTRIES", category] => Self::ListEntries { category },
            ["MOD_ENTRY", old_title, title, user, url, notes, password] => Self::ModifyEntry {
                old_title,
                entry: EntryArgs {
                    title,
                    user,
                    url,
                    notes,
                    password,
                },
            },
            ["DEL_ENTRY", title] => Self::DeleteEntry { title },
            _ => return None,
        };
        Some(command)
    }

    /// Protocol verb, for logging. Arguments are never logged.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Register { .. } => "REGISTER",
            Self::RegisterWithQuestion { .. } => "REGISTER_SEC",
            Self::Login { .. } => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::SecurityQuestion { .. } => "SEC_QUESTION",
            Self::RecoverPassword { .. } => "RECOVER_PASS",
            Self::ChangePassword { .. } => "CHANGE_PASS",
            Self::NewCategory { .. } => "NEW_CAT",
            Self::ListCategories => "LIST_CATS",
            Self::DeleteCategory { .. } => "DEL_CAT",
            Self::NewEntry { .. } => "NEW_ENTRY",
            Self::ListEntries { .. } => "LIST_ENTRIES",
            Self::ModifyEntry { .. } => "MOD_ENTRY",
            Self::DeleteEntry { .. } => "DEL_ENTRY",
        }
    }
}

/// Split a message on the delimiter. Interior empty fields are kept; trailing
/// empty fields (`DEL_CAT|Work|`) are dropped.
pub fn split_fields(message: &str) -> Result<Vec<&str>, ProtocolError> {
    let message = trim_line_ending(message);
    let mut fields: Vec<&str> = message.split(FIELD_DELIMITER).collect();

    if fields.iter().all(|f| f.is_empty()) {
        return Err(ProtocolError::Empty);
    }
    while fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    if fields.len() > MAX_FIELDS {
        return Err(ProtocolError::Invalid);
    }
    Ok(fields)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
