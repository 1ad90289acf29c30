// Vaultline — Command error types
//
// Every handler failure is one of these. The Display text is the exact reply
// sent to the client; nothing here ever closes the connection.

use thiserror::Error;

use crate::auth::PasswordStrength;

/// Coarse classification of a command failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    NotFound,
    Conflict,
    Storage,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    // Validation
    #[error("All fields are required.")]
    MissingFields,

    #[error("Username is required.")]
    MissingUsername,

    #[error("{0}\nMaster password not accepted.")]
    WeakMasterPassword(PasswordStrength),

    #[error("{0}\nNew password not accepted.")]
    WeakNewPassword(PasswordStrength),

    // Session state and credentials
    #[error("Login required.")]
    LoginRequired,

    #[error("Logout required.")]
    LogoutRequired,

    #[error("Already logged in.")]
    AlreadyLoggedIn,

    #[error("Not logged in.")]
    NotLoggedIn,

    #[error("Login failed: invalid credentials.")]
    InvalidCredentials,

    #[error("Invalid old password.")]
    InvalidOldPassword,

    #[error("Invalid security answer.")]
    InvalidSecurityAnswer,

    // Missing rows
    #[error("User not found.")]
    UserNotFound,

    #[error("User does not have a security question.")]
    NoSecurityQuestion,

    #[error("Category not found.")]
    CategoryNotFound,

    #[error("Entry not found.")]
    EntryNotFound,

    // Uniqueness
    #[error("User already exists.")]
    UserExists,

    #[error("Category already exists.")]
    CategoryExists,

    #[error("Entry with that title already exists.")]
    EntryExists,

    /// Repository or verifier fault; carries the client-facing message.
    #[error("{0}")]
    Storage(&'static str),
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingFields
            | Self::MissingUsername
            | Self::WeakMasterPassword(_)
            | Self::WeakNewPassword(_) => ErrorKind::Validation,
            Self::LoginRequired
            | Self::LogoutRequired
            | Self::AlreadyLoggedIn
            | Self::NotLoggedIn
            | Self::InvalidCredentials
            | Self::InvalidOldPassword
            | Self::InvalidSecurityAnswer => ErrorKind::Auth,
            Self::UserNotFound
            | Self::NoSecurityQuestion
            | Self::CategoryNotFound
            | Self::EntryNotFound => ErrorKind::NotFound,
            Self::UserExists | Self::CategoryExists | Self::EntryExists => ErrorKind::Conflict,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
