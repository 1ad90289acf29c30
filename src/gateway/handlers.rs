// Vaultline — Command Handlers
//
// One method per verb. Each checks the session state, validates arguments,
// talks to the store and verifier, and returns either the success reply or a
// `CommandError` whose text is the failure reply. Repository and verifier
// faults are logged here and collapsed into a generic message.

use std::fmt::Display;
use std::sync::Arc;

use crate::auth::{PasswordStrength, SecretVerifier};
use crate::store::{EntryFields, NewUser, StoreError, VaultStore};

use super::command::EntryArgs;
use super::error::CommandError;
use super::session::Session;

/// Master password installed by a successful RECOVER_PASS.
pub const RECOVERY_PASSWORD: &str = "password";

pub struct VaultHandlers {
    store: Arc<dyn VaultStore>,
    verifier: Arc<dyn SecretVerifier>,
}

/// Log an internal fault and replace it with the client-facing `message`.
fn failure<E: Display>(message: &'static str) -> impl FnOnce(E) -> CommandError {
    move |err| {
        tracing::error!(error = %err, "{}", message);
        CommandError::Storage(message)
    }
}

/// Translate a store write failure, keeping the not-found and conflict signals.
fn write_failure(
    message: &'static str,
    not_found: CommandError,
    conflict: CommandError,
) -> impl FnOnce(StoreError) -> CommandError {
    move |err| match err {
        StoreError::NotFound(_) => not_found,
        StoreError::Conflict(_) => conflict,
        other => failure(message)(other),
    }
}

impl From<EntryArgs<'_>> for EntryFields {
    fn from(args: EntryArgs<'_>) -> Self {
        Self {
            title: args.title.to_string(),
            entry_user: args.user.to_string(),
            url: args.url.to_string(),
            notes: args.notes.to_string(),
            secret: args.password.to_string(),
        }
    }
}

impl VaultHandlers {
    pub fn new(store: Arc<dyn VaultStore>, verifier: Arc<dyn SecretVerifier>) -> Self {
        Self { store, verifier }
    }

    /// Verify a secret against a stored verifier. A malformed stored
    /// verifier counts as a mismatch.
    fn matches(
        &self,
        secret: &str,
        stored: &str,
        message: &'static str,
    ) -> Result<bool, CommandError> {
        match self.verifier.verify(secret, stored) {
            Ok(matched) => Ok(matched),
            Err(crate::auth::VerifierError::Malformed(e)) => {
                tracing::warn!(error = %e, "Stored verifier could not be parsed");
                Ok(false)
            }
            Err(e) => Err(failure(message)(e)),
        }
    }

    // ─── Accounts ────────────────────────────────────────────────────────────

    pub fn register(&self, username: &str, password: &str) -> Result<String, CommandError> {
        const FAILED: &str = "Registration failed.";

        if username.is_empty() || password.is_empty() {
            return Err(CommandError::MissingFields);
        }
        if self.store.find_user(username).map_err(failure(FAILED))?.is_some() {
            return Err(CommandError::UserExists);
        }

        let strength = PasswordStrength::evaluate(password);
        if !strength.is_strong() {
            return Err(CommandError::WeakMasterPassword(strength));
        }

        let master_verifier = self.verifier.derive(password).map_err(failure(FAILED))?;
        self.store
            .insert_user(NewUser {
                username: username.to_string(),
                master_verifier,
                security_question: None,
                security_answer_verifier: None,
            })
            .map_err(write_failure(FAILED, CommandError::UserNotFound, CommandError::UserExists))?;

        Ok(format!("{}\nRegistration successful.", strength))
    }

    pub fn register_with_question(
        &self,
        username: &str,
        password: &str,
        question: &str,
        answer: &str,
    ) -> Result<String, CommandError> {
        const FAILED: &str = "Registration failed.";

        if [username, password, question, answer].iter().any(|f| f.is_empty()) {
            return Err(CommandError::MissingFields);
        }

        let strength = PasswordStrength::evaluate(password);
        if !strength.is_strong() {
            return Err(CommandError::WeakMasterPassword(strength));
        }
        if self.store.find_user(username).map_err(failure(FAILED))?.is_some() {
            return Err(CommandError::UserExists);
        }

        let master_verifier = self.verifier.derive(password).map_err(failure(FAILED))?;
        let answer_verifier = self.verifier.derive(answer).map_err(failure(FAILED))?;
        self.store
            .insert_user(NewUser {
                username: username.to_string(),
                master_verifier,
                security_question: Some(question.to_string()),
                security_answer_verifier: Some(answer_verifier),
            })
            .map_err(write_failure(FAILED, CommandError::UserNotFound, CommandError::UserExists))?;

        Ok(format!("{}\nRegistration successful.", strength))
    }

    pub fn login(
        &self,
        session: &mut Session,
        username: &str,
        password: &str,
    ) -> Result<String, CommandError> {
        const FAILED: &str = "Login failed.";

        if session.is_authenticated() {
            return Err(CommandError::AlreadyLoggedIn);
        }

        let Some(user) = self.store.find_user(username).map_err(failure(FAILED))? else {
            tracing::info!(session = session.id(), "Login rejected");
            return Err(CommandError::InvalidCredentials);
        };
        if !self.matches(password, user.master_verifier(), FAILED)? {
            tracing::info!(session = session.id(), "Login rejected");
            return Err(CommandError::InvalidCredentials);
        }

        session.authenticate(username);
        tracing::info!(session = session.id(), username = %username, "Login succeeded");
        Ok(format!("Login successful: {}", username))
    }

    pub fn logout(&self, session: &mut Session) -> Result<String, CommandError> {
        match session.clear() {
            Some(username) => {
                tracing::info!(session = session.id(), username = %username, "Logged out");
                Ok("Logged out.".to_string())
            }
            None => Err(CommandError::NotLoggedIn),
        }
    }

    // ─── Recovery ────────────────────────────────────────────────────────────

    pub fn security_question(
        &self,
        session: &Session,
        username: &str,
    ) -> Result<String, CommandError> {
        session.require_anonymous()?;
        if username.is_empty() {
            return Err(CommandError::MissingUsername);
        }

        let user = self
            .store
            .find_user(username)
            .map_err(failure("Failed to look up user."))?
            .ok_or(CommandError::UserNotFound)?;

        match user.security_question.as_deref() {
            Some(question) if !question.is_empty() => {
                Ok(format!("Security question: {}", question))
            }
            _ => Err(CommandError::NoSecurityQuestion),
        }
    }

    /// Resets the master password to `RECOVERY_PASSWORD` when the answer matches.
    pub fn recover_password(
        &self,
        session: &Session,
        username: &str,
        answer: &str,
    ) -> Result<String, CommandError> {
        const FAILED: &str = "Failed to reset password.";

        session.require_anonymous()?;
        if username.is_empty() || answer.is_empty() {
            return Err(CommandError::MissingFields);
        }

        let user = self
            .store
            .find_user(username)
            .map_err(failure(FAILED))?
            .ok_or(CommandError::UserNotFound)?;

        let answer_verifier = match (&user.security_question, user.security_answer_verifier()) {
            (Some(_), Some(verifier)) => verifier,
            _ => return Err(CommandError::NoSecurityQuestion),
        };

        if !self.matches(answer, answer_verifier, FAILED)? {
            tracing::warn!(session = session.id(), username = %username, "Security answer rejected");
            return Err(CommandError::InvalidSecurityAnswer);
        }

        let reset = self
            .verifier
            .derive(RECOVERY_PASSWORD)
            .map_err(failure(FAILED))?;
        self.store
            .update_master_verifier(username, &reset)
            .map_err(write_failure(FAILED, CommandError::UserNotFound, CommandError::Storage(FAILED)))?;

        tracing::warn!(session = session.id(), username = %username, "Master password reset by recovery");
        Ok(format!("Password reset to '{}'.", RECOVERY_PASSWORD))
    }

    pub fn change_password(
        &self,
        session: &Session,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<String, CommandError> {
        const FAILED: &str = "Failed to update password.";

        session.require_anonymous()?;
        if username.is_empty() || old_password.is_empty() || new_password.is_empty() {
            return Err(CommandError::MissingFields);
        }

        let user = self
            .store
            .find_user(username)
            .map_err(failure(FAILED))?
            .ok_or(CommandError::UserNotFound)?;

        let strength = PasswordStrength::evaluate(new_password);
        if !strength.is_strong() {
            return Err(CommandError::WeakNewPassword(strength));
        }
        if !self.matches(old_password, user.master_verifier(), FAILED)? {
            return Err(CommandError::InvalidOldPassword);
        }

        let verifier = self.verifier.derive(new_password).map_err(failure(FAILED))?;
        self.store
            .update_master_verifier(username, &verifier)
            .map_err(write_failure(FAILED, CommandError::UserNotFound, CommandError::Storage(FAILED)))?;

        Ok("Password updated.".to_string())
    }

    // ─── Categories ──────────────────────────────────────────────────────────

    pub fn new_category(&self, session: &Session, name: &str) -> Result<String, CommandError> {
        const FAILED: &str = "Failed to add category.";

        let owner = session.require_user()?;
        if name.is_empty() {
            return Err(CommandError::MissingFields);
        }
        if self.store.find_category(owner, name).map_err(failure(FAILED))?.is_some() {
            return Err(CommandError::CategoryExists);
        }

        self.store
            .insert_category(owner, name)
            .map_err(write_failure(FAILED, CommandError::Storage(FAILED), CommandError::CategoryExists))?;
        Ok("Category added.".to_string())
    }

    pub fn list_categories(&self, session: &Session) -> Result<String, CommandError> {
        let owner = session.require_user()?;
        let categories = self
            .store
            .list_categories(owner)
            .map_err(failure("Error retrieving categories."))?;

        if categories.is_empty() {
            return Ok("No categories found.".to_string());
        }

        let mut reply = String::from("Categories:\n");
        for category in &categories {
            reply.push_str(&category.name);
            reply.push('\n');
        }
        Ok(reply)
    }

    pub fn delete_category(&self, session: &Session, name: &str) -> Result<String, CommandError> {
        const FAILED: &str = "Failed to delete category.";

        let owner = session.require_user()?;
        if self.store.find_category(owner, name).map_err(failure(FAILED))?.is_none() {
            return Err(CommandError::CategoryNotFound);
        }

        self.store
            .delete_category(owner, name)
            .map_err(write_failure(FAILED, CommandError::CategoryNotFound, CommandError::Storage(FAILED)))?;
        Ok("Category deleted.".to_string())
    }

    // ─── Entries ─────────────────────────────────────────────────────────────

    pub fn new_entry(
        &self,
        session: &Session,
        category: &str,
        entry: EntryArgs<'_>,
    ) -> Result<String, CommandError> {
        const FAILED: &str = "Failed to add entry.";

        let owner = session.require_user()?;
        if category.is_empty() || entry.title.is_empty() || entry.password.is_empty() {
            return Err(CommandError::MissingFields);
        }
        if self.store.find_entry(owner, entry.title).map_err(failure(FAILED))?.is_some() {
            return Err(CommandError::EntryExists);
        }
        if self.store.find_category(owner, category).map_err(failure(FAILED))?.is_none() {
            return Err(CommandError::CategoryNotFound);
        }

        self.store
            .insert_entry(owner, category, entry.into())
            .map_err(write_failure(FAILED, CommandError::CategoryNotFound, CommandError::EntryExists))?;
        Ok("Entry added.".to_string())
    }

    pub fn list_entries(&self, session: &Session, category: &str) -> Result<String, CommandError> {
        let owner = session.require_user()?;
        let entries = self
            .store
            .list_entries(owner, category)
            .map_err(failure("Error retrieving entries."))?;

        if entries.is_empty() {
            return Ok("No entries in that category.".to_string());
        }

        let mut reply = String::from("Entries:\n");
        for entry in &entries {
            reply.push_str(&entry.listing_line());
            reply.push('\n');
        }
        Ok(reply)
    }

    pub fn modify_entry(
        &self,
        session: &Session,
        old_title: &str,
        entry: EntryArgs<'_>,
    ) -> Result<String, CommandError> {
        const FAILED: &str = "Failed to update entry.";

        let owner = session.require_user()?;
        if self.store.find_entry(owner, old_title).map_err(failure(FAILED))?.is_none() {
            return Err(CommandError::EntryNotFound);
        }
        if entry.title.is_empty() || entry.password.is_empty() {
            return Err(CommandError::MissingFields);
        }

        self.store
            .update_entry(owner, old_title, entry.into())
            .map_err(write_failure(FAILED, CommandError::EntryNotFound, CommandError::EntryExists))?;
        Ok("Entry updated.".to_string())
    }

    pub fn delete_entry(&self, session: &Session, title: &str) -> Result<String, CommandError> {
        const FAILED: &str = "Failed to delete entry.";

        let owner = session.require_user()?;
        if self.store.find_entry(owner, title).map_err(failure(FAILED))?.is_none() {
            return Err(CommandError::EntryNotFound);
        }

        self.store
            .delete_entry(owner, title)
            .map_err(write_failure(FAILED, CommandError::EntryNotFound, CommandError::Storage(FAILED)))?;
        Ok("Entry deleted.".to_string())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
