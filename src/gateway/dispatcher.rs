// Vaultline — Command Dispatcher
//
// Turns one inbound message into exactly one reply. Parsing failures and
// handler failures both become reply text; the connection stays open.
// Only the verb and session id are logged, never arguments.

use std::sync::Arc;

use crate::auth::SecretVerifier;
use crate::store::VaultStore;

use super::command::Command;
use super::error::{CommandError, ErrorKind};
use super::handlers::VaultHandlers;
use super::protocol::finish_reply;
use super::session::Session;

pub struct Dispatcher {
    handlers: VaultHandlers,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn VaultStore>, verifier: Arc<dyn SecretVerifier>) -> Self {
        Self {
            handlers: VaultHandlers::new(store, verifier),
        }
    }

    /// Produce the newline-terminated reply for `message`.
    pub fn dispatch(&self, session: &mut Session, message: &str) -> String {
        let reply = match Command::parse(message) {
            Ok(command) => {
                let verb = command.verb();
                tracing::debug!(session = session.id(), verb, "Dispatching command");

                match self.execute(session, command) {
                    Ok(reply) => reply,
                    Err(e) => {
                        log_failure(session.id(), verb, &e);
                        e.to_string()
                    }
                }
            }
            Err(e) => {
                tracing::debug!(session = session.id(), error = %e, "Rejected message");
                e.to_string()
            }
        };
        finish_reply(reply)
    }

    fn execute(&self, session: &mut Session, command: Command<'_>) -> Result<String, CommandError> {
        let h = &self.handlers;
        match command {
            Command::Register { username, password } => h.register(username, password),
            Command::RegisterWithQuestion {
                username,
                password,
                question,
                answer,
            } => h.register_with_question(username, password, question, answer),
            Command::Login { username, password } => h.login(session, username, password),
            Command::Logout => h.logout(session),
            Command::SecurityQuestion { username } => h.security_question(session, username),
            Command::RecoverPassword { username, answer } => {
                h.recover_password(session, username, answer)
            }
            Command::ChangePassword {
                username,
                old_password,
                new_password,
            } => h.change_password(session, username, old_password, new_password),
            Command::NewCategory { name } => h.new_category(session, name),
            Command::ListCategories => h.list_categories(session),
            Command::DeleteCategory { name } => h.delete_category(session, name),
            Command::NewEntry { category, entry } => h.new_entry(session, category, entry),
            Command::ListEntries { category } => h.list_entries(session, category),
            Command::ModifyEntry { old_title, entry } => h.modify_entry(session, old_title, entry),
            Command::DeleteEntry { title } => h.delete_entry(session, title),
        }
    }
}

fn log_failure(session: u64, verb: &str, error: &CommandError) {
    match error.kind() {
        // Already logged with the underlying cause where it happened.
        ErrorKind::Storage => {}
        ErrorKind::Auth => tracing::info!(session, verb, kind = ?error.kind(), "Command refused"),
        _ => tracing::debug!(session, verb, kind = ?error.kind(), "Command failed"),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Argon2Verifier, HashCost};
    use crate::store::{Database, SqliteVaultStore};

    fn dispatcher() -> Dispatcher {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let verifier = Argon2Verifier::new(HashCost {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        Dispatcher::new(Arc::new(SqliteVaultStore::new(db)), Arc::new(verifier))
    }

    #[test]
    fn test_every_reply_ends_with_newline() {
        let d = dispatcher();
        let mut session = Session::new(1);
        for message in ["", "BOGUS", "LOGOUT", "LIST_CATS", "REGISTER|a|b", "|||"] {
            let reply = d.dispatch(&mut session, message);
            assert!(reply.ends_with('\n'), "{message:?} -> {reply:?}");
            assert!(!reply.ends_with("\n\n"), "{message:?} -> {reply:?}");
        }
    }

    #[test]
    fn test_protocol_errors() {
        let d = dispatcher();
        let mut session = Session::new(1);
        assert_eq!(d.dispatch(&mut session, ""), "Empty command.\n");
        assert_eq!(d.dispatch(&mut session, "NOPE|x"), "Invalid command or parameters.\n");
        assert_eq!(d.dispatch(&mut session, "LOGIN|alice"), "Invalid command or parameters.\n");
    }

    #[test]
    fn test_full_session() {
        let d = dispatcher();
        let mut s = Session::new(7);

        assert_eq!(
            d.dispatch(&mut s, "REGISTER|alice|Str0ng!Pw\n"),
            "Password strength: Strong\nRegistration successful.\n"
        );
        assert_eq!(d.dispatch(&mut s, "NEW_CAT|Work"), "Login required.\n");
        assert_eq!(
            d.dispatch(&mut s, "LOGIN|alice|Str0ng!Pw"),
            "Login successful: alice\n"
        );
        assert_eq!(d.dispatch(&mut s, "NEW_CAT|Work"), "Category added.\n");
        assert_eq!(
            d.dispatch(&mut s, "NEW_ENTRY|Work|Email|alice@x|http://x|n|pw1"),
            "Entry added.\n"
        );
        assert_eq!(
            d.dispatch(&mut s, "LIST_ENTRIES|Work"),
            "Entries:\nTitle:Email, User:alice@x, URL:http://x, Notes:n, Pass:pw1\n"
        );
        assert_eq!(d.dispatch(&mut s, "LIST_CATS"), "Categories:\nWork\n");
        assert_eq!(d.dispatch(&mut s, "DEL_CAT|Work"), "Category deleted.\n");
        assert_eq!(
            d.dispatch(&mut s, "LIST_ENTRIES|Work"),
            "No entries in that category.\n"
        );
        assert_eq!(d.dispatch(&mut s, "LOGOUT"), "Logged out.\n");
        assert_eq!(d.dispatch(&mut s, "LOGOUT"), "Not logged in.\n");
    }

    #[test]
    fn test_weak_password_reply() {
        let d = dispatcher();
        let mut s = Session::new(1);
        let reply = d.dispatch(&mut s, "REGISTER|bob|password");
        assert!(reply.starts_with("Password strength: Weak"));
        assert!(reply.ends_with("Master password not accepted.\n"));
    }
}
