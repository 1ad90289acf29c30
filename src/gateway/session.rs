// Vaultline — Per-Connection Session
//
// Each connection owns exactly one Session. It starts unauthenticated, holds
// at most one username after LOGIN, and is dropped with the connection.
// Sessions are never shared between workers.

use super::error::CommandError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum AuthState {
    #[default]
    Unauthenticated,
    Authenticated {
        username: String,
    },
}

#[derive(Debug)]
pub struct Session {
    id: u64,
    state: AuthState,
}

impl Session {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            state: AuthState::Unauthenticated,
        }
    }

    /// Connection id used to correlate log lines.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn username(&self) -> Option<&str> {
        match &self.state {
            AuthState::Authenticated { username } => Some(username),
            AuthState::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.username().is_some()
    }

    /// The logged-in username, or `LoginRequired`.
    pub fn require_user(&self) -> Result<&str, CommandError> {
        self.username().ok_or(CommandError::LoginRequired)
    }

    /// Succeeds only while logged out (SEC_QUESTION, RECOVER_PASS, CHANGE_PASS).
    pub fn require_anonymous(&self) -> Result<(), CommandError> {
        if self.is_authenticated() {
            Err(CommandError::LogoutRequired)
        } else {
            Ok(())
        }
    }

    pub(crate) fn authenticate(&mut self, username: &str) {
        self.state = AuthState::Authenticated {
            username: username.to_string(),
        };
    }

    /// Clear the identity. Returns the username that was logged in, if any.
    pub(crate) fn clear(&mut self) -> Option<String> {
        match std::mem::take(&mut self.state) {
            AuthState::Authenticated { username } => Some(username),
            AuthState::Unauthenticated => None,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
