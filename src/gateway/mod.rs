// Vaultline — Gateway Module
//
// TCP front door for the vault: wire protocol, command parsing, per-connection
// sessions, handlers and the dispatcher that ties them together.

mod command;
mod dispatcher;
mod error;
mod handlers;
mod protocol;
mod session;
mod tcp;

pub use command::{split_fields, Command, EntryArgs};
pub use dispatcher::Dispatcher;
pub use error::{CommandError, ErrorKind};
pub use handlers::{VaultHandlers, RECOVERY_PASSWORD};
pub use protocol::{ProtocolError, EXIT_COMMAND, FIELD_DELIMITER, MAX_FIELDS, MAX_MESSAGE_LEN};
pub use session::Session;
pub use tcp::{handle_connection, TcpServer};
