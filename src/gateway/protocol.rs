// Vaultline — Wire Protocol
//
// One read is one command: `VERB|arg1|arg2|...`, at most 4095 bytes, no
// escaping of the delimiter. Every reply is a single human-readable message
// terminated by a newline.

use thiserror::Error;

/// Largest accepted inbound message, in bytes.
pub const MAX_MESSAGE_LEN: usize = 4095;

/// Largest number of `|`-separated fields in one command.
pub const MAX_FIELDS: usize = 16;

/// Field separator.
pub const FIELD_DELIMITER: char = '|';

/// Handled by the connection layer; closes the connection with no reply.
pub const EXIT_COMMAND: &str = "EXIT";

/// Failures detected before a command reaches a handler.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Empty command.")]
    Empty,

    /// Unknown verb, wrong arity or too many fields.
    #[error("Invalid command or parameters.")]
    Invalid,

    #[error("Command too long.")]
    TooLong,

    #[error("Malformed command encoding.")]
    Encoding,
}

/// Strip the line terminator a line-oriented client may append.
pub fn trim_line_ending(message: &str) -> &str {
    message
        .strip_suffix('\n')
        .map(|m| m.strip_suffix('\r').unwrap_or(m))
        .unwrap_or(message)
}

/// Terminate a reply with exactly one trailing newline.
pub fn finish_reply(mut body: String) -> String {
    while body.ends_with('\n') {
        body.pop();
    }
    body.push('\n');
    body
}

// ─── Tests ───────────────────────────────────────────────────────────────────
