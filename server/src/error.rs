//! Error taxonomy.
//!
//! Three tiers with different blast radii:
//! - [`ProtocolError`] — a client misbehaved; reported back to that client as
//!   an `ERROR` line and nothing else happens.
//! - [`RegistryError`] — registry-level add/remove outcomes; per-session.
//! - [`ServerError`] — startup failures (bind). The only errors that are fatal
//!   to the process.
//!
//! Transport failures (I/O errors, oversized frames) are plain
//! [`std::io::Error`] values and terminate only the offending session.

use thiserror::Error;

/// A client violated the wire protocol. Never fatal to the server; rendered
/// to the offending client as an `ERROR` reply.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Nickname is empty, contains spaces, or is too long.
    #[error("invalid nick")]
    InvalidNick,
    /// Message command is structurally invalid (e.g. PRIV without text).
    #[error("invalid message")]
    InvalidMessage,
    /// Requested nickname is already registered.
    #[error("nick taken")]
    NickTaken,
    /// Command sent before completing the handshake.
    #[error("not logged in")]
    NotLoggedIn,
    /// Command was not recognized.
    #[error("unknown command")]
    UnknownCommand,
    /// Direct-message recipient is not connected.
    #[error("user not found")]
    UserNotFound,
}

impl ProtocolError {
    /// The exact reply line sent to the client for this error.
    pub fn wire_reply(self) -> &'static str {
        match self {
            ProtocolError::InvalidNick => "ERROR Invalid nick",
            ProtocolError::InvalidMessage => "ERROR Invalid message",
            ProtocolError::NickTaken => "ERROR Nick taken",
            ProtocolError::NotLoggedIn => "ERROR Not logged in",
            ProtocolError::UnknownCommand => "ERROR Unknown command",
            ProtocolError::UserNotFound => "ERROR User not found",
        }
    }
}

/// Outcome of registry mutations. Collisions are reported, never overwritten.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    #[error("nickname already registered")]
    DuplicateIdentity,
    #[error("nickname not registered")]
    NotFound,
}

/// Unrecoverable startup failure, surfaced to the process boundary as a
/// nonzero exit code.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_replies_match_protocol() {
        assert_eq!(ProtocolError::InvalidNick.wire_reply(), "ERROR Invalid nick");
        assert_eq!(ProtocolError::NickTaken.wire_reply(), "ERROR Nick taken");
        assert_eq!(
            ProtocolError::NotLoggedIn.wire_reply(),
            "ERROR Not logged in"
        );
        assert_eq!(
            ProtocolError::UnknownCommand.wire_reply(),
            "ERROR Unknown command"
        );
        assert_eq!(
            ProtocolError::UserNotFound.wire_reply(),
            "ERROR User not found"
        );
        assert_eq!(
            ProtocolError::InvalidMessage.wire_reply(),
            "ERROR Invalid message"
        );
    }
}
