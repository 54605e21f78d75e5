//! Parser for client command lines.

use crate::error::ProtocolError;

use super::{HANDSHAKE, LIST_USERS, MSG, PRIV, QUIT};

/// A single parsed client command.
///
/// Wire format examples:
///   `HELLO alice`
///   `MSG hello everyone`
///   `PRIV bob are you there?`
///   `USERS`
///   `QUIT`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Handshake: claim a nickname. The candidate is not validated here;
    /// see [`crate::engine::validation::validate_nickname`].
    Hello { nick: String },
    /// Broadcast a message to all other clients.
    Msg { text: String },
    /// Direct message to a single recipient.
    Priv { to: String, text: String },
    /// Request the current users list.
    Users,
    /// Close the session.
    Quit,
}

impl Command {
    /// Parse a single line (without the trailing newline).
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(rest) = line.strip_prefix(HANDSHAKE) {
            return Ok(Command::Hello {
                nick: rest.trim().to_string(),
            });
        }

        if let Some(rest) = line.strip_prefix(MSG) {
            return Ok(Command::Msg {
                text: rest.trim().to_string(),
            });
        }

        if let Some(rest) = line.strip_prefix(PRIV) {
            let rest = rest.trim();
            let Some((to, text)) = rest.split_once(' ') else {
                return Err(ProtocolError::InvalidMessage);
            };
            let to = to.trim();
            let text = text.trim();
            if to.is_empty() || text.is_empty() {
                return Err(ProtocolError::InvalidMessage);
            }
            return Ok(Command::Priv {
                to: to.to_string(),
                text: text.to_string(),
            });
        }

        if line.starts_with(LIST_USERS) {
            return Ok(Command::Users);
        }

        if line.starts_with(QUIT) {
            return Ok(Command::Quit);
        }

        Err(ProtocolError::UnknownCommand)
    }
}
