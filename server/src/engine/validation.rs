//! Identity validation.

use crate::error::ProtocolError;
use crate::protocol::MAX_NICK_LENGTH;

/// Validate a candidate nickname: non-empty, no spaces, at most
/// [`MAX_NICK_LENGTH`] characters.
pub fn validate_nickname(nick: &str) -> Result<(), ProtocolError> {
    if nick.is_empty() {
        return Err(ProtocolError::InvalidNick);
    }
    if nick.contains(' ') {
        return Err(ProtocolError::InvalidNick);
    }
    if nick.chars().count() > MAX_NICK_LENGTH {
        return Err(ProtocolError::InvalidNick);
    }
    Ok(())
}
