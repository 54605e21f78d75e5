//! The text wire protocol.
//!
//! Every frame is a single UTF-8 line without line breaks. A client connects,
//! sends `HELLO <nick>`, and on `WELCOME` may send public (`MSG`) and direct
//! (`PRIV`) messages. The server tags outbound frames with the sender and
//! kind (`FROM: `, `PRIV FROM: `, `NOTICE `, `USERS`).

pub mod command;
pub mod formatter;

/// Client handshake prefix: `HELLO <nick>`
pub const HANDSHAKE: &str = "HELLO ";
/// Public message prefix: `MSG <text>`
pub const MSG: &str = "MSG ";
/// Direct message prefix: `PRIV <nick> <text>`
pub const PRIV: &str = "PRIV ";
/// Users list command and response prefix: `USERS<csv>`
pub const LIST_USERS: &str = "USERS";
/// Quit command: `QUIT`
pub const QUIT: &str = "QUIT";
/// Server welcome response confirming a successful handshake.
pub const WELCOME: &str = "WELCOME";
/// Server broadcast line prefix: `FROM: <nick> <text>`
pub const FROM: &str = "FROM: ";
/// Direct message delivery prefix: `PRIV FROM: <from> TO: <to> <text>`
pub const PRIV_FROM: &str = "PRIV FROM: ";
/// Separator before the recipient in a `PRIV FROM: ` line.
pub const PRIV_TO: &str = " TO: ";
/// System notice prefix: `NOTICE <text>`
pub const NOTICE: &str = "NOTICE ";

/// Maximum allowed nickname length in characters.
pub const MAX_NICK_LENGTH: usize = 20;
