//! Routable chat events.

use uuid::Uuid;

use crate::error::ProtocolError;

/// Unique identifier for a connected session.
pub type SessionId = Uuid;

/// A routable unit of chat data. Immutable once constructed; the router
/// enqueues a clone onto each target session's outbound queue and the write
/// loop renders it to a wire line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Handshake accepted.
    Welcome,
    /// Public message from another client.
    Broadcast { from: String, text: String },
    /// Direct message to exactly one recipient.
    Direct {
        from: String,
        to: String,
        text: String,
    },
    /// A client registered.
    Joined { nickname: String },
    /// A client left (quit or connection lost).
    Left { nickname: String },
    /// Current users list (sent on request and after membership changes).
    Users { nicks: Vec<String> },
    /// Free-form system notice.
    Notice { text: String },
    /// Protocol error reply for the receiving client's own request.
    Error(ProtocolError),
}
