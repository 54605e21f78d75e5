//! Renders [`ChatEvent`]s into wire lines. All functions return a complete
//! line without the trailing newline; the write loop appends it.

use crate::engine::events::ChatEvent;

use super::{FROM, LIST_USERS, NOTICE, PRIV_FROM, PRIV_TO, WELCOME};

/// Render an outbound event as a single wire line.
///
/// User-supplied text has already been stripped of line breaks by the line
/// reader, so no sanitization happens here.
pub fn render(event: &ChatEvent) -> String {
    match event {
        ChatEvent::Welcome => WELCOME.to_string(),
        ChatEvent::Broadcast { from, text } => format!("{FROM}{from} {text}"),
        ChatEvent::Direct { from, to, text } => {
            format!("{PRIV_FROM}{from}{PRIV_TO}{to} {text}")
        }
        ChatEvent::Joined { nickname } => format!("{NOTICE}{nickname} joined"),
        ChatEvent::Left { nickname } => format!("{NOTICE}{nickname} left"),
        ChatEvent::Users { nicks } => format!("{LIST_USERS}{}", nicks.join(",")),
        ChatEvent::Notice { text } => format!("{NOTICE}{text}"),
        ChatEvent::Error(e) => e.wire_reply().to_string(),
    }
}
