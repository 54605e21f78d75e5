//! Routing policy: which sessions receive a given event.
//!
//! All delivery goes through a registry snapshot and each target's bounded
//! outbound queue. Enqueueing never blocks, so one slow receiver cannot
//! stall a sender's read loop. Events from a single sender reach each target
//! in send order because the sender's read loop dispatches sequentially and
//! queues are FIFO.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::ProtocolError;

use super::events::ChatEvent;
use super::metrics::Metrics;
use super::registry::Registry;
use super::session::Session;

/// After this many drops on a single target, its next dropped event triggers
/// one notice to the sender that the recipient is lagging.
pub const DROP_NOTIFY_THRESHOLD: u64 = 8;

#[derive(Clone)]
pub struct Router {
    registry: Arc<Registry>,
    metrics: Arc<Metrics>,
}

impl Router {
    pub fn new(registry: Arc<Registry>, metrics: Arc<Metrics>) -> Self {
        Self { registry, metrics }
    }

    /// Broadcast a public message from `sender` to every other registered
    /// session. The sender gets no echo; clients render their own input.
    pub fn broadcast(&self, sender: &Session, text: &str) {
        let event = ChatEvent::Broadcast {
            from: sender.nickname().to_string(),
            text: text.to_string(),
        };
        for (_, target) in self.registry.snapshot() {
            if target.id == sender.id {
                continue;
            }
            self.enqueue(&target, event.clone(), Some(sender));
        }
        self.metrics.incr_messages_routed();
    }

    /// Deliver a direct message to exactly one recipient. An unknown
    /// recipient is reported to the sender only.
    pub fn direct(&self, sender: &Session, to: &str, text: &str) {
        let Some(target) = self.registry.lookup(to) else {
            debug!(from = %sender.nickname(), %to, "direct message to unknown recipient");
            let _ = sender.send(ChatEvent::Error(ProtocolError::UserNotFound));
            return;
        };
        let event = ChatEvent::Direct {
            from: sender.nickname().to_string(),
            to: target.nickname().to_string(),
            text: text.to_string(),
        };
        self.enqueue(&target, event, Some(sender));
        self.metrics.incr_messages_routed();
    }

    /// Announce a newly registered session: a join notice to everyone else
    /// and a fresh users list to everyone including the joiner.
    pub fn announce_join(&self, joined: &Session) {
        let notice = ChatEvent::Joined {
            nickname: joined.nickname().to_string(),
        };
        let users = ChatEvent::Users {
            nicks: self.registry.nicknames(),
        };
        for (_, target) in self.registry.snapshot() {
            if target.id != joined.id {
                self.enqueue(&target, notice.clone(), None);
            }
            self.enqueue(&target, users.clone(), None);
        }
    }

    /// Announce a departure. Called after the session has been removed from
    /// the registry, so the snapshot naturally excludes it.
    pub fn announce_leave(&self, nickname: &str) {
        let notice = ChatEvent::Left {
            nickname: nickname.to_string(),
        };
        let users = ChatEvent::Users {
            nicks: self.registry.nicknames(),
        };
        for (_, target) in self.registry.snapshot() {
            self.enqueue(&target, notice.clone(), None);
            self.enqueue(&target, users.clone(), None);
        }
    }

    /// Reply to a USERS request (requester only).
    pub fn users(&self, requester: &Session) {
        let _ = requester.send(ChatEvent::Users {
            nicks: self.registry.nicknames(),
        });
    }

    /// Enqueue onto one target, dropping the event if its queue is full
    /// (drop-newest). Crossing the drop threshold notifies the sender once.
    fn enqueue(&self, target: &Session, event: ChatEvent, sender: Option<&Session>) {
        if target.send(event) {
            return;
        }
        let dropped = target.record_drop();
        self.metrics.incr_messages_dropped();
        warn!(
            target = %target.nickname(),
            dropped,
            "outbound queue full, dropping event"
        );
        if dropped == DROP_NOTIFY_THRESHOLD
            && let Some(sender) = sender
        {
            let _ = sender.send(ChatEvent::Notice {
                text: format!(
                    "{} is not keeping up; messages to them are being dropped",
                    target.nickname()
                ),
            });
        }
    }
}
