//! Counters exposed at the observability boundary.
//!
//! The core only counts; an external collaborator (the `tracing` subscriber,
//! a metrics scraper) decides how to format or persist them.

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counters, incremented from any task.
#[derive(Debug, Default)]
pub struct Metrics {
    connections_accepted: AtomicU64,
    sessions_registered: AtomicU64,
    messages_routed: AtomicU64,
    messages_dropped: AtomicU64,
    handshake_timeouts: AtomicU64,
}

/// Point-in-time copy of all counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub connections_accepted: u64,
    pub sessions_registered: u64,
    pub messages_routed: u64,
    pub messages_dropped: u64,
    pub handshake_timeouts: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr_connections_accepted(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_sessions_registered(&self) {
        self.sessions_registered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_messages_routed(&self) {
        self.messages_routed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_messages_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_handshake_timeouts(&self) {
        self.handshake_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_accepted: self.connections_accepted.load(Ordering::Relaxed),
            sessions_registered: self.sessions_registered.load(Ordering::Relaxed),
            messages_routed: self.messages_routed.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            handshake_timeouts: self.handshake_timeouts.load(Ordering::Relaxed),
        }
    }
}
