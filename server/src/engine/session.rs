//! Server-side state for one connected client.

use std::sync::atomic::{AtomicI64, AtomicU8, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::events::{ChatEvent, SessionId};

/// Default capacity of a session's outbound queue (prevents memory exhaustion
/// from slow clients).
pub const DEFAULT_OUTBOUND_QUEUE: usize = 64;

/// Session lifecycle. Transitions are forward-only:
/// `Handshaking → Active → Draining → Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum SessionState {
    /// Connection accepted, identity not yet registered.
    Handshaking = 0,
    /// Registered; read and write loops running.
    Active = 1,
    /// Read loop stopped; write loop flushing queued output (bounded).
    Draining = 2,
    /// Deregistered, resources released.
    Closed = 3,
}

impl SessionState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => SessionState::Handshaking,
            1 => SessionState::Active,
            2 => SessionState::Draining,
            _ => SessionState::Closed,
        }
    }
}

/// A connected client session.
///
/// Created by the connection handler once a nickname claim succeeds, then
/// jointly referenced by the registry and by the session's own read/write
/// loops. The outbound queue is bounded; enqueueing never blocks
/// (see [`Session::send`]).
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    /// Case-preserving display nickname. Registry keys are lowercased.
    nickname: String,
    outbound: mpsc::Sender<ChatEvent>,
    state: AtomicU8,
    cancel: CancellationToken,
    pub connected_at: DateTime<Utc>,
    /// Unix millis of the last inbound frame.
    last_activity: AtomicI64,
    /// Events dropped because the outbound queue was full.
    dropped: AtomicU64,
}

impl Session {
    pub fn new(
        id: SessionId,
        nickname: String,
        outbound: mpsc::Sender<ChatEvent>,
        cancel: CancellationToken,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            nickname,
            outbound,
            state: AtomicU8::new(SessionState::Handshaking as u8),
            cancel,
            connected_at: now,
            last_activity: AtomicI64::new(now.timestamp_millis()),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Advance the state machine. Transitions are forward-only; returns true
    /// if this call performed the transition, false if the session was
    /// already at or past `next`.
    pub fn advance(&self, next: SessionState) -> bool {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if current >= next as u8 {
                return false;
            }
            match self.state.compare_exchange(
                current,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }

    /// Cancellation signal observed by both the read and write loops.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Request teardown: move to Draining and cancel both loops. The read
    /// loop stops immediately; the write loop flushes within its drain bound.
    pub fn close(&self) {
        self.advance(SessionState::Draining);
        self.cancel.cancel();
    }

    /// Enqueue an event for delivery. Never blocks: returns false if the
    /// queue is full or the write loop is gone, and the event is dropped.
    pub fn send(&self, event: ChatEvent) -> bool {
        self.outbound.try_send(event).is_ok()
    }

    /// Record a dropped event; returns the new total for this session.
    pub fn record_drop(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Mark inbound activity now.
    pub fn touch(&self) {
        self.last_activity
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// Unix millis of the last inbound frame.
    pub fn last_activity_millis(&self) -> i64 {
        self.last_activity.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_session(capacity: usize) -> (Session, mpsc::Receiver<ChatEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        let session = Session::new(
            Uuid::new_v4(),
            "alice".into(),
            tx,
            CancellationToken::new(),
        );
        (session, rx)
    }

    #[test]
    fn test_starts_handshaking() {
        let (s, _rx) = test_session(4);
        assert_eq!(s.state(), SessionState::Handshaking);
    }

    #[test]
    fn test_forward_only_transitions() {
        let (s, _rx) = test_session(4);
        assert!(s.advance(SessionState::Active));
        assert!(s.advance(SessionState::Draining));
        // Going backwards is refused.
        assert!(!s.advance(SessionState::Active));
        assert_eq!(s.state(), SessionState::Draining);
        assert!(s.advance(SessionState::Closed));
        assert!(!s.advance(SessionState::Closed));
    }

    #[test]
    fn test_advance_may_skip_states() {
        let (s, _rx) = test_session(4);
        assert!(s.advance(SessionState::Closed));
        assert_eq!(s.state(), SessionState::Closed);
    }

    #[test]
    fn test_close_cancels_and_drains() {
        let (s, _rx) = test_session(4);
        s.advance(SessionState::Active);
        s.close();
        assert_eq!(s.state(), SessionState::Draining);
        assert!(s.cancel_token().is_cancelled());
    }

    #[test]
    fn test_send_drops_when_full() {
        let (s, mut rx) = test_session(1);
        assert!(s.send(ChatEvent::Welcome));
        // Queue full: second send fails without blocking.
        assert!(!s.send(ChatEvent::Welcome));
        assert_eq!(rx.try_recv().unwrap(), ChatEvent::Welcome);
        assert!(s.send(ChatEvent::Welcome));
    }

    #[test]
    fn test_drop_counter() {
        let (s, _rx) = test_session(1);
        assert_eq!(s.dropped(), 0);
        assert_eq!(s.record_drop(), 1);
        assert_eq!(s.record_drop(), 2);
        assert_eq!(s.dropped(), 2);
    }

    #[test]
    fn test_touch_updates_last_activity() {
        let (s, _rx) = test_session(1);
        let before = s.last_activity_millis();
        std::thread::sleep(std::time::Duration::from_millis(5));
        s.touch();
        assert!(s.last_activity_millis() >= before);
    }
}
