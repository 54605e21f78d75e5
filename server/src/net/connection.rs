//! Per-connection handshake and read/write loops.
//!
//! Each connection runs two loops: a read loop (framed line → command →
//! router) and a write loop (outbound queue → framed line). Either loop
//! observing a terminal condition cancels the shared token; the read loop
//! stops immediately and the write loop flushes queued events within a
//! bounded drain window before the session closes.

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant, timeout, timeout_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::events::ChatEvent;
use crate::engine::session::{Session, SessionState};
use crate::engine::validation;
use crate::error::ProtocolError;
use crate::protocol::command::Command;
use crate::protocol::formatter;
use crate::server::Shared;

/// Read one newline-terminated line, capped at `max_len` bytes.
/// Returns Ok(0) on EOF, Ok(n) on success, Err on I/O error or an
/// over-long frame (the connection is torn down in both error cases).
pub(crate) async fn read_bounded_line<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
    buf: &mut String,
    max_len: usize,
) -> io::Result<usize> {
    let mut acc: Vec<u8> = Vec::new();
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            // EOF. A partial final line is still delivered.
            if acc.is_empty() {
                return Ok(0);
            }
            buf.push_str(&String::from_utf8_lossy(&acc));
            return Ok(acc.len());
        }
        if let Some(pos) = available.iter().position(|&b| b == b'\n') {
            acc.extend_from_slice(&available[..=pos]);
            reader.consume(pos + 1);
            if acc.len() > max_len {
                return Err(frame_too_large());
            }
            buf.push_str(&String::from_utf8_lossy(&acc));
            return Ok(acc.len());
        }
        let chunk = available.len();
        acc.extend_from_slice(available);
        reader.consume(chunk);
        if acc.len() >= max_len {
            return Err(frame_too_large());
        }
    }
}

fn frame_too_large() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "frame exceeds maximum length")
}

/// Handle a single client connection from accept to close.
/// Accepts any stream implementing AsyncRead + AsyncWrite.
pub(crate) async fn handle_connection<S>(
    stream: S,
    peer: String,
    shared: Arc<Shared>,
    cancel: CancellationToken,
) where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    debug!(%peer, "client connected");

    let (reader, writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);

    let (tx, rx) = mpsc::channel::<ChatEvent>(shared.config.outbound_queue);
    let drain_timeout = shared.config.drain_timeout;
    let write_handle = tokio::spawn(write_loop(writer, rx, cancel.clone(), drain_timeout));

    let session = match handshake(&mut reader, &tx, &shared, &cancel, &peer).await {
        Some(session) => session,
        None => {
            cancel.cancel();
            let _ = write_handle.await;
            debug!(%peer, "client disconnected (unregistered)");
            return;
        }
    };

    info!(%peer, nick = %session.nickname(), "session registered");
    shared.metrics.incr_sessions_registered();
    shared.router.announce_join(&session);

    read_loop(&mut reader, &session, &shared, &cancel).await;

    // Teardown. Deregister before releasing anything else, so no routing
    // decision can observe a half-torn-down session.
    session.advance(SessionState::Draining);
    if shared.registry.remove(session.nickname()).is_ok() {
        shared.router.announce_leave(session.nickname());
    }
    cancel.cancel();
    let _ = write_handle.await;
    session.advance(SessionState::Closed);
    info!(%peer, nick = %session.nickname(), "session closed");
}

/// Wait for a valid, unique identity claim within the handshake window.
/// Returns None on timeout, EOF, cancellation, or I/O error; the client may
/// retry after a rejected claim until the window elapses.
async fn handshake<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
    tx: &mpsc::Sender<ChatEvent>,
    shared: &Shared,
    cancel: &CancellationToken,
    peer: &str,
) -> Option<Arc<Session>> {
    let deadline = Instant::now() + shared.config.handshake_timeout;
    let mut line_buf = String::new();

    loop {
        line_buf.clear();
        let read = tokio::select! {
            _ = cancel.cancelled() => return None,
            result = timeout_at(
                deadline,
                read_bounded_line(reader, &mut line_buf, shared.config.max_line_length),
            ) => result,
        };

        let n = match read {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                warn!(%peer, error = %e, "read failed during handshake");
                return None;
            }
            Err(_) => {
                shared.metrics.incr_handshake_timeouts();
                warn!(%peer, "handshake timed out");
                return None;
            }
        };
        if n == 0 {
            return None;
        }

        let line = line_buf.trim_end();
        if line.is_empty() {
            continue;
        }

        // Before the handshake completes, anything but HELLO is rejected.
        let candidate = match Command::parse(line) {
            Ok(Command::Hello { nick }) => nick,
            Ok(_) | Err(_) => {
                let _ = tx.send(ChatEvent::Error(ProtocolError::NotLoggedIn)).await;
                continue;
            }
        };

        if let Err(e) = validation::validate_nickname(&candidate) {
            let _ = tx.send(ChatEvent::Error(e)).await;
            continue;
        }

        let session = Arc::new(Session::new(
            Uuid::new_v4(),
            candidate,
            tx.clone(),
            cancel.clone(),
        ));
        session.advance(SessionState::Active);
        match shared.registry.add(session.clone()) {
            Ok(()) => {
                let _ = tx.send(ChatEvent::Welcome).await;
                return Some(session);
            }
            Err(_) => {
                // Never registered; the Arc is dropped and the client may retry.
                let _ = tx.send(ChatEvent::Error(ProtocolError::NickTaken)).await;
            }
        }
    }
}

/// Read frames and dispatch commands until EOF, error, QUIT, idle timeout,
/// or cancellation.
async fn read_loop<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
    session: &Arc<Session>,
    shared: &Shared,
    cancel: &CancellationToken,
) {
    let mut line_buf = String::new();
    loop {
        line_buf.clear();
        let read = tokio::select! {
            _ = cancel.cancelled() => break,
            result = timeout(
                shared.config.idle_timeout,
                read_bounded_line(reader, &mut line_buf, shared.config.max_line_length),
            ) => result,
        };

        let n = match read {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                warn!(nick = %session.nickname(), error = %e, "read failed");
                break;
            }
            Err(_) => {
                info!(nick = %session.nickname(), "idle timeout");
                break;
            }
        };
        if n == 0 {
            break;
        }
        session.touch();

        let line = line_buf.trim_end();
        if line.is_empty() {
            continue;
        }

        match Command::parse(line) {
            Ok(Command::Msg { text }) => shared.router.broadcast(session, &text),
            Ok(Command::Priv { to, text }) => shared.router.direct(session, &to, &text),
            Ok(Command::Users) => shared.router.users(session),
            Ok(Command::Quit) => break,
            // A second handshake is not part of the protocol.
            Ok(Command::Hello { .. }) => {
                let _ = session.send(ChatEvent::Error(ProtocolError::UnknownCommand));
            }
            Err(e) => {
                let _ = session.send(ChatEvent::Error(e));
            }
        }
    }
}

/// Deliver queued events to the socket. On cancellation, events already
/// queued are still delivered within the drain window; a write error cancels
/// the whole connection.
async fn write_loop<W: AsyncWrite + Unpin>(
    mut writer: W,
    mut rx: mpsc::Receiver<ChatEvent>,
    cancel: CancellationToken,
    drain_timeout: Duration,
) {
    loop {
        tokio::select! {
            maybe = rx.recv() => {
                let Some(event) = maybe else { break };
                if write_line(&mut writer, &event).await.is_err() {
                    cancel.cancel();
                    return;
                }
            }
            _ = cancel.cancelled() => {
                let _ = timeout(drain_timeout, drain(&mut writer, &mut rx)).await;
                break;
            }
        }
    }
    let _ = writer.shutdown().await;
}

/// Flush events that were already queued when the session started draining.
async fn drain<W: AsyncWrite + Unpin>(writer: &mut W, rx: &mut mpsc::Receiver<ChatEvent>) {
    while let Ok(event) = rx.try_recv() {
        if write_line(writer, &event).await.is_err() {
            return;
        }
    }
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, event: &ChatEvent) -> io::Result<()> {
    let mut line = formatter::render(event);
    line.push('\n');
    writer.write_all(line.as_bytes()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn read_one(input: &[u8], max_len: usize) -> io::Result<(usize, String)> {
        let mut reader = BufReader::new(input);
        let mut buf = String::new();
        let n = read_bounded_line(&mut reader, &mut buf, max_len).await?;
        Ok((n, buf))
    }

    #[tokio::test]
    async fn test_read_line_within_bound() {
        let (n, line) = read_one(b"MSG hello\n", 64).await.unwrap();
        assert_eq!(n, 10);
        assert_eq!(line, "MSG hello\n");
    }

    #[tokio::test]
    async fn test_read_line_eof() {
        let (n, line) = read_one(b"", 64).await.unwrap();
        assert_eq!(n, 0);
        assert_eq!(line, "");
    }

    #[tokio::test]
    async fn test_read_partial_line_at_eof() {
        let (n, line) = read_one(b"QUIT", 64).await.unwrap();
        assert_eq!(n, 4);
        assert_eq!(line, "QUIT");
    }

    #[tokio::test]
    async fn test_read_rejects_oversized_frame() {
        let long = vec![b'a'; 128];
        let err = read_one(&long, 64).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_read_consumes_one_line_at_a_time() {
        let mut reader = BufReader::new(&b"MSG one\nMSG two\n"[..]);
        let mut buf = String::new();
        read_bounded_line(&mut reader, &mut buf, 64).await.unwrap();
        assert_eq!(buf, "MSG one\n");
        buf.clear();
        read_bounded_line(&mut reader, &mut buf, 64).await.unwrap();
        assert_eq!(buf, "MSG two\n");
    }
}
