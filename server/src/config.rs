//! Server configuration: defaults overridable via environment variables,
//! with the listening port also settable on the command line.

use std::time::Duration;

use crate::engine::session::DEFAULT_OUTBOUND_QUEUE;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to listen on. 0 picks an ephemeral port.
    pub port: u16,
    /// Maximum bytes per wire frame; longer frames disconnect the client.
    pub max_line_length: usize,
    /// Capacity of each session's outbound queue.
    pub outbound_queue: usize,
    /// Window for a client to complete the identity handshake.
    pub handshake_timeout: Duration,
    /// Disconnect clients that send nothing for this long.
    pub idle_timeout: Duration,
    /// Time allowed for a draining session to flush queued output.
    pub drain_timeout: Duration,
    /// Total time allowed for all sessions to drain at shutdown.
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_line_length: 4096,
            outbound_queue: DEFAULT_OUTBOUND_QUEUE,
            handshake_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(300),
            drain_timeout: Duration::from_secs(5),
            shutdown_grace: Duration::from_secs(10),
        }
    }
}

impl ServerConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("HUBBUB_PORT")
            && let Ok(port) = v.parse()
        {
            self.port = port;
        }
        if let Ok(v) = std::env::var("HUBBUB_MAX_LINE_LENGTH")
            && let Ok(len) = v.parse()
        {
            self.max_line_length = len;
        }
        if let Ok(v) = std::env::var("HUBBUB_OUTBOUND_QUEUE")
            && let Ok(capacity) = v.parse()
        {
            self.outbound_queue = capacity;
        }
        if let Ok(v) = std::env::var("HUBBUB_HANDSHAKE_TIMEOUT_SECS")
            && let Ok(secs) = v.parse()
        {
            self.handshake_timeout = Duration::from_secs(secs);
        }
        if let Ok(v) = std::env::var("HUBBUB_IDLE_TIMEOUT_SECS")
            && let Ok(secs) = v.parse()
        {
            self.idle_timeout = Duration::from_secs(secs);
        }
        if let Ok(v) = std::env::var("HUBBUB_DRAIN_TIMEOUT_SECS")
            && let Ok(secs) = v.parse()
        {
            self.drain_timeout = Duration::from_secs(secs);
        }
        if let Ok(v) = std::env::var("HUBBUB_SHUTDOWN_GRACE_SECS")
            && let Ok(secs) = v.parse()
        {
            self.shutdown_grace = Duration::from_secs(secs);
        }
    }
}
