//! Server composition and lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::engine::metrics::Metrics;
use crate::engine::registry::Registry;
use crate::engine::router::Router;
use crate::error::ServerError;
use crate::net::listener::accept_loop;

/// State shared by the acceptor and every connection task.
pub struct Shared {
    pub config: ServerConfig,
    pub registry: Arc<Registry>,
    pub router: Router,
    pub metrics: Arc<Metrics>,
}

/// The chat server: listening endpoint, registry, router, and the shutdown
/// machinery for all live sessions.
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl Server {
    /// Bind the listening socket and assemble the engine. A bind failure is
    /// the only fatal startup error.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let addr = format!("0.0.0.0:{}", config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        let registry = Arc::new(Registry::new());
        let metrics = Arc::new(Metrics::new());
        let router = Router::new(registry.clone(), metrics.clone());
        let shared = Arc::new(Shared {
            config,
            registry,
            router,
            metrics,
        });

        Ok(Self {
            listener,
            local_addr,
            shared,
            cancel: CancellationToken::new(),
            tracker: TaskTracker::new(),
        })
    }

    /// The bound address (useful when the configured port is 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Token that stops the accept loop and signals every session to drain.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.shared.registry.clone()
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.shared.metrics.clone()
    }

    /// Accept connections until the cancellation token fires, then run the
    /// shutdown sequence: sessions observe the cancellation through their
    /// child tokens and drain; after a bounded grace period remaining
    /// transports are abandoned.
    pub async fn run(self) {
        let grace = self.shared.config.shutdown_grace;

        accept_loop(
            self.listener,
            self.shared.clone(),
            self.cancel.clone(),
            self.tracker.clone(),
        )
        .await;

        self.tracker.close();
        if tokio::time::timeout(grace, self.tracker.wait())
            .await
            .is_err()
        {
            warn!("shutdown grace period elapsed with sessions still open");
        }

        let snap = self.shared.metrics.snapshot();
        info!(
            connections = snap.connections_accepted,
            registered = snap.sessions_registered,
            routed = snap.messages_routed,
            dropped = snap.messages_dropped,
            handshake_timeouts = snap.handshake_timeouts,
            "server stopped"
        );
    }
}
