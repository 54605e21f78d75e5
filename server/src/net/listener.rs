//! The connection acceptor.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info};

use crate::server::Shared;

use super::connection::handle_connection;

/// Accept connections and spawn a handler task for each until the
/// cancellation token fires. The handshake runs inside the spawned task, so
/// accept throughput is never gated by a slow client.
pub(crate) async fn accept_loop(
    listener: TcpListener,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    tracker: TaskTracker,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("listener shutting down");
                break;
            }
            result = listener.accept() => {
                match result {
                    Ok((stream, addr)) => {
                        shared.metrics.incr_connections_accepted();
                        let shared = shared.clone();
                        let conn_cancel = cancel.child_token();
                        let peer = addr.to_string();
                        tracker.spawn(async move {
                            handle_connection(stream, peer, shared, conn_cancel).await;
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "failed to accept connection");
                    }
                }
            }
        }
    }
}
