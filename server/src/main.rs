use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hubbub_server::config::ServerConfig;
use hubbub_server::server::Server;

/// Concurrent line-protocol TCP chat server.
#[derive(Parser)]
#[command(name = "hubbub-server", version)]
struct Args {
    /// TCP port to listen on (overrides HUBBUB_PORT; defaults to 5000).
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = ServerConfig::from_env();
    if let Some(port) = args.port {
        config.port = port;
    }

    let server = match Server::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "startup failed");
            return ExitCode::FAILURE;
        }
    };

    info!(addr = %server.local_addr(), "chat server listening");

    let cancel = server.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            cancel.cancel();
        }
    });

    server.run().await;
    ExitCode::SUCCESS
}
