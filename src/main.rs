//! Broadcast TCP Chat Server - Entry Point
//!
//! Starts one chat server per port given on the command line.

use std::env;
use std::net::{Ipv4Addr, SocketAddr};
use std::process;

use tracing::info;
use tracing_subscriber::EnvFilter;

use chatcast::{AppError, Server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chatcast=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chatcast=info")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("Usage: chatcast <port> [<port> ...]");
        process::exit(1);
    }

    // One listener and one room per port; ports never share messages
    let mut servers = Vec::new();
    for arg in &args {
        let port: u16 = arg
            .parse()
            .map_err(|_| AppError::InvalidPort(arg.clone()))?;
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        servers.push(Server::bind(addr).await?);
    }

    info!("Starting {} chat server(s)", servers.len());

    let handles: Vec<_> = servers
        .into_iter()
        .map(|server| tokio::spawn(server.run()))
        .collect();

    // Accept loops run forever; joining them keeps main alive
    for handle in handles {
        handle.await?;
    }

    Ok(())
}
