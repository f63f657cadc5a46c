use anyhow::Result;
use axum::{Router, routing::get};
use clap::Parser;
use huddle_core::IceServerConfig;
use huddle_server::{Relay, SignalingService, ws_handler};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Rendezvous and signaling relay for two-party calls.
#[derive(Parser)]
#[command(name = "huddle-server")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:5000")]
    listen: SocketAddr,

    /// Path-discovery (STUN/TURN) url handed to clients. Repeatable.
    #[arg(long = "ice-url", default_value = "stun:stun.l.google.com:19302")]
    ice_urls: Vec<String>,

    /// Optional TURN username for the configured urls.
    #[arg(long)]
    ice_username: Option<String>,

    /// Optional TURN credential for the configured urls.
    #[arg(long)]
    ice_credential: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let ice_servers = vec![IceServerConfig {
        urls: args.ice_urls,
        username: args.ice_username,
        credential: args.ice_credential,
    }];

    let (relay_tx, relay_rx) = mpsc::channel(100);
    let service = SignalingService::new(relay_tx, ice_servers);

    let relay = Relay::new(relay_rx, Arc::new(service.clone()));
    tokio::spawn(relay.run());

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(service);

    info!("signaling relay listening on {}", args.listen);
    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
