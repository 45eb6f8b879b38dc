//! LAN Blackjack Server - offer beacon and per-connection game sessions

mod beacon;
mod config;
mod session;

use anyhow::{Context, Result};
use beacon::Beacon;
use clap::Parser;
use protocol::packets::OfferPacket;
use session::{GameSession, ShuffledDecks};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author = "Florian Schüller <schuellerf@gmail.com>")]
#[command(version)]
#[command(about = "LAN blackjack server - deals rounds to discovered clients", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "server.conf")]
    config: String,

    /// Server name advertised in offers (overrides config)
    #[arg(short, long)]
    name: Option<String>,

    /// TCP port for game sessions, 0 for ephemeral (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting blackjack server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = config::Config::load(&args.config)
        .context("Failed to load configuration")?;

    if let Some(name) = args.name {
        config.general.server_name = name;
    }
    if let Some(port) = args.port {
        config.general.tcp_port = port;
    }
    config.validate()?;

    // Bind TCP listener
    let bind_addr = SocketAddr::new(config.general.bind_address, config.general.tcp_port);
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let tcp_port = listener
        .local_addr()
        .context("Failed to read bound address")?
        .port();

    info!(
        "Server '{}' started, listening on {}:{}",
        config.general.server_name, config.general.bind_address, tcp_port
    );

    // Spawn offer beacon
    let offer = OfferPacket {
        tcp_port,
        server_name: config.general.server_name.clone(),
    };
    let broadcast_target = SocketAddr::new(config.discovery.broadcast_address, config.discovery.udp_port);
    let beacon = Beacon::bind(&offer, broadcast_target, config.discovery.offer_interval()).await?;
    tokio::spawn(beacon.run());

    info!(
        "Broadcasting offers to {} every {}ms",
        broadcast_target, config.discovery.offer_interval_ms
    );

    let read_timeout = config.session.read_timeout();

    tokio::select! {
        _ = accept_loop(listener, read_timeout) => {}
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl+C")?;
            info!("Shutting down");
        }
    }

    Ok(())
}

/// Accept connections forever, one session task per connection
async fn accept_loop(listener: TcpListener, read_timeout: Duration) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tokio::spawn(handle_connection(stream, peer, read_timeout));
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, read_timeout: Duration) {
    if let Err(e) = stream.set_nodelay(true) {
        warn!("Failed to set TCP_NODELAY for {}: {}", peer, e);
    }

    let session = GameSession::new(stream, ShuffledDecks::from_entropy(), read_timeout, peer.to_string());

    match session.run().await {
        Ok(summary) => info!("Session with {} finished - {}", peer, summary),
        Err(e) => warn!("Session with {} aborted: {}", peer, e),
    }
}
