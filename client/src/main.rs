//! LAN Blackjack - game client
//!
//! Listens for server offers, connects to the first one, and plays the
//! requested number of rounds before going back to discovery.

mod config;
mod discovery;
mod output;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use config::StrategyMode;
use output::ConsoleOutput;
use protocol::packets::RequestPacket;
use protocol::{OFFER_INTERVAL, ProtocolError};
use session::{PromptStrategy, SessionDriver, SessionSummary, Strategy, ThresholdStrategy};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{error, info, warn};

/// Pause after a failed session before listening for offers again
const RETRY_DELAY: Duration = OFFER_INTERVAL;

#[derive(Parser, Debug)]
#[command(name = "blackjack")]
#[command(author = "Florian Schüller <schuellerf@gmail.com>")]
#[command(version)]
#[command(about = "LAN blackjack client", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "client.conf")]
    config: PathBuf,

    /// Team name sent to the server (overrides config)
    #[arg(short, long)]
    name: Option<String>,

    /// Rounds per session; asked interactively when omitted
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..))]
    rounds: Option<u8>,

    /// Play automatically with the configured hit threshold
    #[arg(long)]
    auto: bool,

    /// Exit after one session instead of returning to discovery
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    let args = Args::parse();

    info!("Blackjack client v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = config::Config::load(&args.config)?;
    if let Some(name) = &args.name {
        config.general.team_name = name.clone();
    }
    if args.auto {
        config.strategy.mode = StrategyMode::Auto;
    }
    config.validate()?;

    let mut console = ConsoleOutput::new();

    loop {
        let rounds = match args.rounds {
            Some(rounds) => rounds,
            None => prompt_rounds()?,
        };

        session_cycle(&config, rounds, &mut console).await;

        if args.once {
            return Ok(());
        }
    }
}

/// Play one session; returns false when it failed and the retry pause has
/// already elapsed
async fn session_cycle(config: &config::Config, rounds: u8, console: &mut ConsoleOutput) -> bool {
    match play_session(config, rounds, console).await {
        Ok(()) => true,
        Err(e) => {
            error!("Session failed: {:#}", e);
            tokio::time::sleep(RETRY_DELAY).await;
            false
        }
    }
}

async fn play_session(config: &config::Config, rounds: u8, console: &mut ConsoleOutput) -> Result<()> {
    info!("Client started, listening for offer requests...");

    let socket = discovery::bind_listener(config.discovery.udp_port)?;
    let server = discovery::wait_for_offer(&socket).await?;
    drop(socket);

    console.server_found(&server);

    let stream = tokio::time::timeout(config.session.connect_timeout(), TcpStream::connect(server.addr))
        .await
        .with_context(|| format!("Timed out connecting to {}", server.addr))?
        .with_context(|| format!("Failed to connect to {}", server.addr))?;

    if let Err(e) = stream.set_nodelay(true) {
        warn!("Failed to set TCP_NODELAY: {}", e);
    }

    let request = RequestPacket {
        round_count: rounds,
        team_name: config.general.team_name.clone(),
    };

    let read_timeout = config.session.read_timeout();
    let played = match config.strategy.mode {
        StrategyMode::Prompt => play_with(stream, PromptStrategy::stdin(), console, read_timeout, &request).await,
        StrategyMode::Auto => {
            let strategy = ThresholdStrategy::new(config.strategy.hit_below);
            play_with(stream, strategy, console, read_timeout, &request).await
        }
    };
    let summary = played.with_context(|| format!("Game with '{}' ended early", server.name))?;

    console.session_finished(&summary);

    Ok(())
}

async fn play_with<St: Strategy>(
    stream: TcpStream,
    strategy: St,
    console: &mut ConsoleOutput,
    read_timeout: Duration,
    request: &RequestPacket,
) -> Result<SessionSummary, ProtocolError> {
    SessionDriver::new(stream, strategy, console, read_timeout)
        .play(request)
        .await
}

/// Ask for the number of rounds until a value in 1..=255 is entered
fn prompt_rounds() -> Result<u8> {
    let stdin = io::stdin();
    loop {
        print!("How many rounds to play? ");
        io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            anyhow::bail!("Input closed");
        }

        match line.trim().parse::<u8>() {
            Ok(rounds) if rounds > 0 => return Ok(rounds),
            _ => println!("Please enter a number between 1 and 255"),
        }
    }
}
