//! Protocol error types

use crate::packets::PacketError;
use std::time::Duration;
use thiserror::Error;

/// Failures that end a game session on either side of the connection
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Timed out after {0:?} waiting for peer")]
    Timeout(Duration),

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed message: {0}")]
    Packet(#[from] PacketError),

    /// Drawing from an empty deck. Never happens under correct play.
    #[error("Deck exhausted")]
    DeckExhausted,
}
