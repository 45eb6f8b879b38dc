//! Protocol constants and message type definitions

use std::time::Duration;

/// Magic cookie opening every message (0xABCDDCBA)
pub const MAGIC_COOKIE: u32 = 0xabcd_dcba;

/// Well-known UDP port for offer broadcasts
pub const DISCOVERY_PORT: u16 = 13122;

/// Fixed width of server and team name fields (NUL-padded UTF-8)
pub const NAME_LEN: usize = 32;

/// Period between two offer broadcasts
pub const OFFER_INTERVAL: Duration = Duration::from_secs(1);

/// Message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    /// Server advertisement (UDP broadcast)
    Offer = 0x02,

    /// Client handshake declaring rounds and team name
    Request = 0x03,

    /// In-session traffic: round updates (server) and decisions (client)
    Payload = 0x04,
}

impl MessageType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x02 => Some(Self::Offer),
            0x03 => Some(Self::Request),
            0x04 => Some(Self::Payload),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Round result code, always from the player's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RoundResult {
    /// Round still in progress, the update carries a card
    NotOver = 0x0,
    Tie = 0x1,
    Loss = 0x2,
    Win = 0x3,
}

impl RoundResult {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x0 => Some(Self::NotOver),
            0x1 => Some(Self::Tie),
            0x2 => Some(Self::Loss),
            0x3 => Some(Self::Win),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Whether this code ends the round
    pub fn is_terminal(self) -> bool {
        self != Self::NotOver
    }
}
