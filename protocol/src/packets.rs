//! Fixed-size wire messages
//!
//! Every message starts with the 4-byte magic cookie and a type byte. All
//! integers are big-endian.
//!
//! ```text
//! Offer       magic(4) type(1)=0x2 tcp_port(2) server_name(32)       39 bytes
//! Request     magic(4) type(1)=0x3 rounds(1)   team_name(32)         38 bytes
//! RoundUpdate magic(4) type(1)=0x4 result(1)   rank(2) suit(1)        9 bytes
//! Decision    magic(4) type(1)=0x4 decision(5) "Hittt" | "Stand"     10 bytes
//! ```

use crate::cards::{Card, Suit};
use crate::constants::{MAGIC_COOKIE, MessageType, NAME_LEN, RoundResult};
use thiserror::Error;

/// Size of the magic + type prefix
pub const HEADER_SIZE: usize = 5;

/// Packet errors
#[derive(Debug, Error)]
pub enum PacketError {
    #[error("Packet too short: expected {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    #[error("Invalid magic cookie: {0:#010x}")]
    InvalidMagic(u32),

    #[error("Unexpected message type {actual:#x}, expected {expected:?}")]
    UnexpectedType { expected: MessageType, actual: u8 },

    #[error("Unknown result code: {0:#x}")]
    InvalidResultCode(u8),

    #[error("Invalid card: rank {rank}, suit {suit}")]
    InvalidCard { rank: u16, suit: u8 },
}

/// A fixed-length message kind
pub trait Message: Sized {
    /// Encoded length in bytes
    const SIZE: usize;

    /// Type byte carried in the header
    const TYPE: MessageType;

    fn to_bytes(&self) -> Vec<u8>;

    fn from_bytes(bytes: &[u8]) -> Result<Self, PacketError>;
}

/// Validate length, magic cookie and type byte of an incoming message
fn check_header(bytes: &[u8], size: usize, expected: MessageType) -> Result<(), PacketError> {
    if bytes.len() < size {
        return Err(PacketError::TooShort {
            expected: size,
            actual: bytes.len(),
        });
    }

    let magic = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if magic != MAGIC_COOKIE {
        return Err(PacketError::InvalidMagic(magic));
    }

    if bytes[4] != expected.to_u8() {
        return Err(PacketError::UnexpectedType {
            expected,
            actual: bytes[4],
        });
    }

    Ok(())
}

fn header(size: usize, message_type: MessageType) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(size);
    bytes.extend_from_slice(&MAGIC_COOKIE.to_be_bytes());
    bytes.push(message_type.to_u8());
    bytes
}

/// Encode a name into a NUL-padded field, truncated on a character boundary
pub fn encode_name(name: &str) -> [u8; NAME_LEN] {
    let mut end = name.len().min(NAME_LEN);
    while !name.is_char_boundary(end) {
        end -= 1;
    }

    let mut field = [0u8; NAME_LEN];
    field[..end].copy_from_slice(&name.as_bytes()[..end]);
    field
}

/// Decode a NUL-padded name field, stopping at the first NUL
pub fn decode_name(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// OFFER datagram, broadcast by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferPacket {
    /// TCP port accepting game sessions
    pub tcp_port: u16,
    pub server_name: String,
}

impl Message for OfferPacket {
    const SIZE: usize = HEADER_SIZE + 2 + NAME_LEN;
    const TYPE: MessageType = MessageType::Offer;

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = header(Self::SIZE, Self::TYPE);
        bytes.extend_from_slice(&self.tcp_port.to_be_bytes());
        bytes.extend_from_slice(&encode_name(&self.server_name));
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, PacketError> {
        check_header(bytes, Self::SIZE, Self::TYPE)?;
        let tcp_port = u16::from_be_bytes([bytes[5], bytes[6]]);
        let server_name = decode_name(&bytes[7..7 + NAME_LEN]);
        Ok(Self {
            tcp_port,
            server_name,
        })
    }
}

/// REQUEST message, the first thing a client sends on a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPacket {
    pub round_count: u8,
    pub team_name: String,
}

impl Message for RequestPacket {
    const SIZE: usize = HEADER_SIZE + 1 + NAME_LEN;
    const TYPE: MessageType = MessageType::Request;

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = header(Self::SIZE, Self::TYPE);
        bytes.push(self.round_count);
        bytes.extend_from_slice(&encode_name(&self.team_name));
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, PacketError> {
        check_header(bytes, Self::SIZE, Self::TYPE)?;
        let round_count = bytes[5];
        let team_name = decode_name(&bytes[6..6 + NAME_LEN]);
        Ok(Self {
            round_count,
            team_name,
        })
    }
}

/// Server to client update: a card, a card plus a result, or a bare result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundUpdate {
    pub result: RoundResult,
    /// `None` is encoded as rank 0, suit 0
    pub card: Option<Card>,
}

impl RoundUpdate {
    /// A dealt card while the round is still open
    pub fn card(card: Card) -> Self {
        Self {
            result: RoundResult::NotOver,
            card: Some(card),
        }
    }

    /// A final result with no card attached
    pub fn result(result: RoundResult) -> Self {
        Self { result, card: None }
    }
}

impl Message for RoundUpdate {
    const SIZE: usize = HEADER_SIZE + 1 + 2 + 1;
    const TYPE: MessageType = MessageType::Payload;

    fn to_bytes(&self) -> Vec<u8> {
        let (rank, suit) = match self.card {
            Some(card) => (u16::from(card.rank()), card.suit().to_u8()),
            None => (0, 0),
        };

        let mut bytes = header(Self::SIZE, Self::TYPE);
        bytes.push(self.result.to_u8());
        bytes.extend_from_slice(&rank.to_be_bytes());
        bytes.push(suit);
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, PacketError> {
        check_header(bytes, Self::SIZE, Self::TYPE)?;

        let result = RoundResult::from_u8(bytes[5]).ok_or(PacketError::InvalidResultCode(bytes[5]))?;
        let rank = u16::from_be_bytes([bytes[6], bytes[7]]);
        let suit = bytes[8];

        let card = if rank == 0 && suit == 0 {
            None
        } else {
            let card = u8::try_from(rank)
                .ok()
                .zip(Suit::from_u8(suit))
                .and_then(|(rank, suit)| Card::new(rank, suit))
                .ok_or(PacketError::InvalidCard { rank, suit })?;
            Some(card)
        };

        Ok(Self { result, card })
    }
}

/// Player decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Hit,
    Stand,
}

impl Decision {
    pub const HIT_TOKEN: [u8; 5] = *b"Hittt";
    pub const STAND_TOKEN: [u8; 5] = *b"Stand";

    pub fn token(self) -> [u8; 5] {
        match self {
            Self::Hit => Self::HIT_TOKEN,
            Self::Stand => Self::STAND_TOKEN,
        }
    }

    /// Anything other than the exact hit token is a stand.
    ///
    /// Intentional leniency: peers with slightly different encodings of
    /// "Stand" must still be able to play.
    pub fn from_token(token: &[u8]) -> Self {
        if token == Self::HIT_TOKEN.as_slice() {
            Self::Hit
        } else {
            Self::Stand
        }
    }
}

/// Client to server decision message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionPacket {
    pub decision: Decision,
}

impl Message for DecisionPacket {
    const SIZE: usize = HEADER_SIZE + 5;
    const TYPE: MessageType = MessageType::Payload;

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = header(Self::SIZE, Self::TYPE);
        bytes.extend_from_slice(&self.decision.token());
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, PacketError> {
        check_header(bytes, Self::SIZE, Self::TYPE)?;
        Ok(Self {
            decision: Decision::from_token(&bytes[5..10]),
        })
    }
}
