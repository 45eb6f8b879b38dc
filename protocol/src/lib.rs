//! LAN Blackjack Protocol Library
//!
//! Shared protocol definitions for the blackjack client and server.
//! This includes message types, the card model, game rules, and
//! serialization/deserialization logic for the fixed-size wire messages.

pub mod cards;
pub mod constants;
pub mod error;
pub mod packets;
pub mod rules;
pub mod wire;

pub use constants::*;
pub use error::ProtocolError;
