//! Card, deck and hand model

use crate::error::ProtocolError;
use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;

/// Number of cards in a standard deck
pub const DECK_SIZE: usize = 52;

/// Card suits, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Suit {
    Hearts = 0,
    Diamonds = 1,
    Clubs = 2,
    Spades = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Hearts),
            1 => Some(Self::Diamonds),
            2 => Some(Self::Clubs),
            3 => Some(Self::Spades),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hearts => "Hearts",
            Self::Diamonds => "Diamonds",
            Self::Clubs => "Clubs",
            Self::Spades => "Spades",
        }
    }

    fn letter(self) -> char {
        match self {
            Self::Hearts => 'H',
            Self::Diamonds => 'D',
            Self::Clubs => 'C',
            Self::Spades => 'S',
        }
    }
}

/// A playing card. Rank 1 is the ace, 11..=13 are the face cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    rank: u8,
    suit: Suit,
}

impl Card {
    /// Returns `None` for ranks outside 1..=13
    pub fn new(rank: u8, suit: Suit) -> Option<Self> {
        (1..=13).contains(&rank).then_some(Self { rank, suit })
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    pub fn is_ace(&self) -> bool {
        self.rank == 1
    }

    /// Blackjack value with the ace counted high
    pub fn value(&self) -> u16 {
        match self.rank {
            1 => 11,
            11..=13 => 10,
            rank => u16::from(rank),
        }
    }

    pub fn rank_name(&self) -> &'static str {
        match self.rank {
            1 => "Ace",
            2 => "Two",
            3 => "Three",
            4 => "Four",
            5 => "Five",
            6 => "Six",
            7 => "Seven",
            8 => "Eight",
            9 => "Nine",
            10 => "Ten",
            11 => "Jack",
            12 => "Queen",
            _ => "King",
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rank {
            1 => write!(f, "A{}", self.suit.letter()),
            11 => write!(f, "J{}", self.suit.letter()),
            12 => write!(f, "Q{}", self.suit.letter()),
            13 => write!(f, "K{}", self.suit.letter()),
            rank => write!(f, "{}{}", rank, self.suit.letter()),
        }
    }
}

/// Best total for a set of cards.
///
/// Aces start at 11 and are softened to 1, one at a time, while the total
/// is over 21. The result is the highest non-busting total, or the minimal
/// busting one when no ace is left to soften.
pub fn hand_total(cards: &[Card]) -> u16 {
    let mut total: u16 = cards.iter().map(Card::value).sum();
    let mut soft_aces = cards.iter().filter(|c| c.is_ace()).count();

    while total > 21 && soft_aces > 0 {
        total -= 10;
        soft_aces -= 1;
    }

    total
}

/// A single-round deck with a next-card cursor.
///
/// Dealt cards are never returned; a new deck is built for every round.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    next: usize,
}

impl Deck {
    /// All 52 cards, suit by suit, ace to king
    pub fn ordered() -> Self {
        let cards = Suit::ALL
            .iter()
            .flat_map(|&suit| (1..=13).map(move |rank| Card { rank, suit }))
            .collect();
        Self { cards, next: 0 }
    }

    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::ordered();
        deck.cards.shuffle(rng);
        deck
    }

    /// Deck that deals exactly `cards`, first element first
    pub fn stacked(cards: Vec<Card>) -> Self {
        Self { cards, next: 0 }
    }

    pub fn draw(&mut self) -> Result<Card, ProtocolError> {
        let card = *self.cards.get(self.next).ok_or(ProtocolError::DeckExhausted)?;
        self.next += 1;
        Ok(card)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.next
    }
}

/// Cards held by one party during a round
#[derive(Debug, Clone, Default)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn total(&self) -> u16 {
        hand_total(&self.cards)
    }

    pub fn is_bust(&self) -> bool {
        self.total() > crate::rules::BUST_LIMIT
    }
}
