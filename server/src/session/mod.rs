//! Per-connection game session
//!
//! One `GameSession` owns one accepted stream and runs the whole exchange:
//!
//! ```text
//! AwaitingRequest -> [ Dealing -> PlayerTurn -> DealerTurn -> RoundResolved ] x N -> Closed
//! ```
//!
//! Any read timeout, disconnect or malformed message abandons the session.

use protocol::ProtocolError;
use protocol::RoundResult;
use protocol::cards::{Card, Deck, Hand};
use protocol::packets::{Decision, DecisionPacket, RequestPacket, RoundUpdate};
use protocol::rules::{dealer_should_hit, settle};
use protocol::wire::{read_message, write_message};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Supplies a fresh deck for every round
pub trait DeckSource: Send {
    fn fresh_deck(&mut self) -> Deck;
}

/// Shuffled 52-card decks from a per-session generator
pub struct ShuffledDecks {
    // StdRng rather than ThreadRng so the session future stays Send
    rng: StdRng,
}

impl ShuffledDecks {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl DeckSource for ShuffledDecks {
    fn fresh_deck(&mut self) -> Deck {
        Deck::shuffled(&mut self.rng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingRequest,
    Dealing,
    PlayerTurn,
    DealerTurn,
    RoundResolved,
    Closed,
}

impl SessionState {
    /// Whether `next` may directly follow this state
    pub fn can_advance_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (AwaitingRequest, Dealing | Closed)
                | (Dealing, PlayerTurn)
                | (PlayerTurn, DealerTurn | RoundResolved)
                | (DealerTurn, RoundResolved)
                | (RoundResolved, Dealing | Closed)
        )
    }
}

/// Results of a finished session, from the player's point of view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub team_name: String,
    pub rounds: u8,
    pub wins: u32,
    pub ties: u32,
    pub losses: u32,
}

impl SessionSummary {
    fn record(&mut self, result: RoundResult) {
        match result {
            RoundResult::Win => self.wins += 1,
            RoundResult::Tie => self.ties += 1,
            RoundResult::Loss => self.losses += 1,
            RoundResult::NotOver => {}
        }
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} rounds, {} won, {} tied, {} lost",
            self.team_name, self.rounds, self.wins, self.ties, self.losses
        )
    }
}

pub struct GameSession<S, D> {
    stream: S,
    decks: D,
    read_timeout: Duration,
    state: SessionState,
    peer: String,
}

impl<S, D> GameSession<S, D>
where
    S: AsyncRead + AsyncWrite + Unpin,
    D: DeckSource,
{
    pub fn new(stream: S, decks: D, read_timeout: Duration, peer: impl Into<String>) -> Self {
        Self {
            stream,
            decks,
            read_timeout,
            state: SessionState::AwaitingRequest,
            peer: peer.into(),
        }
    }

    /// Play every requested round, then close the stream.
    ///
    /// The stream is dropped on error as well, so the peer always sees the
    /// connection end.
    pub async fn run(mut self) -> Result<SessionSummary, ProtocolError> {
        let request: RequestPacket = read_message(&mut self.stream, self.read_timeout).await?;

        info!(
            "Session with {} started: team '{}', {} rounds",
            self.peer, request.team_name, request.round_count
        );

        let mut summary = SessionSummary {
            team_name: request.team_name,
            rounds: request.round_count,
            ..Default::default()
        };

        for round in 1..=request.round_count {
            let result = self.play_round(round).await?;
            debug!("{}: round {} -> {:?}", self.peer, round, result);
            summary.record(result);
        }

        self.transition(SessionState::Closed);
        if let Err(e) = self.stream.shutdown().await {
            debug!("Shutdown of {} failed: {}", self.peer, e);
        }

        Ok(summary)
    }

    async fn play_round(&mut self, round: u8) -> Result<RoundResult, ProtocolError> {
        debug!("{}: dealing round {}", self.peer, round);
        self.transition(SessionState::Dealing);

        let mut deck = self.decks.fresh_deck();
        let mut player = Hand::new();
        let mut dealer = Hand::new();

        player.push(deck.draw()?);
        player.push(deck.draw()?);
        dealer.push(deck.draw()?);
        let hole_card = deck.draw()?;

        for &card in player.cards() {
            self.send(RoundUpdate::card(card)).await?;
        }
        for &card in dealer.cards() {
            self.send(RoundUpdate::card(card)).await?;
        }

        self.transition(SessionState::PlayerTurn);
        if self.player_turn(&mut deck, &mut player).await? {
            // Bust: the loss went out together with the last card
            self.transition(SessionState::RoundResolved);
            return Ok(RoundResult::Loss);
        }

        self.transition(SessionState::DealerTurn);
        self.dealer_turn(&mut deck, &mut dealer, hole_card).await?;

        self.transition(SessionState::RoundResolved);
        let result = settle(player.total(), dealer.total());
        self.send(RoundUpdate::result(result)).await?;

        Ok(result)
    }

    /// Returns true when the player busted
    async fn player_turn(&mut self, deck: &mut Deck, player: &mut Hand) -> Result<bool, ProtocolError> {
        loop {
            let packet: DecisionPacket = read_message(&mut self.stream, self.read_timeout).await?;

            if packet.decision == Decision::Stand {
                return Ok(false);
            }

            let card = deck.draw()?;
            player.push(card);

            if player.is_bust() {
                self.send(RoundUpdate {
                    result: RoundResult::Loss,
                    card: Some(card),
                })
                .await?;
                return Ok(true);
            }

            self.send(RoundUpdate::card(card)).await?;
        }
    }

    async fn dealer_turn(&mut self, deck: &mut Deck, dealer: &mut Hand, hole_card: Card) -> Result<(), ProtocolError> {
        // No dedicated reveal message: the hole card goes out as a regular card
        dealer.push(hole_card);
        self.send(RoundUpdate::card(hole_card)).await?;

        while dealer_should_hit(dealer.total()) {
            let card = deck.draw()?;
            dealer.push(card);
            self.send(RoundUpdate::card(card)).await?;
        }

        Ok(())
    }

    async fn send(&mut self, update: RoundUpdate) -> Result<(), ProtocolError> {
        write_message(&mut self.stream, &update).await
    }

    fn transition(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal session transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!("{}: {:?} -> {:?}", self.peer, self.state, next);
        self.state = next;
    }
}
