//! Client side of a game session
//!
//! The driver never assumes how many updates a round has: it reads one
//! `RoundUpdate` at a time and only the result byte tells a dealt card
//! (0) from the end of the round (1, 2 or 3).

pub mod strategy;

pub use strategy::{PromptStrategy, Strategy, ThresholdStrategy};

use protocol::ProtocolError;
use protocol::RoundResult;
use protocol::cards::{Card, Hand};
use protocol::packets::{Decision, DecisionPacket, RequestPacket, RoundUpdate};
use protocol::wire::{read_message, write_message};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

/// Who a dealt card belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Player,
    Dealer,
}

/// Presentation hooks for round progress
pub trait RoundObserver {
    fn round_started(&mut self, round: u8, rounds: u8);

    fn card_dealt(&mut self, party: Party, card: Card, hand: &Hand);

    fn round_finished(&mut self, round: u8, result: RoundResult, player: &Hand, dealer: &Hand);
}

impl<T: RoundObserver + ?Sized> RoundObserver for &mut T {
    fn round_started(&mut self, round: u8, rounds: u8) {
        (**self).round_started(round, rounds)
    }

    fn card_dealt(&mut self, party: Party, card: Card, hand: &Hand) {
        (**self).card_dealt(party, card, hand)
    }

    fn round_finished(&mut self, round: u8, result: RoundResult, player: &Hand, dealer: &Hand) {
        (**self).round_finished(round, result, player, dealer)
    }
}

/// Cumulative score across the rounds of one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
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

    /// Percentage of rounds won
    pub fn win_rate(&self) -> f64 {
        if self.rounds == 0 {
            return 0.0;
        }
        f64::from(self.wins) / f64::from(self.rounds) * 100.0
    }
}

#[derive(Default)]
struct Table {
    player: Hand,
    dealer: Hand,
}

impl Table {
    fn hand_mut(&mut self, party: Party) -> &mut Hand {
        match party {
            Party::Player => &mut self.player,
            Party::Dealer => &mut self.dealer,
        }
    }
}

pub struct SessionDriver<S, St, O> {
    stream: S,
    strategy: St,
    observer: O,
    read_timeout: Duration,
}

impl<S, St, O> SessionDriver<S, St, O>
where
    S: AsyncRead + AsyncWrite + Unpin,
    St: Strategy,
    O: RoundObserver,
{
    pub fn new(stream: S, strategy: St, observer: O, read_timeout: Duration) -> Self {
        Self {
            stream,
            strategy,
            observer,
            read_timeout,
        }
    }

    /// Send the request and play every round it asks for
    pub async fn play(mut self, request: &RequestPacket) -> Result<SessionSummary, ProtocolError> {
        write_message(&mut self.stream, request).await?;

        let mut summary = SessionSummary::default();
        for round in 1..=request.round_count {
            self.observer.round_started(round, request.round_count);

            let (result, table) = self.play_round().await?;
            self.observer
                .round_finished(round, result, &table.player, &table.dealer);

            summary.rounds = round;
            summary.record(result);
        }

        Ok(summary)
    }

    async fn play_round(&mut self) -> Result<(RoundResult, Table), ProtocolError> {
        let mut table = Table::default();

        // Opening deal: two player cards, then the dealer's visible card
        for party in [Party::Player, Party::Player, Party::Dealer] {
            if let Some(result) = self.receive(party, &mut table).await? {
                return Ok((result, table));
            }
        }

        loop {
            let upcard = table.dealer.cards().first().copied();
            let decision = self.strategy.decide(&table.player, upcard).await;
            debug!("Sending {:?} at total {}", decision, table.player.total());
            write_message(&mut self.stream, &DecisionPacket { decision }).await?;

            if decision == Decision::Stand {
                break;
            }

            if let Some(result) = self.receive(Party::Player, &mut table).await? {
                return Ok((result, table));
            }
        }

        // Dealer reveal and draws until the result arrives
        loop {
            if let Some(result) = self.receive(Party::Dealer, &mut table).await? {
                return Ok((result, table));
            }
        }
    }

    /// Read one update, file its card under `party`, and return the result
    /// if it ended the round
    async fn receive(&mut self, party: Party, table: &mut Table) -> Result<Option<RoundResult>, ProtocolError> {
        let update: RoundUpdate = read_message(&mut self.stream, self.read_timeout).await?;

        if let Some(card) = update.card {
            let hand = table.hand_mut(party);
            hand.push(card);
            self.observer.card_dealt(party, card, hand);
        } else if !update.result.is_terminal() {
            debug!("Ignoring empty update while waiting for a {:?} card", party);
        }

        Ok(update.result.is_terminal().then_some(update.result))
    }
}
