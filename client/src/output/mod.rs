//! Console rendering of game progress

use crate::discovery::DiscoveredServer;
use crate::session::{Party, RoundObserver, SessionSummary};
use protocol::RoundResult;
use protocol::cards::{Card, Hand};

/// Human readable card name, e.g. "Queen of Spades"
pub fn card_name(card: &Card) -> String {
    format!("{} of {}", card.rank_name(), card.suit().name())
}

pub fn result_banner(result: RoundResult) -> &'static str {
    match result {
        RoundResult::Win => "You won this round!",
        RoundResult::Tie => "It's a tie.",
        RoundResult::Loss => "You lost this round.",
        RoundResult::NotOver => "Round still in progress",
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Prints every card and result to stdout
#[derive(Debug, Default)]
pub struct ConsoleOutput;

impl ConsoleOutput {
    pub fn new() -> Self {
        Self
    }

    pub fn server_found(&self, server: &DiscoveredServer) {
        println!(
            "[{}] Received offer from '{}' at {}, connecting...",
            timestamp(),
            server.name,
            server.addr
        );
    }

    pub fn session_finished(&self, summary: &SessionSummary) {
        println!(
            "\nFinished playing {} rounds: {} won, {} tied, {} lost (win rate {:.1}%)",
            summary.rounds,
            summary.wins,
            summary.ties,
            summary.losses,
            summary.win_rate()
        );
    }
}

impl RoundObserver for ConsoleOutput {
    fn round_started(&mut self, round: u8, rounds: u8) {
        println!("\n--- Round {}/{} ---", round, rounds);
    }

    fn card_dealt(&mut self, party: Party, card: Card, hand: &Hand) {
        let who = match party {
            Party::Player => "You got",
            Party::Dealer => "Dealer shows",
        };
        println!(
            "[{}] {} {} (total {})",
            timestamp(),
            who,
            card_name(&card),
            hand.total()
        );
    }

    fn round_finished(&mut self, _round: u8, result: RoundResult, player: &Hand, dealer: &Hand) {
        let dealer_total = if dealer.len() > 1 {
            dealer.total().to_string()
        } else {
            "-".to_string()
        };
        println!(
            ">>> {} (you {}, dealer {})",
            result_banner(result),
            player.total(),
            dealer_total
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::cards::Suit;

    #[test]
    fn test_card_names() {
        let queen = Card::new(12, Suit::Spades).unwrap();
        assert_eq!(card_name(&queen), "Queen of Spades");

        let ace = Card::new(1, Suit::Hearts).unwrap();
        assert_eq!(card_name(&ace), "Ace of Hearts");
    }
}
