//! Fixed house rules shared by server and client

use crate::constants::RoundResult;

/// Totals above this are a bust
pub const BUST_LIMIT: u16 = 21;

/// The dealer stands on this total or higher, soft totals included
pub const DEALER_STANDS_AT: u16 = 17;

/// Dealer policy: hit below 17, stand otherwise. Not influenced by the player.
pub fn dealer_should_hit(dealer_total: u16) -> bool {
    dealer_total < DEALER_STANDS_AT
}

/// Result of a finished round from the player's perspective.
///
/// A two-card 21 gets no bonus; only totals are compared.
pub fn settle(player_total: u16, dealer_total: u16) -> RoundResult {
    if player_total > BUST_LIMIT {
        RoundResult::Loss
    } else if dealer_total > BUST_LIMIT || player_total > dealer_total {
        RoundResult::Win
    } else if player_total == dealer_total {
        RoundResult::Tie
    } else {
        RoundResult::Loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dealer_policy() {
        assert!(dealer_should_hit(11));
        assert!(dealer_should_hit(16));
        assert!(!dealer_should_hit(17));
        assert!(!dealer_should_hit(21));
        assert!(!dealer_should_hit(25));
    }

    #[test]
    fn test_settle() {
        assert_eq!(settle(17, 20), RoundResult::Loss);
        assert_eq!(settle(20, 17), RoundResult::Win);
        assert_eq!(settle(18, 18), RoundResult::Tie);
        assert_eq!(settle(12, 23), RoundResult::Win);
        assert_eq!(settle(22, 23), RoundResult::Loss);
        assert_eq!(settle(21, 21), RoundResult::Tie);
    }
}
