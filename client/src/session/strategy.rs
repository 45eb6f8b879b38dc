//! Hit/stand decision strategies

use protocol::cards::{Card, Hand};
use protocol::packets::Decision;
use protocol::rules::BUST_LIMIT;
use std::io::{self, Write};
use tracing::warn;

/// Chooses the next move for the player's hand
pub trait Strategy {
    fn decide(&mut self, player: &Hand, dealer_upcard: Option<Card>) -> impl Future<Output = Decision>;
}

/// Hit while the total is below a fixed threshold
#[derive(Debug, Clone, Copy)]
pub struct ThresholdStrategy {
    hit_below: u16,
}

impl ThresholdStrategy {
    pub fn new(hit_below: u16) -> Self {
        Self { hit_below }
    }
}

impl Strategy for ThresholdStrategy {
    async fn decide(&mut self, player: &Hand, _dealer_upcard: Option<Card>) -> Decision {
        let total = player.total();
        if total < self.hit_below && total < BUST_LIMIT {
            Decision::Hit
        } else {
            Decision::Stand
        }
    }
}

/// Blocking source of answer lines
pub trait LineSource: Send + 'static {
    /// Append the next line to `buf`; 0 bytes read means the input is closed
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

impl LineSource for io::Stdin {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        io::Stdin::read_line(self, buf)
    }
}

/// Ask the human at the terminal
///
/// Reading the answer blocks, so it runs on the blocking pool and the
/// source travels there and back for every decision.
pub struct PromptStrategy<R> {
    input: Option<R>,
}

impl PromptStrategy<io::Stdin> {
    pub fn stdin() -> Self {
        Self::new(io::stdin())
    }
}

impl<R: LineSource> PromptStrategy<R> {
    pub fn new(input: R) -> Self {
        Self { input: Some(input) }
    }
}

impl<R: LineSource> Strategy for PromptStrategy<R> {
    async fn decide(&mut self, player: &Hand, dealer_upcard: Option<Card>) -> Decision {
        // Lost on an earlier failed prompt
        let Some(mut input) = self.input.take() else {
            return Decision::Stand;
        };

        let question = match dealer_upcard {
            Some(card) => format!(
                "Your total is {}, dealer shows {}. Hit or Stand? (h/s): ",
                player.total(),
                card
            ),
            None => format!("Your total is {}. Hit or Stand? (h/s): ", player.total()),
        };

        let asked = tokio::task::spawn_blocking(move || {
            let decision = ask(&mut input, &question);
            (input, decision)
        })
        .await;

        match asked {
            Ok((input, decision)) => {
                self.input = Some(input);
                decision
            }
            Err(e) => {
                warn!("Prompt task failed: {}", e);
                Decision::Stand
            }
        }
    }
}

fn ask<R: LineSource>(input: &mut R, question: &str) -> Decision {
    loop {
        print!("{}", question);
        let _ = io::stdout().flush();

        let mut line = String::new();
        match input.read_line(&mut line) {
            // Closed input: stop drawing
            Ok(0) | Err(_) => return Decision::Stand,
            Ok(_) => {}
        }

        match line.trim().to_ascii_lowercase().as_str() {
            "h" | "hit" => return Decision::Hit,
            "s" | "stand" => return Decision::Stand,
            other => println!("Unrecognized choice '{}', type h or s", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::cards::Suit;
    use std::collections::VecDeque;

    /// Canned answers, one per line
    struct Answers(VecDeque<&'static str>);

    impl LineSource for Answers {
        fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
            match self.0.pop_front() {
                Some(line) => {
                    buf.push_str(line);
                    buf.push('\n');
                    Ok(line.len() + 1)
                }
                None => Ok(0),
            }
        }
    }

    fn hand(ranks: &[u8]) -> Hand {
        let mut hand = Hand::new();
        for &rank in ranks {
            hand.push(Card::new(rank, Suit::Clubs).unwrap());
        }
        hand
    }

    #[tokio::test]
    async fn test_threshold_strategy() {
        let mut strategy = ThresholdStrategy::new(17);
        assert_eq!(strategy.decide(&hand(&[10, 6]), None).await, Decision::Hit);
        assert_eq!(strategy.decide(&hand(&[10, 7]), None).await, Decision::Stand);
        assert_eq!(strategy.decide(&hand(&[1, 6]), None).await, Decision::Stand);
    }

    #[tokio::test]
    async fn test_threshold_never_hits_at_21() {
        let mut strategy = ThresholdStrategy::new(21);
        assert_eq!(strategy.decide(&hand(&[10, 10]), None).await, Decision::Hit);
        assert_eq!(strategy.decide(&hand(&[1, 13]), None).await, Decision::Stand);
    }

    #[tokio::test]
    async fn test_prompt_reads_choices() {
        let mut strategy = PromptStrategy::new(Answers(VecDeque::from(["x", "h", "S"])));
        let h = hand(&[5, 6]);
        assert_eq!(strategy.decide(&h, None).await, Decision::Hit);
        assert_eq!(strategy.decide(&h, None).await, Decision::Stand);
        // Input exhausted
        assert_eq!(strategy.decide(&h, None).await, Decision::Stand);
    }

    #[tokio::test]
    async fn test_prompt_keeps_runtime_responsive() {
        // Blocks until released, like a terminal nobody has typed into yet
        struct Gate(std::sync::mpsc::Receiver<&'static str>);

        impl LineSource for Gate {
            fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
                match self.0.recv() {
                    Ok(line) => {
                        buf.push_str(line);
                        Ok(line.len())
                    }
                    Err(_) => Ok(0),
                }
            }
        }

        let (release, gate) = std::sync::mpsc::channel();
        let mut strategy = PromptStrategy::new(Gate(gate));
        let h = hand(&[9, 2]);

        let ticker = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            release.send("hit").unwrap();
        });

        assert_eq!(strategy.decide(&h, None).await, Decision::Hit);
        ticker.await.unwrap();
    }
}
