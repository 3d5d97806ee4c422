use super::card::Card;
use super::hand::Hand;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde::Serialize;

/// An ordered deck of undealt cards. The top of the deck is the next card
/// dealt, so a serialized deck replays identically after a restart.
///
/// Shuffling draws from an OS-entropy-seeded CSPRNG: the unpredictability
/// of the deal is a game-integrity requirement, not a presentation choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck(Vec<Card>);

impl Deck {
    /// A fresh 52-card deck in a cryptographically unpredictable order.
    pub fn shuffled() -> Self {
        let mut cards = (0..52u8).map(Card::from).collect::<Vec<_>>();
        cards.shuffle(&mut rand::rng());
        Self(cards)
    }
    /// A deck with nothing left to deal. The resting state between hands.
    pub fn empty() -> Self {
        Self(Vec::new())
    }
    /// Deals the top card, if any remain.
    pub fn draw(&mut self) -> Option<Card> {
        self.0.pop()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Deck> for Hand {
    fn from(deck: Deck) -> Self {
        Hand::from(deck.0)
    }
}
impl From<Vec<Card>> for Deck {
    fn from(cards: Vec<Card>) -> Self {
        Self(cards)
    }
}
