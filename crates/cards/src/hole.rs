use super::card::Card;
use super::hand::Hand;
use serde::Deserialize;
use serde::Serialize;

/// A player's two private hole cards, in the order they were dealt.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hole(Card, Card);

impl Hole {
    pub fn cards(&self) -> [Card; 2] {
        [self.0, self.1]
    }
}

impl From<(Card, Card)> for Hole {
    fn from((a, b): (Card, Card)) -> Self {
        debug_assert!(a != b);
        Self(a, b)
    }
}

impl From<Hole> for Hand {
    fn from(hole: Hole) -> Self {
        Hand::add(Hand::from(hole.0), Hand::from(hole.1))
    }
}

impl TryFrom<&str> for Hole {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match Card::parse(s)?.as_slice() {
            &[a, b] => Ok(Self::from((a, b))),
            _ => Err("hole must contain exactly two cards".into()),
        }
    }
}

impl std::fmt::Display for Hole {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_deal_order() {
        let hole = Hole::try_from("2cAs").unwrap();
        assert_eq!(hole.to_string(), "2cAs");
    }

    #[test]
    fn two_distinct_bits() {
        let hole = Hole::try_from("KhKs").unwrap();
        assert_eq!(Hand::from(hole).size(), 2);
    }
}
