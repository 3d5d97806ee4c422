use super::rank::Rank;

/// A poker hand's category and in-category ranks.
///
/// Variant order is the comparison order, so the derived `Ord` compares
/// category first and payload ranks second. Kicker cards are not included
/// here; [`Kickers`] breaks the remaining ties.
///
/// [`Kickers`]: super::kicks::Kickers
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub enum Ranking {
    HighCard(Rank),        // 4 kickers
    OnePair(Rank),         // 3 kickers
    TwoPair(Rank, Rank),   // 1 kicker
    ThreeOAK(Rank),        // 2 kickers
    Straight(Rank),        // 0 kickers
    Flush(Rank),           // 4 kickers
    FullHouse(Rank, Rank), // 0 kickers
    FourOAK(Rank),         // 1 kicker
    StraightFlush(Rank),   // 0 kickers
}

impl Ranking {
    pub fn n_kickers(&self) -> usize {
        match self {
            Ranking::HighCard(_) | Ranking::Flush(_) => 4,
            Ranking::OnePair(_) => 3,
            Ranking::ThreeOAK(_) => 2,
            Ranking::FourOAK(_) | Ranking::TwoPair(_, _) => 1,
            _ => 0,
        }
    }
}

impl std::fmt::Display for Ranking {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Ranking::FullHouse(r1, r2) => write!(f, "FullHouse     {}{}", r1, r2),
            Ranking::TwoPair(r1, r2) => write!(f, "TwoPair       {}{}", r1, r2),
            Ranking::HighCard(r) => write!(f, "HighCard      {} ", r),
            Ranking::OnePair(r) => write!(f, "OnePair       {} ", r),
            Ranking::ThreeOAK(r) => write!(f, "ThreeOfAKind  {} ", r),
            Ranking::Straight(r) => write!(f, "Straight      {} ", r),
            Ranking::FourOAK(r) => write!(f, "FourOfAKind   {} ", r),
            Ranking::Flush(r) => write!(f, "Flush         {} ", r),
            Ranking::StraightFlush(r) => write!(f, "StraightFlush {} ", r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_order() {
        assert!(Ranking::StraightFlush(Rank::Five) > Ranking::FourOAK(Rank::Ace));
        assert!(Ranking::FourOAK(Rank::Two) > Ranking::FullHouse(Rank::Ace, Rank::King));
        assert!(Ranking::FullHouse(Rank::Two, Rank::Three) > Ranking::Flush(Rank::Ace));
        assert!(Ranking::Flush(Rank::Seven) > Ranking::Straight(Rank::Ace));
        assert!(Ranking::Straight(Rank::Five) > Ranking::ThreeOAK(Rank::Ace));
        assert!(Ranking::ThreeOAK(Rank::Two) > Ranking::TwoPair(Rank::Ace, Rank::King));
        assert!(Ranking::TwoPair(Rank::Two, Rank::Three) > Ranking::OnePair(Rank::Ace));
        assert!(Ranking::OnePair(Rank::Two) > Ranking::HighCard(Rank::Ace));
    }

    #[test]
    fn payload_order() {
        assert!(Ranking::TwoPair(Rank::Ace, Rank::Two) > Ranking::TwoPair(Rank::King, Rank::Queen));
        assert!(Ranking::FullHouse(Rank::Three, Rank::Two) > Ranking::FullHouse(Rank::Two, Rank::Ace));
    }
}
