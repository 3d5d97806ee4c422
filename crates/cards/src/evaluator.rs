use super::card::Card;
use super::hand::Hand;
use super::kicks::Kickers;
use super::rank::Rank;
use super::ranking::Ranking;
use super::suit::Suit;

/// A lazy evaluator for a hand's strength.
///
/// Using a compact representation of the Hand, we search for the highest
/// [`Ranking`] with bitwise operations over rank masks, then extract the
/// kickers that ranking leaves unbound. Works on any 5-to-7-card hand; for
/// seven cards the result is the best of the twenty-one 5-card choices
/// without enumerating them.
pub struct Evaluator {
    rank_masks: u16,         // which ranks are in the hand, neglecting suit
    suit_masks: [u16; 4],    // which ranks are in the hand, grouped by suit
    suit_count: [u8; 4],     // how many suits (i) are in the hand, neglecting rank
    rank_count: [u8; 13],    // how many ranks (i) are in the hand, neglecting suit
}

impl From<Hand> for Evaluator {
    fn from(hand: Hand) -> Self {
        let ref cards = Vec::<Card>::from(hand);
        Self {
            rank_masks: Self::rank_masks(cards),
            suit_masks: Self::suit_masks(cards),
            suit_count: Self::suit_count(cards),
            rank_count: Self::rank_count(cards),
        }
    }
}

impl Evaluator {
    fn rank_count(cards: &Vec<Card>) -> [u8; 13] {
        cards
            .iter()
            .map(|c| c.rank() as usize)
            .fold([0; 13], |mut counts, r| {
                counts[r] += 1;
                counts
            })
    }
    fn suit_count(cards: &Vec<Card>) -> [u8; 4] {
        cards
            .iter()
            .map(|c| c.suit() as usize)
            .fold([0; 4], |mut counts, s| {
                counts[s] += 1;
                counts
            })
    }
    fn suit_masks(cards: &Vec<Card>) -> [u16; 4] {
        cards
            .iter()
            .map(|c| (c.suit() as usize, u16::from(c.rank())))
            .fold([0; 4], |mut suits, (s, r)| {
                suits[s] |= r;
                suits
            })
    }
    fn rank_masks(cards: &Vec<Card>) -> u16 {
        cards
            .iter()
            .map(|c| u16::from(c.rank()))
            .fold(0, |acc, r| acc | r)
    }
}

/// Ranking search, ordered so the first hit is the best category.
/// Flush-before-quads is sound: seven cards cannot hold both a flush
/// and four of a kind (or a full house), so the shortcut never misranks.
impl Evaluator {
    pub fn find_ranking(&self) -> Ranking {
        self.find_flush()
            .or_else(|| self.find_4_oak())
            .or_else(|| self.find_3_oak_2_oak())
            .or_else(|| self.find_straight())
            .or_else(|| self.find_3_oak())
            .or_else(|| self.find_2_oak_2_oak())
            .or_else(|| self.find_2_oak())
            .or_else(|| self.find_1_oak())
            .expect("at least one card in Hand")
    }

    /// Kickers are the highest unbound ranks, as many as the category leaves
    /// open. A flush's kickers live inside the flush suit only.
    pub fn find_kickers(&self, value: Ranking) -> Kickers {
        let n = value.n_kickers();
        match value {
            Ranking::Flush(hi) => {
                let suit = self.find_suit_of_flush().expect("flush has a suit");
                let mask = self.suit_masks[suit as usize] & !u16::from(hi);
                Kickers::from(Self::top_ranks(mask, n))
            }
            Ranking::HighCard(hi) | Ranking::OnePair(hi) | Ranking::ThreeOAK(hi)
            | Ranking::FourOAK(hi) => {
                let mask = self.rank_masks & !u16::from(hi);
                Kickers::from(Self::top_ranks(mask, n))
            }
            Ranking::TwoPair(hi, lo) => {
                let mask = self.rank_masks & !u16::from(hi) & !u16::from(lo);
                Kickers::from(Self::top_ranks(mask, n))
            }
            Ranking::Straight(_) | Ranking::FullHouse(..) | Ranking::StraightFlush(_) => {
                Kickers::default()
            }
        }
    }

    fn top_ranks(mask: u16, n: usize) -> Vec<Rank> {
        (0..13u8)
            .rev()
            .filter(|r| mask & (1u16 << r) != 0)
            .take(n)
            .map(Rank::from)
            .collect()
    }
}

impl Evaluator {
    fn find_1_oak(&self) -> Option<Ranking> {
        self.find_rank_of_n_oak(1).map(Ranking::HighCard)
    }
    fn find_2_oak(&self) -> Option<Ranking> {
        self.find_rank_of_n_oak(2).map(Ranking::OnePair)
    }
    fn find_3_oak(&self) -> Option<Ranking> {
        self.find_rank_of_n_oak(3).map(Ranking::ThreeOAK)
    }
    fn find_4_oak(&self) -> Option<Ranking> {
        self.find_rank_of_n_oak(4).map(Ranking::FourOAK)
    }
    fn find_2_oak_2_oak(&self) -> Option<Ranking> {
        self.find_rank_of_n_oak(2).and_then(|hi| {
            self.find_rank_of_n_oak_below(2, hi as usize)
                .map(|lo| Ranking::TwoPair(hi, lo))
        })
    }
    fn find_3_oak_2_oak(&self) -> Option<Ranking> {
        self.find_rank_of_n_oak(3).and_then(|three| {
            self.find_rank_of_n_oak_below(2, three as usize)
                .map(|two| Ranking::FullHouse(three, two))
        })
    }
    fn find_straight(&self) -> Option<Ranking> {
        self.find_rank_of_straight(self.rank_masks)
            .map(Ranking::Straight)
    }
    fn find_flush(&self) -> Option<Ranking> {
        self.find_suit_of_flush().map(|suit| {
            match self.find_rank_of_straight_flush(suit) {
                Some(rank) => Ranking::StraightFlush(rank),
                None => Ranking::Flush(Rank::from(self.suit_masks[suit as usize])),
            }
        })
    }
}

impl Evaluator {
    fn find_rank_of_straight(&self, ranks: u16) -> Option<Rank> {
        const WHEEL: u16 = 0b1_0000_0000_1111;
        let mut mask = ranks;
        mask &= mask << 1;
        mask &= mask << 1;
        mask &= mask << 1;
        mask &= mask << 1;
        if mask > 0 {
            Some(Rank::from(mask))
        } else if WHEEL == (WHEEL & ranks) {
            Some(Rank::Five)
        } else {
            None
        }
    }
    fn find_rank_of_straight_flush(&self, suit: Suit) -> Option<Rank> {
        let flush = self.suit_masks[suit as usize];
        self.find_rank_of_straight(flush)
    }
    fn find_suit_of_flush(&self) -> Option<Suit> {
        self.suit_count
            .iter()
            .position(|&n| n >= 5)
            .map(|i| Suit::from(i as u8))
    }
    fn find_rank_of_n_oak_below(&self, n: u8, high: usize) -> Option<Rank> {
        self.rank_count
            .iter()
            .take(high)
            .rev()
            .position(|&r| r >= n)
            .map(|i| high - i - 1)
            .map(|r| Rank::from(r as u8))
    }
    fn find_rank_of_n_oak(&self, n: u8) -> Option<Rank> {
        self.find_rank_of_n_oak_below(n, 13)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strength::Strength;

    fn strength(s: &str) -> Strength {
        Strength::from(Hand::from(Card::parse(s).expect("valid cards")))
    }

    #[test]
    fn high_card() {
        let s = strength("As Kd 9h 7c 5s 3d 2c");
        assert_eq!(s.value(), Ranking::HighCard(Rank::Ace));
        assert_eq!(
            s.kicks().ranks(),
            &[Rank::King, Rank::Nine, Rank::Seven, Rank::Five]
        );
    }

    #[test]
    fn one_pair_kickers() {
        let s = strength("As Ad 9h 7c 5s 3d 2c");
        assert_eq!(s.value(), Ranking::OnePair(Rank::Ace));
        assert_eq!(s.kicks().ranks(), &[Rank::Nine, Rank::Seven, Rank::Five]);
    }

    #[test]
    fn two_pair_takes_best_two_of_three() {
        let s = strength("As Ad Kh Kc Qs Qd 2c");
        assert_eq!(s.value(), Ranking::TwoPair(Rank::Ace, Rank::King));
        assert_eq!(s.kicks().ranks(), &[Rank::Queen]);
    }

    #[test]
    fn trips() {
        let s = strength("As Ad Ah 7c 5s 3d 2c");
        assert_eq!(s.value(), Ranking::ThreeOAK(Rank::Ace));
        assert_eq!(s.kicks().ranks(), &[Rank::Seven, Rank::Five]);
    }

    #[test]
    fn straight() {
        let s = strength("9s 8d 7h 6c 5s Ad 2c");
        assert_eq!(s.value(), Ranking::Straight(Rank::Nine));
        assert!(s.kicks().ranks().is_empty());
    }

    #[test]
    fn wheel_straight_tops_at_five() {
        let s = strength("As 2d 3h 4c 5s Kd 9c");
        assert_eq!(s.value(), Ranking::Straight(Rank::Five));
    }

    #[test]
    fn wheel_loses_to_six_high() {
        let wheel = strength("As 2d 3h 4c 5s Kd 9c");
        let sixhigh = strength("2s 3d 4h 5c 6s Kd 9c");
        assert!(wheel < sixhigh);
    }

    #[test]
    fn flush_beats_straight() {
        let flush = strength("As Qs 9s 7s 3s Kd 2c");
        let straight = strength("9s 8d 7h 6c 5s Ad 2c");
        assert_eq!(flush.value(), Ranking::Flush(Rank::Ace));
        assert!(flush > straight);
    }

    #[test]
    fn flush_compares_all_five_ranks() {
        let better = strength("As Qs 9s 7s 4s Kd Kh");
        let worse = strength("As Qs 9s 7s 3s Kd Kh");
        assert!(better > worse);
    }

    #[test]
    fn flush_kickers_stay_in_suit() {
        // the Kd does not outkick the spades
        let s = strength("As Qs 9s 7s 3s Kd 2c");
        assert_eq!(
            s.kicks().ranks(),
            &[Rank::Queen, Rank::Nine, Rank::Seven, Rank::Three]
        );
    }

    #[test]
    fn full_house_over_flush() {
        let boat = strength("As Ad Ah Kc Ks 3d 2c");
        let flush = strength("As Qs 9s 7s 3s Kd 2c");
        assert_eq!(boat.value(), Ranking::FullHouse(Rank::Ace, Rank::King));
        assert!(boat > flush);
    }

    #[test]
    fn full_house_best_pair_of_two() {
        let s = strength("As Ad Ah Kc Ks Qd Qc");
        assert_eq!(s.value(), Ranking::FullHouse(Rank::Ace, Rank::King));
    }

    #[test]
    fn quads() {
        let s = strength("As Ad Ah Ac Ks 3d 2c");
        assert_eq!(s.value(), Ranking::FourOAK(Rank::Ace));
        assert_eq!(s.kicks().ranks(), &[Rank::King]);
    }

    #[test]
    fn straight_flush() {
        let s = strength("9s 8s 7s 6s 5s Ad 2c");
        assert_eq!(s.value(), Ranking::StraightFlush(Rank::Nine));
    }

    #[test]
    fn steel_wheel() {
        let s = strength("As 2s 3s 4s 5s Kd 9c");
        assert_eq!(s.value(), Ranking::StraightFlush(Rank::Five));
    }

    #[test]
    fn board_plays_ties() {
        let a = strength("2c 3d As Ks Qs Js Ts");
        let b = strength("2h 3h As Ks Qs Js Ts");
        assert_eq!(a, b);
    }

    #[test]
    fn comparator_laws_over_random_hands() {
        use crate::deck::Deck;
        for _ in 0..64 {
            let mut deck = Deck::shuffled();
            let mut draw7 = || {
                Hand::from((0..7).map(|_| deck.draw().unwrap()).collect::<Vec<_>>())
            };
            let x = Strength::from(draw7());
            let y = Strength::from(draw7());
            // determinism and antisymmetry
            assert_eq!(x.cmp(&y), y.cmp(&x).reverse());
            assert_eq!(x.cmp(&y), x.cmp(&y));
        }
    }
}
