use felt_cards::Card;
use felt_cards::Hole;
use felt_cards::Strength;
use felt_core::Chips;
use felt_core::Position;
use std::collections::BTreeMap;

/// One hand's worth of a seat, extracted for settlement.
///
/// Folded entrants size the pots but can never win one. `strength` is
/// present for unfolded seats in a contested hand and absent when the pot
/// goes uncontested.
#[derive(Debug, Clone)]
pub struct Entrant {
    pub position: Position,
    pub contributed: Chips,
    pub folded: bool,
    pub strength: Option<Strength>,
}

/// A single pot: its chips, who can win it, and who did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pot {
    pub amount: Chips,
    pub eligible: Vec<Position>,
    pub winners: Vec<Position>,
}

/// Everything the session layer needs to announce a finished hand.
#[derive(Debug)]
pub struct HandOutcome {
    pub dealer: Position,
    pub board: Vec<Card>,
    pub pot: Chips,
    pub pots: Vec<Pot>,
    pub reveals: Vec<(Position, Hole)>,
}

/// Computes chip distributions at the end of a hand.
///
/// Pots are built from the sorted distinct contribution levels of the
/// unfolded entrants. Within each band, every entrant's chips count toward
/// the size (folded money is won, not refunded) but only unfolded seats
/// that covered the level are eligible. The final band absorbs anything
/// contributed above the top level, so the pots always sum to the chips
/// collected. Each pot splits evenly among its best hands; an odd remainder
/// goes to the winner closest clockwise after the dealer.
#[derive(Debug)]
pub struct Showdown {
    entrants: Vec<Entrant>,
    dealer: Position,
    /// Chips from seats vacated mid-hand, folded into the first pot.
    extra: Chips,
    ring: usize,
}

impl Showdown {
    pub fn new(entrants: Vec<Entrant>, dealer: Position, extra: Chips, ring: usize) -> Self {
        Self {
            entrants,
            dealer,
            extra,
            ring,
        }
    }

    /// Builds the pots, picks winners, and returns the per-seat payouts.
    pub fn settle(self) -> (Vec<Pot>, Vec<(Position, Chips)>) {
        let mut pots = self.pots();
        let mut payouts = BTreeMap::new();
        for pot in pots.iter_mut() {
            pot.winners = self.winners(&pot.eligible);
            let n = pot.winners.len() as Chips;
            let share = pot.amount / n;
            let bonus = pot.amount % n;
            for &winner in pot.winners.iter() {
                *payouts.entry(winner).or_insert(0) += share;
            }
            if bonus > 0 {
                let first = self.first_after_dealer(&pot.winners);
                *payouts.entry(first).or_insert(0) += bonus;
            }
        }
        debug_assert_eq!(
            pots.iter().map(|p| p.amount).sum::<Chips>(),
            self.entrants.iter().map(|e| e.contributed).sum::<Chips>() + self.extra,
        );
        (pots, payouts.into_iter().collect())
    }

    /// Sorted distinct contribution levels over unfolded entrants.
    fn levels(&self) -> Vec<Chips> {
        let mut levels = self
            .entrants
            .iter()
            .filter(|e| !e.folded)
            .map(|e| e.contributed)
            .filter(|&c| c > 0)
            .collect::<Vec<_>>();
        levels.sort_unstable();
        levels.dedup();
        levels
    }

    fn pots(&self) -> Vec<Pot> {
        let levels = self.levels();
        if levels.is_empty() {
            // degenerate: the lone unfolded seat put nothing in. it still
            // collects whatever the folded seats left behind
            let amount = self.entrants.iter().map(|e| e.contributed).sum::<Chips>() + self.extra;
            let eligible = self.eligible(0);
            return vec![Pot {
                amount,
                eligible,
                winners: Vec::new(),
            }];
        }
        let mut pots = Vec::with_capacity(levels.len());
        let mut prev = 0;
        for (i, &level) in levels.iter().enumerate() {
            let last = i + 1 == levels.len();
            let amount = self
                .entrants
                .iter()
                .map(|e| match last {
                    // the top band soaks up any folded chips above it
                    true => e.contributed.saturating_sub(prev),
                    false => e.contributed.min(level).saturating_sub(prev),
                })
                .sum::<Chips>()
                + if i == 0 { self.extra } else { 0 };
            pots.push(Pot {
                amount,
                eligible: self.eligible(level),
                winners: Vec::new(),
            });
            prev = level;
        }
        pots
    }

    /// Unfolded entrants whose contribution covers the level, in seat order.
    fn eligible(&self, level: Chips) -> Vec<Position> {
        self.entrants
            .iter()
            .filter(|e| !e.folded && e.contributed >= level)
            .map(|e| e.position)
            .collect()
    }

    /// Best hands among the eligible seats. `Option<Strength>` ordering
    /// makes the uncontested case fall out: a lone eligible seat with no
    /// evaluated hand still maximizes.
    fn winners(&self, eligible: &[Position]) -> Vec<Position> {
        let best = eligible.iter().filter_map(|p| self.strength(*p)).max();
        eligible
            .iter()
            .filter(|&&p| self.strength(p) == best)
            .copied()
            .collect()
    }

    fn strength(&self, position: Position) -> Option<&Strength> {
        self.entrants
            .iter()
            .find(|e| e.position == position)
            .and_then(|e| e.strength.as_ref())
    }

    /// The deterministic odd-chip tiebreak: smallest clockwise distance
    /// from the seat after the dealer.
    fn first_after_dealer(&self, winners: &[Position]) -> Position {
        *winners
            .iter()
            .min_by_key(|&&p| (p + self.ring - self.dealer - 1) % self.ring)
            .expect("every pot has a winner")
    }
}
