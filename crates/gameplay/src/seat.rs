use felt_core::Chips;
use felt_cards::Hole;
use serde::Deserialize;
use serde::Serialize;

/// One slot in the table ring, occupied by a participant.
///
/// The seat holds everything the table needs to know about its occupant:
/// the authenticated identity, the stack, the chips committed this street
/// and this hand, and the betting flags. The `session` field is an opaque
/// connection id owned by the session layer; it is never persisted, so a
/// rehydrated seat always comes back disconnected.
///
/// # Fields
///
/// - `current_bet` — chips committed this betting round
/// - `total_contributed` — chips committed this hand (side-pot levels)
/// - `acted` — has acted since the last raise this round
/// - `hole` — present exactly while the seat is dealt into a hand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    identity: String,
    #[serde(skip)]
    session: Option<u64>,
    chips: Chips,
    current_bet: Chips,
    total_contributed: Chips,
    folded: bool,
    all_in: bool,
    acted: bool,
    hole: Option<Hole>,
    reclaim_deadline_ms: Option<u64>,
}

impl Seat {
    pub fn new(identity: String, chips: Chips) -> Self {
        Self {
            identity,
            session: None,
            chips,
            current_bet: 0,
            total_contributed: 0,
            folded: false,
            all_in: false,
            acted: false,
            hole: None,
            reclaim_deadline_ms: None,
        }
    }
}

impl Seat {
    pub fn identity(&self) -> &str {
        &self.identity
    }
    pub fn chips(&self) -> Chips {
        self.chips
    }
    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }
    pub fn total_contributed(&self) -> Chips {
        self.total_contributed
    }
    pub fn folded(&self) -> bool {
        self.folded
    }
    pub fn all_in(&self) -> bool {
        self.all_in
    }
    pub fn acted(&self) -> bool {
        self.acted
    }
    pub fn hole(&self) -> Option<Hole> {
        self.hole
    }
    /// Dealt into the current hand. Seats taken mid-hand have no hole and
    /// wait out the hand in progress.
    pub fn in_hand(&self) -> bool {
        self.hole.is_some()
    }
    /// Still competing for the pot.
    pub fn unfolded(&self) -> bool {
        self.in_hand() && !self.folded
    }
    /// May still be asked for a decision.
    pub fn actionable(&self) -> bool {
        self.unfolded() && !self.all_in
    }
}

/// Chip movement.
impl Seat {
    /// Commits up to `amount` from the stack, returning what was actually
    /// moved. Hitting zero marks the seat all-in.
    pub fn commit(&mut self, amount: Chips) -> Chips {
        let invested = amount.min(self.chips);
        self.chips -= invested;
        self.current_bet += invested;
        self.total_contributed += invested;
        if self.chips == 0 {
            self.all_in = true;
        }
        invested
    }
    /// Adds winnings to the stack.
    pub fn award(&mut self, amount: Chips) {
        self.chips += amount;
    }
}

/// Per-hand and per-round bookkeeping.
impl Seat {
    pub fn fold(&mut self) {
        self.folded = true;
    }
    pub fn mark_acted(&mut self) {
        self.acted = true;
    }
    pub fn clear_acted(&mut self) {
        self.acted = false;
    }
    /// Deals the seat into a new hand.
    pub fn enter_hand(&mut self, hole: Hole) {
        self.current_bet = 0;
        self.total_contributed = 0;
        self.folded = false;
        self.all_in = false;
        self.acted = false;
        self.hole = Some(hole);
    }
    /// Clears per-hand state when the hand completes.
    pub fn exit_hand(&mut self) {
        self.current_bet = 0;
        self.total_contributed = 0;
        self.folded = false;
        self.all_in = false;
        self.acted = false;
        self.hole = None;
    }
    /// Opens a new betting round.
    pub fn open_round(&mut self) {
        self.current_bet = 0;
        self.acted = false;
    }
}

/// Session binding, owned by the room layer.
impl Seat {
    pub fn session(&self) -> Option<u64> {
        self.session
    }
    pub fn connected(&self) -> bool {
        self.session.is_some()
    }
    pub fn bind(&mut self, session: u64) {
        self.session = Some(session);
        self.reclaim_deadline_ms = None;
    }
    /// Drops the connection and starts the reclaim window.
    pub fn unbind(&mut self, reclaim_deadline_ms: u64) {
        self.session = None;
        self.reclaim_deadline_ms = Some(reclaim_deadline_ms);
    }
    pub fn reclaim_deadline_ms(&self) -> Option<u64> {
        self.reclaim_deadline_ms
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let state = if self.folded {
            "F"
        } else if self.all_in {
            "S"
        } else {
            "P"
        };
        write!(f, "{} {} ${}", state, self.identity, self.chips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use felt_cards::Hole;

    #[test]
    fn commit_clamps_to_stack() {
        let mut seat = Seat::new("alice".into(), 50);
        assert_eq!(seat.commit(80), 50);
        assert_eq!(seat.chips(), 0);
        assert!(seat.all_in());
        assert_eq!(seat.total_contributed(), 50);
    }

    #[test]
    fn enter_hand_resets_round_state() {
        let mut seat = Seat::new("bob".into(), 100);
        seat.commit(10);
        seat.fold();
        seat.enter_hand(Hole::try_from("AsKd").unwrap());
        assert_eq!(seat.current_bet(), 0);
        assert_eq!(seat.total_contributed(), 0);
        assert!(!seat.folded());
        assert!(seat.actionable());
    }

    #[test]
    fn seat_without_hole_is_not_in_hand() {
        let seat = Seat::new("carol".into(), 100);
        assert!(!seat.in_hand());
        assert!(!seat.unfolded());
        assert!(!seat.actionable());
    }

    #[test]
    fn unbind_starts_reclaim_window() {
        let mut seat = Seat::new("dave".into(), 100);
        seat.bind(7);
        assert!(seat.connected());
        seat.unbind(123_456);
        assert!(!seat.connected());
        assert_eq!(seat.reclaim_deadline_ms(), Some(123_456));
    }
}
