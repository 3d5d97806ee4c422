use crate::action::Action;
use crate::error::EngineError;
use crate::seat::Seat;
use crate::showdown::Entrant;
use crate::showdown::HandOutcome;
use crate::showdown::Showdown;
use crate::stage::Stage;
use felt_cards::Card;
use felt_cards::Deck;
use felt_cards::Hand;
use felt_cards::Hole;
use felt_cards::Strength;
use felt_core::Chips;
use felt_core::Position;
use felt_core::TableConfig;
use serde::Deserialize;
use serde::Serialize;

/// What an accepted mutation did to the hand.
///
/// The session layer uses this to decide what to broadcast and whether to
/// re-arm the decision timer or schedule the next hand.
#[derive(Debug)]
pub enum Applied {
    /// The turn moved within the same betting round.
    Continue,
    /// One or more new streets were dealt; play continues on `Stage`.
    Street(Stage),
    /// The hand finished and chips were distributed.
    Complete(HandOutcome),
}

/// The authoritative state of one table.
///
/// A fixed ring of seats, the undealt deck, the board, and the betting
/// bookkeeping for the street in progress. `Table` is plain mutable state:
/// it has no channels or clocks, and every public mutation is expected to
/// run inside the room's single command loop. The serde form of the whole
/// struct (deck and hole cards included) is the restart snapshot.
///
/// # Betting bookkeeping
///
/// - `current_bet_to_call` — the level every unfolded, non-all-in seat
///   must match before the round can close
/// - `last_raise_amount` — most recent raise increment, seeding the
///   minimum for the next raise; reset to the big blind each street
/// - per-seat `acted` marks — cleared when the level moves, so a round
///   only closes once everyone has answered the latest raise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    config: TableConfig,
    seats: Vec<Option<Seat>>,
    deck: Deck,
    community: Vec<Card>,
    pot: Chips,
    current_bet_to_call: Chips,
    last_raise_amount: Chips,
    dealer: Option<Position>,
    turn: Option<Position>,
    stage: Stage,
    /// Sum of all stacks plus the pot. Constant between seating changes;
    /// the conservation side of `audit`.
    bankroll: Chips,
    /// Chips contributed this hand by seats that have since been vacated.
    forfeited: Chips,
}

impl Table {
    pub fn new(config: TableConfig) -> Self {
        let seats = (0..config.seats).map(|_| None).collect();
        Self {
            config,
            seats,
            deck: Deck::empty(),
            community: Vec::new(),
            pot: 0,
            current_bet_to_call: 0,
            last_raise_amount: 0,
            dealer: None,
            turn: None,
            stage: Stage::Waiting,
            bankroll: 0,
            forfeited: 0,
        }
    }
}

/// Public state accessors.
impl Table {
    pub fn config(&self) -> &TableConfig {
        &self.config
    }
    pub fn stage(&self) -> Stage {
        self.stage
    }
    pub fn pot(&self) -> Chips {
        self.pot
    }
    pub fn community(&self) -> &[Card] {
        &self.community
    }
    pub fn current_bet_to_call(&self) -> Chips {
        self.current_bet_to_call
    }
    pub fn last_raise_amount(&self) -> Chips {
        self.last_raise_amount
    }
    pub fn dealer(&self) -> Option<Position> {
        self.dealer
    }
    pub fn turn(&self) -> Option<Position> {
        self.turn
    }
    pub fn seats(&self) -> &[Option<Seat>] {
        &self.seats
    }
    pub fn seat(&self, position: Position) -> Option<&Seat> {
        self.seats.get(position).and_then(|s| s.as_ref())
    }
    /// The seat index held by an identity, if any.
    pub fn seat_of(&self, identity: &str) -> Option<Position> {
        self.seats
            .iter()
            .position(|s| s.as_ref().map(|s| s.identity() == identity) == Some(true))
    }
    /// Chips `position` must add to match the current level.
    pub fn to_call(&self, position: Position) -> Chips {
        self.seat(position)
            .map(|s| self.current_bet_to_call.saturating_sub(s.current_bet()))
            .unwrap_or(0)
    }
    /// Check when free, fold when facing a bet. The timeout action.
    pub fn passive(&self, position: Position) -> Action {
        if self.to_call(position) == 0 {
            Action::Check
        } else {
            Action::Fold
        }
    }
}

/// Ring traversal. Every scan starts one seat clockwise of `start` and
/// wraps all the way around, so `start` itself is the last candidate.
impl Table {
    fn ring_after(&self, start: Position) -> impl Iterator<Item = Position> + '_ {
        let n = self.seats.len();
        (1..=n).map(move |i| (start + i) % n)
    }
    fn next_in_hand_after(&self, start: Position) -> Option<Position> {
        self.ring_after(start)
            .find(|&p| self.seat(p).map(|s| s.in_hand()) == Some(true))
    }
    fn next_actionable_after(&self, start: Position) -> Option<Position> {
        self.ring_after(start)
            .find(|&p| self.seat(p).map(|s| s.actionable()) == Some(true))
    }
    pub fn occupied_count(&self) -> usize {
        self.seats.iter().flatten().count()
    }
    /// Seats that would be dealt into a new hand.
    fn ready_count(&self) -> usize {
        self.seats.iter().flatten().filter(|s| s.chips() > 0).count()
    }
    fn in_hand_count(&self) -> usize {
        self.seats.iter().flatten().filter(|s| s.in_hand()).count()
    }
    fn unfolded_count(&self) -> usize {
        self.seats.iter().flatten().filter(|s| s.unfolded()).count()
    }
}

/// Seating.
impl Table {
    /// Takes an empty seat for an identity not already at the table. A seat
    /// taken mid-hand waits out the hand in progress.
    pub fn sit(&mut self, position: Position, identity: &str) -> Result<(), EngineError> {
        if position >= self.seats.len() {
            return Err(EngineError::SeatOutOfRange(position));
        }
        if self.seats[position].is_some() {
            return Err(EngineError::SeatOccupied(position));
        }
        if self.seat_of(identity).is_some() {
            return Err(EngineError::AlreadySeated(identity.to_string()));
        }
        self.seats[position] = Some(Seat::new(identity.to_string(), self.config.starting_stack));
        self.bankroll += self.config.starting_stack;
        Ok(())
    }

    /// Removes a seat, folding it out of a live hand first. Chips already
    /// contributed stay in the pot; the remaining stack leaves the table.
    /// Returns the hand resolution the fold may have triggered.
    pub fn vacate(&mut self, position: Position) -> Result<Option<Applied>, EngineError> {
        if self.seat(position).is_none() {
            return Err(EngineError::SeatEmpty(position));
        }
        let mut applied = None;
        let live = self.stage.is_betting()
            && self.seat(position).map(|s| s.unfolded()) == Some(true);
        if live {
            self.seat_mut(position).fold();
            if self.turn == Some(position) {
                applied = Some(self.resolve_after(position));
            } else if self.unfolded_count() == 1 {
                applied = Some(Applied::Complete(self.settle()));
            }
        }
        let seat = self.seats[position].take().expect("occupancy checked above");
        self.forfeited += seat.total_contributed();
        self.bankroll -= seat.chips();
        Ok(applied)
    }

    fn seat_mut(&mut self, position: Position) -> &mut Seat {
        self.seats[position]
            .as_mut()
            .expect("caller verified occupancy")
    }
}

/// Session binding. Seats hold opaque connection ids only; the room layer
/// owns the actual socket map.
impl Table {
    pub fn bind_session(&mut self, position: Position, session: u64) -> Result<(), EngineError> {
        match self.seats.get_mut(position).and_then(|s| s.as_mut()) {
            Some(seat) => Ok(seat.bind(session)),
            None => Err(EngineError::SeatEmpty(position)),
        }
    }
    pub fn unbind_session(
        &mut self,
        position: Position,
        reclaim_deadline_ms: u64,
    ) -> Result<(), EngineError> {
        match self.seats.get_mut(position).and_then(|s| s.as_mut()) {
            Some(seat) => Ok(seat.unbind(reclaim_deadline_ms)),
            None => Err(EngineError::SeatEmpty(position)),
        }
    }
    /// Marks every occupied seat disconnected with a fresh reclaim window.
    /// Used when rehydrating a snapshot: no socket survives a restart.
    pub fn unbind_all(&mut self, reclaim_deadline_ms: u64) {
        for seat in self.seats.iter_mut().flatten() {
            seat.unbind(reclaim_deadline_ms);
        }
    }
}

/// Hand sequencing.
impl Table {
    /// True when a new hand may start.
    pub fn can_begin(&self) -> bool {
        self.stage == Stage::Waiting && self.ready_count() >= self.config.min_players
    }

    /// Starts a hand: fresh unpredictable deck, two hole cards per funded
    /// seat dealt one at a time from seat zero, button advanced, blinds
    /// posted (clamped for short stacks), first decision assigned.
    pub fn begin_hand(&mut self) -> Result<Applied, EngineError> {
        self.begin_hand_with(Deck::shuffled())
    }

    /// Deterministic-deck variant backing `begin_hand`; rigged decks make
    /// showdown outcomes assertable in tests.
    pub(crate) fn begin_hand_with(&mut self, deck: Deck) -> Result<Applied, EngineError> {
        if self.stage != Stage::Waiting {
            return Err(EngineError::HandInProgress);
        }
        if self.ready_count() < self.config.min_players {
            return Err(EngineError::NotEnoughPlayers);
        }
        self.deck = deck;
        self.community.clear();
        self.forfeited = 0;
        let ready = (0..self.seats.len())
            .filter(|&p| self.seat(p).map(|s| s.chips() > 0) == Some(true))
            .collect::<Vec<_>>();
        let firsts = ready
            .iter()
            .map(|_| self.draw())
            .collect::<Vec<_>>();
        for (first, &p) in firsts.into_iter().zip(ready.iter()) {
            let second = self.draw();
            self.seat_mut(p).enter_hand(Hole::from((first, second)));
        }
        let button = self.dealer.unwrap_or(self.seats.len() - 1);
        let dealer = self
            .next_in_hand_after(button)
            .expect("at least two seats were dealt in");
        self.dealer = Some(dealer);
        let sb = match self.in_hand_count() {
            2 => dealer,
            _ => self.next_in_hand_after(dealer).expect("ring is non-empty"),
        };
        let bb = self.next_in_hand_after(sb).expect("ring is non-empty");
        self.post_blind(sb, self.config.small_blind);
        self.post_blind(bb, self.config.big_blind);
        self.current_bet_to_call = self.config.big_blind;
        self.last_raise_amount = self.config.big_blind;
        self.stage = Stage::Preflop;
        log::debug!(
            "[table] hand started: dealer {} sb {} bb {} pot {}",
            dealer,
            sb,
            bb,
            self.pot
        );
        Ok(self.open_round(bb))
    }

    fn draw(&mut self) -> Card {
        self.deck.draw().expect("52 cards cover a full ring and board")
    }

    fn post_blind(&mut self, position: Position, amount: Chips) {
        let invested = self.seat_mut(position).commit(amount);
        self.pot += invested;
    }

    /// Assigns the first decision after `anchor`, or runs the board out if
    /// nobody can act (blinds can put every stack all-in).
    fn open_round(&mut self, anchor: Position) -> Applied {
        if !self.round_complete() {
            self.turn = self.next_actionable_after(anchor);
            return Applied::Street(self.stage);
        }
        self.turn = None;
        self.runout()
    }

    /// A betting round closes when every unfolded, non-all-in seat has
    /// matched the level and acted since the last raise. Vacuously true
    /// when no seat can act, which is what lets an all-in hand run out.
    fn round_complete(&self) -> bool {
        let level = self.current_bet_to_call;
        self.seats
            .iter()
            .flatten()
            .filter(|s| s.actionable())
            .all(|s| s.acted() && s.current_bet() == level)
    }

    /// Deals streets until a decision is pending or the hand is over.
    fn runout(&mut self) -> Applied {
        loop {
            if self.stage == Stage::River || self.unfolded_count() == 1 {
                return Applied::Complete(self.settle());
            }
            self.advance_street();
            if !self.round_complete() {
                let dealer = self.dealer.expect("hand has a dealer");
                self.turn = self.next_actionable_after(dealer);
                return Applied::Street(self.stage);
            }
        }
    }

    fn advance_street(&mut self) {
        self.stage = self.stage.next();
        for _ in 0..self.stage.n_revealed() {
            let card = self.draw();
            self.community.push(card);
        }
        for seat in self.seats.iter_mut().flatten().filter(|s| s.in_hand()) {
            seat.open_round();
        }
        self.current_bet_to_call = 0;
        self.last_raise_amount = self.config.big_blind;
        log::debug!("[table] {}: {:?}", self.stage, self.community);
    }
}

/// Action arbitration.
impl Table {
    /// Validates and applies a betting decision for the seat on turn.
    ///
    /// Raise `amount` is the increment above the current level and must
    /// reach `max(last_raise_amount, big_blind)` unless the seat is moving
    /// all-in for less. Investments clamp to the stack.
    pub fn apply(&mut self, position: Position, action: Action) -> Result<Applied, EngineError> {
        if !self.stage.is_betting() {
            return Err(EngineError::NoActiveHand);
        }
        if self.turn != Some(position) {
            return Err(EngineError::OutOfTurn(position));
        }
        let seat = self.seat(position).ok_or(EngineError::SeatEmpty(position))?;
        let level = self.current_bet_to_call;
        let to_call = level.saturating_sub(seat.current_bet());
        match action {
            Action::Fold => {
                self.seat_mut(position).fold();
            }
            Action::Check => {
                if to_call != 0 {
                    return Err(EngineError::CheckFacingBet);
                }
            }
            Action::Call => {
                let invested = self.seat_mut(position).commit(to_call);
                self.pot += invested;
            }
            Action::Raise { amount } => {
                let minimum = self.last_raise_amount.max(self.config.big_blind);
                let desired = to_call + amount;
                if amount < minimum && seat.chips() > desired {
                    return Err(EngineError::RaiseBelowMinimum { amount, minimum });
                }
                let invested = self.seat_mut(position).commit(desired);
                self.pot += invested;
                let new_bet = self.seat_mut(position).current_bet();
                if new_bet > level {
                    self.last_raise_amount = new_bet - level;
                    self.current_bet_to_call = new_bet;
                    for (p, seat) in self.seats.iter_mut().enumerate() {
                        if p != position {
                            if let Some(seat) = seat.as_mut().filter(|s| s.actionable()) {
                                seat.clear_acted();
                            }
                        }
                    }
                }
            }
        }
        self.seat_mut(position).mark_acted();
        log::debug!("[table] seat {}: {} (pot {})", position, action, self.pot);
        Ok(self.resolve_after(position))
    }

    /// Moves the turn, closes the round, or ends the hand, in that order
    /// of precedence after any fold or committed action.
    fn resolve_after(&mut self, position: Position) -> Applied {
        if self.unfolded_count() == 1 {
            return Applied::Complete(self.settle());
        }
        if !self.round_complete() {
            self.turn = self.next_actionable_after(position);
            return Applied::Continue;
        }
        self.turn = None;
        self.runout()
    }
}

/// Settlement.
impl Table {
    /// Distributes the pot and returns the table to `Waiting`.
    ///
    /// With more than one unfolded seat this is a showdown: hands are
    /// evaluated against the board and revealed in the outcome. With one
    /// unfolded seat the pot is uncontested and nothing is revealed.
    fn settle(&mut self) -> HandOutcome {
        let dealer = self.dealer.expect("hand has a dealer");
        let board = self.community.clone();
        let pot = self.pot;
        let contested = self.unfolded_count() > 1;
        let entrants = self
            .seats
            .iter()
            .enumerate()
            .filter_map(|(p, s)| s.as_ref().map(|s| (p, s)))
            .filter(|(_, s)| s.in_hand())
            .map(|(p, s)| Entrant {
                position: p,
                contributed: s.total_contributed(),
                folded: s.folded(),
                strength: s
                    .hole()
                    .filter(|_| contested && !s.folded())
                    .map(|hole| {
                        Strength::from(Hand::add(
                            Hand::from(hole),
                            Hand::from(board.clone()),
                        ))
                    }),
            })
            .collect::<Vec<_>>();
        let reveals = match contested {
            true => self
                .seats
                .iter()
                .enumerate()
                .filter_map(|(p, s)| s.as_ref().map(|s| (p, s)))
                .filter(|(_, s)| s.unfolded())
                .filter_map(|(p, s)| s.hole().map(|h| (p, h)))
                .collect(),
            false => Vec::new(),
        };
        let ring = self.seats.len();
        let (pots, payouts) =
            Showdown::new(entrants, dealer, self.forfeited, ring).settle();
        for (position, amount) in payouts {
            self.seat_mut(position).award(amount);
        }
        for seat in self.seats.iter_mut().flatten() {
            seat.exit_hand();
        }
        self.pot = 0;
        self.forfeited = 0;
        self.community.clear();
        self.deck = Deck::empty();
        self.turn = None;
        self.current_bet_to_call = 0;
        self.last_raise_amount = 0;
        self.stage = Stage::Waiting;
        log::debug!("[table] hand settled: {} pot(s), total {}", pots.len(), pot);
        HandOutcome {
            dealer,
            board,
            pot,
            pots,
            reveals,
        }
    }
}

/// Invariant audit: the last-line safety net of the engine. A failure here
/// is a bug, and the room halts the table on it rather than play on.
impl Table {
    pub fn audit(&self) -> Result<(), EngineError> {
        let stacks = self.seats.iter().flatten().map(|s| s.chips()).sum::<Chips>();
        if stacks + self.pot != self.bankroll {
            return Err(EngineError::Invariant(format!(
                "chips not conserved: stacks {} + pot {} != bankroll {}",
                stacks, self.pot, self.bankroll
            )));
        }
        let contributed = self
            .seats
            .iter()
            .flatten()
            .map(|s| s.total_contributed())
            .sum::<Chips>();
        if contributed + self.forfeited != self.pot {
            return Err(EngineError::Invariant(format!(
                "pot {} does not match contributions {} + forfeited {}",
                self.pot, contributed, self.forfeited
            )));
        }
        if self.stage.is_betting() {
            // Hand::or, not Hand::add: a duplicated card must surface as an
            // audit error, not a debug panic
            let mut union = Hand::from(self.deck.clone());
            union = Hand::or(union, Hand::from(self.community.clone()));
            for seat in self.seats.iter().flatten().filter(|s| s.in_hand()) {
                union = Hand::or(
                    union,
                    Hand::from(seat.hole().expect("in-hand seats hold cards")),
                );
            }
            let dealt = self.deck.len() + self.community.len() + 2 * self.in_hand_count();
            if union.size() != dealt || dealt != 52 {
                return Err(EngineError::Invariant(format!(
                    "card accounting broken: {} unique of {} dealt",
                    union.size(),
                    dealt
                )));
            }
            for (p, seat) in self.seats.iter().enumerate() {
                if let Some(seat) = seat.as_ref().filter(|s| s.actionable()) {
                    if seat.current_bet() > self.current_bet_to_call {
                        return Err(EngineError::Invariant(format!(
                            "seat {} bet {} above level {}",
                            p,
                            seat.current_bet(),
                            self.current_bet_to_call
                        )));
                    }
                }
            }
            match self.turn {
                Some(p) if self.seat(p).map(|s| s.actionable()) == Some(true) => {}
                other => {
                    return Err(EngineError::Invariant(format!(
                        "turn {:?} does not reference an actionable seat",
                        other
                    )));
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for seat in self.seats.iter() {
            match seat {
                Some(seat) => writeln!(f, "{}", seat)?,
                None => writeln!(f, "-")?,
            }
        }
        writeln!(f, "Pot   {}", self.pot)?;
        writeln!(f, "Stage {}", self.stage)
    }
}
