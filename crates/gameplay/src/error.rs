use felt_core::Chips;
use felt_core::Position;

/// Errors raised while mutating table state.
///
/// The room layer maps these onto the wire: seat and turn problems become
/// protocol errors, betting-rule problems are dropped actions, and
/// `Invariant` halts the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    SeatOutOfRange(Position),
    SeatOccupied(Position),
    SeatEmpty(Position),
    AlreadySeated(String),
    NotEnoughPlayers,
    HandInProgress,
    NoActiveHand,
    OutOfTurn(Position),
    CheckFacingBet,
    RaiseBelowMinimum { amount: Chips, minimum: Chips },
    Invariant(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SeatOutOfRange(i) => write!(f, "seat {} out of range", i),
            Self::SeatOccupied(i) => write!(f, "seat {} is occupied", i),
            Self::SeatEmpty(i) => write!(f, "seat {} is empty", i),
            Self::AlreadySeated(id) => write!(f, "{} already holds a seat", id),
            Self::NotEnoughPlayers => write!(f, "not enough players to start"),
            Self::HandInProgress => write!(f, "a hand is in progress"),
            Self::NoActiveHand => write!(f, "no hand in progress"),
            Self::OutOfTurn(i) => write!(f, "seat {} acted out of turn", i),
            Self::CheckFacingBet => write!(f, "cannot check facing a bet"),
            Self::RaiseBelowMinimum { amount, minimum } => {
                write!(f, "raise of {} below minimum {}", amount, minimum)
            }
            Self::Invariant(s) => write!(f, "invariant violated: {}", s),
        }
    }
}

impl std::error::Error for EngineError {}

impl EngineError {
    /// True for betting-rule rejections that drop the action and leave the
    /// seat's timer running.
    pub fn is_illegal_action(&self) -> bool {
        matches!(
            self,
            Self::CheckFacingBet | Self::RaiseBelowMinimum { .. } | Self::OutOfTurn(_)
        )
    }
    /// True for violations that must halt the table.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }
}
