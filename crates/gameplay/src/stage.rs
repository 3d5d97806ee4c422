use serde::Deserialize;
use serde::Serialize;

/// Where the table is in the life of a hand.
///
/// `Waiting` and `Showdown` bracket the four betting streets; the table
/// rests in `Waiting` between hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Waiting,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Stage {
    /// True during the four betting streets.
    pub fn is_betting(&self) -> bool {
        matches!(self, Stage::Preflop | Stage::Flop | Stage::Turn | Stage::River)
    }
    /// The street following this one.
    pub fn next(&self) -> Stage {
        match self {
            Stage::Waiting => Stage::Preflop,
            Stage::Preflop => Stage::Flop,
            Stage::Flop => Stage::Turn,
            Stage::Turn => Stage::River,
            Stage::River => Stage::Showdown,
            Stage::Showdown => panic!("no stage after showdown"),
        }
    }
    /// Board cards dealt when this street opens.
    pub fn n_revealed(&self) -> usize {
        match self {
            Stage::Flop => 3,
            Stage::Turn | Stage::River => 1,
            _ => 0,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Stage::Waiting => write!(f, "Waiting"),
            Stage::Preflop => write!(f, "Preflop"),
            Stage::Flop => write!(f, "Flop"),
            Stage::Turn => write!(f, "Turn"),
            Stage::River => write!(f, "River"),
            Stage::Showdown => write!(f, "Showdown"),
        }
    }
}
