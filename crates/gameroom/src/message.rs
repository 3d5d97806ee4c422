use felt_core::Chips;
use felt_core::Position;
use felt_gameplay::HandOutcome;
use felt_gameplay::PrivateView;
use felt_gameplay::TableView;
use serde::Deserialize;
use serde::Serialize;

/// Messages sent from server to client.
///
/// After every accepted mutation the room broadcasts a `TableState` to all
/// connections and a `PrivateState` to each seated one; the completion
/// frame of a hand additionally carries a [`ShowdownSummary`] in `extras`.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Ticket accepted; the socket now speaks for `identity`.
    AuthOk { table_id: String, identity: String },
    AuthError { error: String },
    /// Seat taken.
    Sat { seat_index: Position },
    /// Protocol-level rejection. Game state did not change.
    ErrorMsg { error: String },
    /// The public projection of the table.
    TableState {
        id: String,
        #[serde(flatten)]
        view: TableView,
        action_timeout_ms: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        extras: Option<ShowdownSummary>,
    },
    /// One seat's hole cards and remaining decision time.
    PrivateState {
        my_index: Position,
        my_hole: Vec<String>,
        time_ms: u64,
    },
    /// The table folded for a seat that ran out its clock.
    AutoFold { seat_index: Position },
}

/// Winners of one pot, by seat index.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PotWinners {
    pub pot_index: usize,
    pub winners: Vec<Position>,
}

/// Size and eligibility of one pot.
#[derive(Clone, Debug, Serialize)]
pub struct PotStakes {
    pub pot_index: usize,
    pub amount: Chips,
    pub eligible: Vec<Position>,
}

/// Hole cards shown by a seat that reached showdown.
#[derive(Clone, Debug, Serialize)]
pub struct RevealedHole {
    pub seat_index: Position,
    pub hole: Vec<String>,
}

/// The showdown extras attached to a hand's completion frame.
#[derive(Clone, Debug, Serialize)]
pub struct ShowdownSummary {
    pub winners: Vec<PotWinners>,
    pub pots: Vec<PotStakes>,
    pub reveals: Vec<RevealedHole>,
}

impl From<&HandOutcome> for ShowdownSummary {
    fn from(outcome: &HandOutcome) -> Self {
        Self {
            winners: outcome
                .pots
                .iter()
                .enumerate()
                .map(|(i, pot)| PotWinners {
                    pot_index: i,
                    winners: pot.winners.clone(),
                })
                .collect(),
            pots: outcome
                .pots
                .iter()
                .enumerate()
                .map(|(i, pot)| PotStakes {
                    pot_index: i,
                    amount: pot.amount,
                    eligible: pot.eligible.clone(),
                })
                .collect(),
            reveals: outcome
                .reveals
                .iter()
                .map(|(seat_index, hole)| RevealedHole {
                    seat_index: *seat_index,
                    hole: hole.cards().iter().map(|c| c.to_string()).collect(),
                })
                .collect(),
        }
    }
}

impl ServerMessage {
    pub fn auth_ok(table_id: &str, identity: &str) -> Self {
        Self::AuthOk {
            table_id: table_id.to_string(),
            identity: identity.to_string(),
        }
    }
    pub fn auth_error(error: impl std::fmt::Display) -> Self {
        Self::AuthError {
            error: error.to_string(),
        }
    }
    pub fn sat(seat_index: Position) -> Self {
        Self::Sat { seat_index }
    }
    pub fn error(error: impl std::fmt::Display) -> Self {
        Self::ErrorMsg {
            error: error.to_string(),
        }
    }
    pub fn table_state(
        id: &str,
        view: TableView,
        action_timeout_ms: u64,
        extras: Option<ShowdownSummary>,
    ) -> Self {
        Self::TableState {
            id: id.to_string(),
            view,
            action_timeout_ms,
            extras,
        }
    }
    pub fn private_state(view: PrivateView, time_ms: u64) -> Self {
        Self::PrivateState {
            my_index: view.my_index,
            my_hole: view.my_hole,
            time_ms,
        }
    }
    pub fn auto_fold(seat_index: Position) -> Self {
        Self::AutoFold { seat_index }
    }
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize server message")
    }
}
