use felt_core::Chips;
use serde::Deserialize;
use serde::Serialize;

/// A betting decision by a seat.
///
/// `Raise` carries the raise increment above the current call level, not
/// the total bet: reraising to 10 over a level of 6 is `Raise { amount: 4 }`.
/// All-in sizing falls out of clamping at apply time, so there is no
/// separate shove variant.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Fold,
    Check,
    Call,
    Raise { amount: Chips },
}

impl Action {
    /// True if this is a fold or check (no chips added).
    pub fn is_passive(&self) -> bool {
        matches!(self, Action::Fold | Action::Check)
    }
    /// True if this action can move the bet level.
    pub fn is_aggro(&self) -> bool {
        matches!(self, Action::Raise { .. })
    }
    /// Extracts the raise increment.
    pub fn amount(&self) -> Option<Chips> {
        match self {
            Action::Raise { amount } => Some(*amount),
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Action::Fold => write!(f, "FOLD"),
            Action::Check => write!(f, "CHECK"),
            Action::Call => write!(f, "CALL"),
            Action::Raise { amount } => write!(f, "RAISE {}", amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_wire_form() {
        let json = serde_json::to_string(&Action::Raise { amount: 4 }).unwrap();
        assert_eq!(json, r#"{"type":"raise","amount":4}"#);
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Action::Raise { amount: 4 });
    }

    #[test]
    fn untyped_actions_parse() {
        let fold: Action = serde_json::from_str(r#"{"type":"fold"}"#).unwrap();
        assert_eq!(fold, Action::Fold);
    }
}
