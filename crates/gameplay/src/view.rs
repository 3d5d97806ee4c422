use crate::stage::Stage;
use crate::table::Table;
use felt_core::Chips;
use felt_core::Position;
use serde::Serialize;

/// What everyone may know about a seat: no hole cards, no connection
/// details beyond presence.
#[derive(Debug, Clone, Serialize)]
pub struct SeatView {
    pub identity: String,
    pub chips: Chips,
    pub current_bet: Chips,
    pub total_contributed: Chips,
    pub folded: bool,
    pub all_in: bool,
    pub connected: bool,
}

/// The public projection of the table, broadcast to every participant
/// after each mutation.
#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub seats: Vec<Option<SeatView>>,
    pub community: Vec<String>,
    pub pot: Chips,
    pub stage: Stage,
    pub current_bet_to_call: Chips,
    pub current_turn_index: Option<Position>,
    pub dealer_index: Option<Position>,
    pub last_raise_amount: Chips,
}

/// One seat's private projection: its own cards and where it sits.
#[derive(Debug, Clone, Serialize)]
pub struct PrivateView {
    pub my_index: Position,
    pub my_hole: Vec<String>,
}

impl Table {
    pub fn public_view(&self) -> TableView {
        TableView {
            seats: self
                .seats()
                .iter()
                .map(|seat| {
                    seat.as_ref().map(|s| SeatView {
                        identity: s.identity().to_string(),
                        chips: s.chips(),
                        current_bet: s.current_bet(),
                        total_contributed: s.total_contributed(),
                        folded: s.folded(),
                        all_in: s.all_in(),
                        connected: s.connected(),
                    })
                })
                .collect(),
            community: self.community().iter().map(|c| c.to_string()).collect(),
            pot: self.pot(),
            stage: self.stage(),
            current_bet_to_call: self.current_bet_to_call(),
            current_turn_index: self.turn(),
            dealer_index: self.dealer(),
            last_raise_amount: self.last_raise_amount(),
        }
    }

    pub fn private_view(&self, position: Position) -> Option<PrivateView> {
        self.seat(position).map(|seat| PrivateView {
            my_index: position,
            my_hole: seat
                .hole()
                .map(|h| h.cards().iter().map(|c| c.to_string()).collect())
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use felt_core::TableConfig;

    #[test]
    fn public_view_hides_holes() {
        let mut table = Table::new(TableConfig::heads_up());
        table.sit(0, "alice").unwrap();
        table.sit(1, "bob").unwrap();
        table.begin_hand().unwrap();
        let json = serde_json::to_string(&table.public_view()).unwrap();
        assert!(!json.contains("hole"));
        assert!(json.contains("\"pot\":3"));
    }

    #[test]
    fn private_view_shows_own_cards() {
        let mut table = Table::new(TableConfig::heads_up());
        table.sit(0, "alice").unwrap();
        table.sit(1, "bob").unwrap();
        table.begin_hand().unwrap();
        let view = table.private_view(0).unwrap();
        assert_eq!(view.my_index, 0);
        assert_eq!(view.my_hole.len(), 2);
    }

    #[test]
    fn private_view_empty_between_hands() {
        let mut table = Table::new(TableConfig::heads_up());
        table.sit(0, "alice").unwrap();
        let view = table.private_view(0).unwrap();
        assert!(view.my_hole.is_empty());
    }
}
