use crate::message::PotWinners;
use async_trait::async_trait;
use felt_core::Chips;
use felt_core::Position;
use felt_gameplay::HandOutcome;
use felt_gameplay::Table;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;

/// The record emitted to the external store when a hand completes.
///
/// This is the full shape the engine guarantees; anything else about the
/// hand-history store is the embedder's business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandRecord {
    pub table_id: String,
    pub dealer: Position,
    pub board: Vec<String>,
    pub pot: Chips,
    pub winners: Vec<PotWinners>,
}

impl HandRecord {
    pub fn new(table_id: &str, outcome: &HandOutcome) -> Self {
        Self {
            table_id: table_id.to_string(),
            dealer: outcome.dealer,
            board: outcome.board.iter().map(|c| c.to_string()).collect(),
            pot: outcome.pot,
            winners: outcome
                .pots
                .iter()
                .enumerate()
                .map(|(i, pot)| PotWinners {
                    pot_index: i,
                    winners: pot.winners.clone(),
                })
                .collect(),
        }
    }
}

/// Durable key/value checkpoints of the full table, deck and holes
/// included. Single writer per key; a later write supersedes an earlier
/// in-flight one.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn save(&self, key: &str, table: &Table) -> anyhow::Result<()>;
    async fn load(&self, key: &str) -> anyhow::Result<Option<Table>>;
}

/// Sink for completed-hand records.
#[async_trait]
pub trait HandStore: Send + Sync {
    async fn record(&self, hand: &HandRecord) -> anyhow::Result<()>;
}

/// In-memory snapshot store. Survives within a process, which is exactly
/// what restart tests need and local play tolerates.
#[derive(Debug, Default)]
pub struct MemorySnapshots(Mutex<HashMap<String, String>>);

#[async_trait]
impl SnapshotStore for MemorySnapshots {
    async fn save(&self, key: &str, table: &Table) -> anyhow::Result<()> {
        let json = serde_json::to_string(table)?;
        self.0.lock().expect("snapshot lock").insert(key.to_string(), json);
        Ok(())
    }
    async fn load(&self, key: &str) -> anyhow::Result<Option<Table>> {
        let json = self.0.lock().expect("snapshot lock").get(key).cloned();
        Ok(match json {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        })
    }
}

/// In-memory hand-record sink.
#[derive(Debug, Default)]
pub struct MemoryHands(Mutex<Vec<HandRecord>>);

impl MemoryHands {
    pub fn recorded(&self) -> Vec<HandRecord> {
        self.0.lock().expect("hands lock").clone()
    }
}

#[async_trait]
impl HandStore for MemoryHands {
    async fn record(&self, hand: &HandRecord) -> anyhow::Result<()> {
        self.0.lock().expect("hands lock").push(hand.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use felt_core::TableConfig;

    #[tokio::test]
    async fn snapshot_round_trip() {
        let store = MemorySnapshots::default();
        let mut table = Table::new(TableConfig::heads_up());
        table.sit(0, "alice").unwrap();
        store.save("table:t1", &table).await.unwrap();
        let back = store.load("table:t1").await.unwrap().expect("saved");
        assert_eq!(back.seat(0).unwrap().identity(), "alice");
        assert!(store.load("table:t2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn later_write_wins() {
        let store = MemorySnapshots::default();
        let mut table = Table::new(TableConfig::heads_up());
        store.save("table:t1", &table).await.unwrap();
        table.sit(1, "bob").unwrap();
        store.save("table:t1", &table).await.unwrap();
        let back = store.load("table:t1").await.unwrap().expect("saved");
        assert!(back.seat(1).is_some());
    }
}
