use crate::stores::HandRecord;
use crate::stores::HandStore;
use crate::stores::SnapshotStore;
use async_trait::async_trait;
use felt_gameplay::Table;
use std::sync::Arc;
use tokio_postgres::Client;
use tokio_postgres::NoTls;

const SNAPSHOTS: &str = "table_snapshots";
const HANDS: &str = "hands";

const CREATES: &str = const_format::concatcp!(
    "CREATE TABLE IF NOT EXISTS ",
    SNAPSHOTS,
    " (
        key         TEXT PRIMARY KEY,
        state       JSONB NOT NULL,
        written_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    );
    CREATE TABLE IF NOT EXISTS ",
    HANDS,
    " (
        id          UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        table_id    TEXT NOT NULL,
        record      JSONB NOT NULL,
        played_at   TIMESTAMPTZ NOT NULL DEFAULT now()
    );
    CREATE INDEX IF NOT EXISTS idx_hands_table ON ",
    HANDS,
    " (table_id);"
);

const UPSERT_SNAPSHOT: &str = const_format::concatcp!(
    "INSERT INTO ",
    SNAPSHOTS,
    " (key, state, written_at) VALUES ($1, $2, now())
     ON CONFLICT (key) DO UPDATE SET state = $2, written_at = now();"
);

const SELECT_SNAPSHOT: &str =
    const_format::concatcp!("SELECT state FROM ", SNAPSHOTS, " WHERE key = $1;");

const INSERT_HAND: &str =
    const_format::concatcp!("INSERT INTO ", HANDS, " (table_id, record) VALUES ($1, $2);");

/// PostgreSQL-backed snapshot and hand-record store.
///
/// Both records are stored as JSONB: the snapshot is opaque to every other
/// consumer, and the hand record's shape is the engine's public contract,
/// so neither warrants a relational schema here.
pub struct PgStore {
    client: Arc<Client>,
}

impl PgStore {
    /// Connects, spawns the connection driver, and bootstraps the tables.
    pub async fn connect(params: &str) -> anyhow::Result<Self> {
        let (client, connection) = tokio_postgres::connect(params, NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("[pg] connection error: {}", e);
            }
        });
        client.batch_execute(CREATES).await?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    pub fn from_client(client: Arc<Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SnapshotStore for PgStore {
    async fn save(&self, key: &str, table: &Table) -> anyhow::Result<()> {
        let state = serde_json::to_value(table)?;
        self.client.execute(UPSERT_SNAPSHOT, &[&key, &state]).await?;
        Ok(())
    }
    async fn load(&self, key: &str) -> anyhow::Result<Option<Table>> {
        let row = self.client.query_opt(SELECT_SNAPSHOT, &[&key]).await?;
        Ok(match row {
            Some(row) => {
                let state: serde_json::Value = row.get(0);
                Some(serde_json::from_value(state)?)
            }
            None => None,
        })
    }
}

#[async_trait]
impl HandStore for PgStore {
    async fn record(&self, hand: &HandRecord) -> anyhow::Result<()> {
        let record = serde_json::to_value(hand)?;
        self.client
            .execute(INSERT_HAND, &[&hand.table_id, &record])
            .await?;
        Ok(())
    }
}
