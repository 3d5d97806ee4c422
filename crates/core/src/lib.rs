//! Core type aliases, identity types, and configuration for feltd.
//!
//! This crate provides the foundational types shared by every other crate
//! in the workspace: chip and seat-index aliases, the typed `ID<T>` wrapper,
//! the embedder-provided table configuration, and the logging bootstrap.

use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Stack sizes, bet amounts, and pot totals.
pub type Chips = u64;
/// Seat index around the table ring.
pub type Position = usize;

// ============================================================================
// TRAITS
// ============================================================================
/// Unique identifier trait for domain entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
    /// Cast ID<T> to ID<U> while preserving the underlying UUID.
    pub fn cast<U>(self) -> ID<U> {
        ID {
            inner: self.inner,
            marker: PhantomData,
        }
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

// ============================================================================
// TABLE PARAMETERS
// ============================================================================
/// Default number of seats in the ring.
pub const SEATS: usize = 6;
/// Default starting stack for a new seat.
pub const STACK: Chips = 1000;
/// Default big blind amount.
pub const B_BLIND: Chips = 2;
/// Default small blind amount.
pub const S_BLIND: Chips = 1;
/// Minimum players required to start a hand.
pub const MIN_PLAYERS: usize = 2;
/// Seconds a seat has to act before the table acts for it.
pub const ACTION_TIMEOUT: u64 = 10;
/// Seconds a disconnected seat is reserved for reconnection.
pub const RECONNECT_WINDOW: u64 = 60;
/// Seconds between the end of one hand and the start of the next.
pub const INTERMISSION: u64 = 2;

/// Table configuration provided by the embedder.
///
/// All game-shaping knobs live here so the engine itself carries no
/// hard-coded stakes. `Default` reflects a 6-max 1/2 cash table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub seats: usize,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub starting_stack: Chips,
    pub min_players: usize,
    pub action_timeout: Duration,
    pub reconnect_window: Duration,
    pub intermission: Duration,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            seats: SEATS,
            small_blind: S_BLIND,
            big_blind: B_BLIND,
            starting_stack: STACK,
            min_players: MIN_PLAYERS,
            action_timeout: Duration::from_secs(ACTION_TIMEOUT),
            reconnect_window: Duration::from_secs(RECONNECT_WINDOW),
            intermission: Duration::from_secs(INTERMISSION),
        }
    }
}

impl TableConfig {
    /// Heads-up variant of the default configuration, handy in tests.
    pub fn heads_up() -> Self {
        Self {
            seats: 2,
            ..Self::default()
        }
    }
}

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging with a timestamped log file per process.
/// DEBUG goes to a file under `logs/`; INFO goes to stderr, leaving
/// stdout free for wire frames.
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves forward")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", stamp)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Milliseconds since the Unix epoch. Wall-clock form used for the
/// persisted reclaim deadlines, which must survive process restarts.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves forward")
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = TableConfig::default();
        assert_eq!(config.seats, SEATS);
        assert_eq!(config.big_blind, B_BLIND);
        assert_eq!(config.small_blind, S_BLIND);
        assert!(config.min_players >= 2);
    }

    #[test]
    fn ids_are_unique() {
        struct Marker;
        let a = ID::<Marker>::default();
        let b = ID::<Marker>::default();
        assert_ne!(a, b);
    }

    #[test]
    fn id_cast_preserves_uuid() {
        struct A;
        struct B;
        let a = ID::<A>::default();
        let b: ID<B> = a.cast();
        assert_eq!(a.inner(), b.inner());
    }
}
