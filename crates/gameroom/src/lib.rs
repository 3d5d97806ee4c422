//! Async session layer for a live poker table.
//!
//! This crate wraps the [`felt_gameplay`] engine in a single-writer command
//! loop and gives it its external edges: participant sessions, decision
//! timers, reconnect windows, durable snapshots, and hand records.
//!
//! ## Architecture
//!
//! - [`Room`] — the serializer: owns the table, consumes a command channel,
//!   and is the only code that mutates game state
//! - [`RoomHandle`] — cloneable sender a transport uses to feed the room
//! - [`Sessions`] — socket map: opaque connection ids to outbound channels
//! - [`Timer`] — decision deadline with a generation counter so stale
//!   expiries are ignored
//!
//! ## Protocol
//!
//! - [`ClientMessage`] / [`ServerMessage`] — the JSON wire frames
//! - [`Protocol`] — decoding and framing errors
//!
//! ## External collaborators
//!
//! - [`Directory`] — ticket authentication and ban checks
//! - [`SnapshotStore`] / [`HandStore`] — durable table checkpoints and
//!   completed-hand records (in-memory impls always; PostgreSQL behind the
//!   `database` feature)
mod directory;
mod message;
mod protocol;
mod room;
mod sessions;
mod stores;
mod timer;

#[cfg(feature = "database")]
mod postgres;

pub use directory::*;
pub use message::*;
pub use protocol::*;
pub use room::*;
pub use sessions::*;
pub use stores::*;
pub use timer::*;

#[cfg(feature = "database")]
pub use postgres::*;
