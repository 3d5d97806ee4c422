//! Local development entry point: one table driven from a terminal.
//!
//! Each input line is `<conn> <frame-json>`. The connection number stands
//! in for a socket, so several participants can be played from one
//! terminal; outbound frames print to stdout with the same prefix, and
//! logging stays on stderr so the frame stream remains parseable.
//!
//! ```text
//! 1 {"type":"authenticate_with_ticket","ticket":"alice"}
//! 1 {"type":"sit","seat_index":0}
//! 2 {"type":"authenticate_with_ticket","ticket":"bob"}
//! 2 {"type":"sit","seat_index":1}
//! 1 {"type":"action","seat_index":0,"action":{"type":"call"}}
//! ```
use felt_core::TableConfig;
use felt_core::ID;
use felt_gameroom::ConnId;
use felt_gameroom::MemoryHands;
use felt_gameroom::MemorySnapshots;
use felt_gameroom::OpenDoor;
use felt_gameroom::Protocol;
use felt_gameroom::Room;
use felt_gameroom::RoomHandle;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc::unbounded_channel;

#[tokio::main]
async fn main() {
    felt_core::log();
    let (room, handle) = Room::new(
        ID::default(),
        TableConfig::default(),
        Arc::new(MemorySnapshots::default()),
        Arc::new(MemoryHands::default()),
        Arc::new(OpenDoor),
    );
    log::info!("[feltd] local table ready, frames on stdin");
    let input = handle.clone();
    std::thread::spawn(move || read_frames(input));
    tokio::select! {
        _ = room.run() => {}
        _ = tokio::signal::ctrl_c() => {
            log::warn!("[feltd] interrupt received, shutting down");
        }
    }
}

/// Forwards stdin lines into the room, attaching connections on first use.
fn read_frames(handle: RoomHandle) {
    let mut known = HashSet::new();
    for line in std::io::stdin().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (conn, frame) = match line.split_once(' ') {
            Some((head, rest)) => match head.parse::<ConnId>() {
                Ok(conn) => (conn, rest.trim()),
                Err(_) => (0, line),
            },
            None => (0, line),
        };
        if known.insert(conn) {
            attach(&handle, conn);
        }
        match Protocol::decode(frame) {
            Ok(frame) => handle.frame(conn, frame),
            Err(e) => log::warn!("[feltd] {}", e),
        }
    }
    for conn in known {
        handle.closed(conn);
    }
}

/// Registers a connection and prints its outbound frames.
fn attach(handle: &RoomHandle, conn: ConnId) {
    let (tx, mut rx) = unbounded_channel();
    handle.open(conn, tx);
    std::thread::spawn(move || {
        while let Some(message) = rx.blocking_recv() {
            println!("{} {}", conn, message.to_json());
        }
    });
}
