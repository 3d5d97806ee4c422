use crate::directory::Directory;
use crate::message::ServerMessage;
use crate::message::ShowdownSummary;
use crate::protocol::ClientMessage;
use crate::sessions::ConnId;
use crate::sessions::Sessions;
use crate::stores::HandRecord;
use crate::stores::HandStore;
use crate::stores::SnapshotStore;
use crate::timer::Timer;
use felt_core::now_ms;
use felt_core::Position;
use felt_core::TableConfig;
use felt_core::Unique;
use felt_core::ID;
use felt_gameplay::Action;
use felt_gameplay::Applied;
use felt_gameplay::Table;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;

/// Everything that can make the table move.
///
/// Socket traffic, timer expiries, reclaim lapses, and hand kickoffs all
/// arrive on the same channel, so no mutation ever observes another one
/// half-applied. Timer-shaped commands carry the generation they were
/// armed with; a stale generation is a no-op.
#[derive(Debug)]
pub enum Command {
    /// A transport accepted a connection and registered its outbox.
    Open {
        conn: ConnId,
        sender: UnboundedSender<ServerMessage>,
    },
    /// A decoded frame from a connection.
    Frame { conn: ConnId, frame: ClientMessage },
    /// The transport lost the connection.
    Closed { conn: ConnId },
    /// The seat on turn ran out its clock.
    TimerFired { generation: u64 },
    /// The intermission after a hand ended.
    Kickoff { generation: u64 },
    /// A disconnected seat's reclaim window ran out.
    ReclaimLapsed { position: Position, generation: u64 },
}

/// Cloneable entry point into a room's command loop.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    tx: UnboundedSender<Command>,
}

impl RoomHandle {
    pub fn send(&self, command: Command) {
        let _ = self.tx.send(command);
    }
    pub fn open(&self, conn: ConnId, sender: UnboundedSender<ServerMessage>) {
        self.send(Command::Open { conn, sender });
    }
    pub fn frame(&self, conn: ConnId, frame: ClientMessage) {
        self.send(Command::Frame { conn, frame });
    }
    pub fn closed(&self, conn: ConnId) {
        self.send(Command::Closed { conn });
    }
}

/// Live table coordinator.
///
/// Imperative shell that owns the [`Table`] (functional core) and handles
/// sessions, timers, persistence, and broadcast concerns. All state flows
/// through [`Room::run`], which consumes commands one at a time; after
/// every accepted mutation the table is audited, checkpointed to the
/// snapshot store, and projected out to every connection. An audit failure
/// halts the room and leaves the last good snapshot in place for
/// forensics.
pub struct Room {
    id: ID<Self>,
    table: Table,
    sessions: Sessions,
    commands: UnboundedReceiver<Command>,
    handle: RoomHandle,
    timer: Timer,
    kickoff: u64,
    reclaims: HashMap<Position, u64>,
    snapshots: Arc<dyn SnapshotStore>,
    hands: Arc<dyn HandStore>,
    directory: Arc<dyn Directory>,
    halted: bool,
}

impl Unique for Room {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

impl Room {
    pub fn new(
        id: ID<Self>,
        config: TableConfig,
        snapshots: Arc<dyn SnapshotStore>,
        hands: Arc<dyn HandStore>,
        directory: Arc<dyn Directory>,
    ) -> (Self, RoomHandle) {
        let (tx, rx) = unbounded_channel();
        let handle = RoomHandle { tx };
        let timer = Timer::new(config.action_timeout);
        let room = Self {
            id,
            table: Table::new(config),
            sessions: Sessions::new(),
            commands: rx,
            handle: handle.clone(),
            timer,
            kickoff: 0,
            reclaims: HashMap::new(),
            snapshots,
            hands,
            directory,
            halted: false,
        };
        (room, handle)
    }

    /// Rehydrates a room from its snapshot, if one exists. Every seat comes
    /// back disconnected with a fresh reclaim window; an interrupted hand
    /// resumes at the exact decision it was waiting on.
    pub async fn restore(
        id: ID<Self>,
        config: TableConfig,
        snapshots: Arc<dyn SnapshotStore>,
        hands: Arc<dyn HandStore>,
        directory: Arc<dyn Directory>,
    ) -> (Self, RoomHandle) {
        let key = format!("table:{}", id);
        let saved = match snapshots.load(&key).await {
            Ok(saved) => saved,
            Err(e) => {
                log::warn!("[room {}] snapshot load failed: {}", id, e);
                None
            }
        };
        let (mut room, handle) = Self::new(id, config, snapshots, hands, directory);
        if let Some(mut table) = saved {
            log::info!("[room {}] rehydrated snapshot at stage {}", id, table.stage());
            let window = table.config().reconnect_window;
            table.unbind_all(now_ms() + window.as_millis() as u64);
            room.table = table;
        }
        (room, handle)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    fn key(&self) -> String {
        format!("table:{}", self.id)
    }

    pub async fn run(mut self) {
        log::info!("[room {}] online", self.id);
        self.boot();
        while let Some(command) = self.commands.recv().await {
            if self.halted {
                break;
            }
            self.handle_command(command).await;
        }
        log::info!("[room {}] offline", self.id);
    }

    /// Re-arms the clocks a rehydrated table needs: the pending decision
    /// timer and a reclaim lapse per disconnected seat.
    fn boot(&mut self) {
        if self.table.turn().is_some() {
            self.arm_timer();
        }
        let window = self.table.config().reconnect_window;
        let waiting = (0..self.table.seats().len())
            .filter(|&p| self.table.seat(p).map(|s| !s.connected()) == Some(true))
            .collect::<Vec<_>>();
        for position in waiting {
            self.schedule_reclaim(position, window);
        }
    }
}

/// Command dispatch.
impl Room {
    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Open { conn, sender } => {
                self.sessions.open(conn, sender);
            }
            Command::Frame { conn, frame } => {
                self.handle_frame(conn, frame).await;
            }
            Command::Closed { conn } => {
                self.handle_closed(conn).await;
            }
            Command::TimerFired { generation } => {
                self.handle_timeout(generation).await;
            }
            Command::Kickoff { generation } => {
                if generation == self.kickoff && self.table.can_begin() {
                    self.begin().await;
                }
            }
            Command::ReclaimLapsed {
                position,
                generation,
            } => {
                self.handle_reclaim_lapsed(position, generation).await;
            }
        }
    }

    async fn handle_frame(&mut self, conn: ConnId, frame: ClientMessage) {
        match frame {
            ClientMessage::AuthenticateWithTicket { ticket } => {
                self.handle_auth(conn, &ticket).await;
            }
            ClientMessage::Sit { seat_index } => {
                self.handle_sit(conn, seat_index).await;
            }
            ClientMessage::Action { seat_index, action } => {
                self.handle_action(conn, seat_index, action).await;
            }
            ClientMessage::Leave => {
                self.handle_leave(conn).await;
            }
        }
    }

    async fn handle_auth(&mut self, conn: ConnId, ticket: &str) {
        let Some(identity) = self.directory.authenticate(ticket).await else {
            self.sessions
                .unicast(conn, ServerMessage::auth_error("ticket rejected"));
            return;
        };
        self.sessions.bind(conn, identity.clone());
        self.sessions
            .unicast(conn, ServerMessage::auth_ok(&self.id.to_string(), &identity));
        match self.table.seat_of(&identity) {
            Some(position) => {
                // same identity, new socket: rebind the seat and invalidate
                // any pending reclaim lapse
                let _ = self.table.bind_session(position, conn);
                self.reclaims.entry(position).and_modify(|g| *g += 1);
                log::info!("[room {}] {} rebound to seat {}", self.id, identity, position);
                self.send_private(position);
                if self.checkpoint().await {
                    self.broadcast_state(None);
                }
            }
            None => {
                self.send_state(conn);
            }
        }
    }

    async fn handle_sit(&mut self, conn: ConnId, seat_index: Position) {
        let Some(identity) = self.sessions.identity(conn).map(str::to_string) else {
            self.sessions
                .unicast(conn, ServerMessage::error("authenticate first"));
            return;
        };
        if self.directory.is_banned(&identity).await {
            self.sessions
                .unicast(conn, ServerMessage::error("seating refused"));
            return;
        }
        match self.table.sit(seat_index, &identity) {
            Ok(()) => {
                let _ = self.table.bind_session(seat_index, conn);
                self.sessions.unicast(conn, ServerMessage::sat(seat_index));
                if self.checkpoint().await {
                    self.broadcast_state(None);
                }
                if self.table.can_begin() {
                    self.begin().await;
                }
            }
            Err(e) => {
                self.sessions.unicast(conn, ServerMessage::error(e));
            }
        }
    }

    async fn handle_action(&mut self, conn: ConnId, seat_index: Position, action: Action) {
        let Some(identity) = self.sessions.identity(conn).map(str::to_string) else {
            self.sessions
                .unicast(conn, ServerMessage::error("authenticate first"));
            return;
        };
        let Some(seat) = self.table.seat(seat_index) else {
            self.sessions.unicast(conn, ServerMessage::error("no such seat"));
            return;
        };
        if seat.identity() != identity {
            // misdirected or spoofed frame. drop without punishing a misclick
            log::info!(
                "[room {}] {} sent an action for seat {} they do not hold",
                self.id,
                identity,
                seat_index
            );
            return;
        }
        match self.table.apply(seat_index, action) {
            Ok(applied) => {
                self.timer.cancel();
                self.after(applied).await;
            }
            Err(e) if e.is_illegal_action() => {
                // dropped on the floor; the seat's clock keeps its budget
                log::info!(
                    "[room {}] dropped illegal action from seat {}: {}",
                    self.id,
                    seat_index,
                    e
                );
            }
            Err(e) => {
                self.sessions.unicast(conn, ServerMessage::error(e));
            }
        }
    }

    async fn handle_leave(&mut self, conn: ConnId) {
        let Some(identity) = self.sessions.identity(conn).map(str::to_string) else {
            self.sessions
                .unicast(conn, ServerMessage::error("authenticate first"));
            return;
        };
        match self.table.seat_of(&identity) {
            Some(position) => self.vacate(position).await,
            None => {
                self.sessions.unicast(conn, ServerMessage::error("not seated"));
            }
        }
    }

    async fn handle_closed(&mut self, conn: ConnId) {
        let held = (0..self.table.seats().len())
            .find(|&p| self.table.seat(p).and_then(|s| s.session()) == Some(conn));
        if let Some(position) = held {
            let window = self.table.config().reconnect_window;
            let deadline = now_ms() + window.as_millis() as u64;
            let _ = self.table.unbind_session(position, deadline);
            self.schedule_reclaim(position, window);
            log::info!(
                "[room {}] seat {} disconnected, reserved for {:?}",
                self.id,
                position,
                window
            );
            // the seat stays in the hand and its action timer keeps running
            if self.checkpoint().await {
                self.broadcast_state(None);
            }
        }
        self.sessions.close(conn);
    }

    async fn handle_timeout(&mut self, generation: u64) {
        if !self.timer.is_current(generation) {
            return;
        }
        let Some(position) = self.table.turn() else {
            return;
        };
        let action = self.table.passive(position);
        log::info!(
            "[room {}] seat {} ran out of time: {}",
            self.id,
            position,
            action
        );
        self.timer.cancel();
        if action == Action::Fold {
            self.sessions.broadcast(ServerMessage::auto_fold(position));
        }
        match self.table.apply(position, action) {
            Ok(applied) => self.after(applied).await,
            Err(e) => log::error!("[room {}] auto action failed: {}", self.id, e),
        }
    }

    async fn handle_reclaim_lapsed(&mut self, position: Position, generation: u64) {
        if self.reclaims.get(&position) != Some(&generation) {
            return;
        }
        if self.table.seat(position).map(|s| s.connected()) != Some(false) {
            return;
        }
        log::info!(
            "[room {}] reclaim window lapsed, vacating seat {}",
            self.id,
            position
        );
        self.vacate(position).await;
    }
}

/// Mutation aftermath: audits, persistence, projection, scheduling.
impl Room {
    /// Folds a seat out of any live hand, removes it, and follows whatever
    /// resolution the fold triggered.
    async fn vacate(&mut self, position: Position) {
        if self.table.turn() == Some(position) {
            self.timer.cancel();
        }
        self.reclaims.remove(&position);
        match self.table.vacate(position) {
            Ok(Some(applied)) => self.after(applied).await,
            Ok(None) => {
                if self.checkpoint().await {
                    self.broadcast_state(None);
                }
            }
            Err(e) => log::warn!("[room {}] vacate seat {} failed: {}", self.id, position, e),
        }
    }

    async fn begin(&mut self) {
        match self.table.begin_hand() {
            Ok(applied) => self.after(applied).await,
            Err(e) => log::debug!("[room {}] hand not started: {}", self.id, e),
        }
    }

    async fn after(&mut self, applied: Applied) {
        match applied {
            Applied::Continue | Applied::Street(_) => {
                self.arm_timer();
                if self.checkpoint().await {
                    self.broadcast_state(None);
                }
            }
            Applied::Complete(outcome) => {
                self.timer.cancel();
                if self.checkpoint().await {
                    self.broadcast_state(Some(ShowdownSummary::from(&outcome)));
                }
                let record = HandRecord::new(&self.id.to_string(), &outcome);
                if let Err(e) = self.hands.record(&record).await {
                    log::warn!("[room {}] hand record write failed: {}", self.id, e);
                }
                self.schedule_kickoff();
            }
        }
    }

    /// Audits invariants and checkpoints the table. Returns false (and
    /// halts the room, preserving the previous snapshot) on an audit
    /// failure; store errors are logged and the hand plays on.
    async fn checkpoint(&mut self) -> bool {
        if let Err(e) = self.table.audit() {
            log::error!("[room {}] halting table: {}", self.id, e);
            self.halted = true;
            return false;
        }
        if let Err(e) = self.snapshots.save(&self.key(), &self.table).await {
            log::warn!("[room {}] snapshot write failed: {}", self.id, e);
        }
        true
    }

    fn broadcast_state(&self, extras: Option<ShowdownSummary>) {
        let timeout_ms = self.timer.timeout().as_millis() as u64;
        self.sessions.broadcast(ServerMessage::table_state(
            &self.id.to_string(),
            self.table.public_view(),
            timeout_ms,
            extras,
        ));
        for position in 0..self.table.seats().len() {
            self.send_private(position);
        }
    }

    fn send_state(&self, conn: ConnId) {
        let timeout_ms = self.timer.timeout().as_millis() as u64;
        self.sessions.unicast(
            conn,
            ServerMessage::table_state(
                &self.id.to_string(),
                self.table.public_view(),
                timeout_ms,
                None,
            ),
        );
    }

    fn send_private(&self, position: Position) {
        let Some(conn) = self.table.seat(position).and_then(|s| s.session()) else {
            return;
        };
        let Some(view) = self.table.private_view(position) else {
            return;
        };
        let time_ms = match self.table.turn() == Some(position) {
            true => self
                .timer
                .remaining()
                .unwrap_or(self.timer.timeout())
                .as_millis() as u64,
            false => self.timer.timeout().as_millis() as u64,
        };
        self.sessions
            .unicast(conn, ServerMessage::private_state(view, time_ms));
    }

    fn arm_timer(&mut self) {
        if self.table.turn().is_none() {
            self.timer.cancel();
            return;
        }
        let generation = self.timer.arm();
        let timeout = self.timer.timeout();
        let handle = self.handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            handle.send(Command::TimerFired { generation });
        });
    }

    fn schedule_kickoff(&mut self) {
        self.kickoff += 1;
        let generation = self.kickoff;
        let delay = self.table.config().intermission;
        let handle = self.handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            handle.send(Command::Kickoff { generation });
        });
    }

    fn schedule_reclaim(&mut self, position: Position, window: Duration) {
        let generation = {
            let g = self.reclaims.entry(position).or_insert(0);
            *g += 1;
            *g
        };
        let handle = self.handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            handle.send(Command::ReclaimLapsed {
                position,
                generation,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::OpenDoor;
    use crate::stores::MemoryHands;
    use crate::stores::MemorySnapshots;
    use felt_gameplay::Stage;
    use tokio::sync::mpsc::unbounded_channel;

    struct Rig {
        id: ID<Room>,
        handle: RoomHandle,
        snapshots: Arc<MemorySnapshots>,
        hands: Arc<MemoryHands>,
        task: tokio::task::JoinHandle<()>,
    }

    fn config() -> TableConfig {
        TableConfig {
            seats: 3,
            ..TableConfig::default()
        }
    }

    fn launch(config: TableConfig) -> Rig {
        let id = ID::default();
        let snapshots = Arc::new(MemorySnapshots::default());
        let hands = Arc::new(MemoryHands::default());
        let (room, handle) = Room::new(
            id,
            config,
            snapshots.clone(),
            hands.clone(),
            Arc::new(OpenDoor),
        );
        let task = tokio::spawn(room.run());
        Rig {
            id,
            handle,
            snapshots,
            hands,
            task,
        }
    }

    fn connect(rig: &Rig, conn: ConnId) -> UnboundedReceiver<ServerMessage> {
        let (tx, rx) = unbounded_channel();
        rig.handle.open(conn, tx);
        rig.handle.frame(
            conn,
            ClientMessage::AuthenticateWithTicket {
                ticket: format!("pk{}", conn),
            },
        );
        rx
    }

    /// Lets the room task drain its channel. Paused-clock runtimes advance
    /// time automatically while everything is idle.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    fn drain(rx: &mut UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = rx.try_recv() {
            messages.push(message);
        }
        messages
    }

    fn last_state(messages: &[ServerMessage]) -> Option<&ServerMessage> {
        messages
            .iter()
            .rev()
            .find(|m| matches!(m, ServerMessage::TableState { .. }))
    }

    #[tokio::test(start_paused = true)]
    async fn seating_two_players_starts_a_hand() {
        let rig = launch(config());
        let mut rx0 = connect(&rig, 0);
        let mut rx1 = connect(&rig, 1);
        rig.handle.frame(0, ClientMessage::Sit { seat_index: 0 });
        rig.handle.frame(1, ClientMessage::Sit { seat_index: 1 });
        settle().await;
        let messages = drain(&mut rx0);
        assert!(messages
            .iter()
            .any(|m| matches!(m, ServerMessage::Sat { seat_index: 0 })));
        match last_state(&messages) {
            Some(ServerMessage::TableState { view, .. }) => {
                assert_eq!(view.stage, Stage::Preflop);
                assert_eq!(view.pot, 3);
            }
            other => panic!("expected a table state, got {:?}", other),
        }
        let hole = messages.iter().rev().find_map(|m| match m {
            ServerMessage::PrivateState { my_hole, .. } => Some(my_hole.clone()),
            _ => None,
        });
        assert_eq!(hole.map(|h| h.len()), Some(2));
        drop(drain(&mut rx1));
        rig.task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn unauthenticated_sit_is_rejected() {
        let rig = launch(config());
        let (tx, mut rx) = unbounded_channel();
        rig.handle.open(9, tx);
        rig.handle.frame(9, ClientMessage::Sit { seat_index: 0 });
        settle().await;
        let messages = drain(&mut rx);
        assert!(messages
            .iter()
            .any(|m| matches!(m, ServerMessage::ErrorMsg { .. })));
        rig.task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_folds_the_seat_on_turn() {
        let rig = launch(config());
        let mut rx0 = connect(&rig, 0);
        let mut rx1 = connect(&rig, 1);
        rig.handle.frame(0, ClientMessage::Sit { seat_index: 0 });
        rig.handle.frame(1, ClientMessage::Sit { seat_index: 1 });
        settle().await;
        drop(drain(&mut rx0));
        drop(drain(&mut rx1));
        // heads-up: the dealer small blind is on turn facing a bet, so the
        // expiry folds it and the hand completes
        tokio::time::sleep(Duration::from_secs(11)).await;
        let messages = drain(&mut rx1);
        let folded = messages.iter().find_map(|m| match m {
            ServerMessage::AutoFold { seat_index } => Some(*seat_index),
            _ => None,
        });
        assert!(folded.is_some());
        assert!(messages.iter().any(|m| matches!(
            m,
            ServerMessage::TableState { extras: Some(_), .. }
        )));
        rig.task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn illegal_action_is_dropped_without_restarting_the_clock() {
        let rig = launch(config());
        let mut rx0 = connect(&rig, 0);
        let mut rx1 = connect(&rig, 1);
        rig.handle.frame(0, ClientMessage::Sit { seat_index: 0 });
        rig.handle.frame(1, ClientMessage::Sit { seat_index: 1 });
        settle().await;
        drop(drain(&mut rx0));
        drop(drain(&mut rx1));
        // below-minimum raise from the seat on turn: dropped, no broadcast
        rig.handle.frame(
            0,
            ClientMessage::Action {
                seat_index: 0,
                action: Action::Raise { amount: 1 },
            },
        );
        settle().await;
        let messages = drain(&mut rx1);
        assert!(last_state(&messages).is_none());
        // the original deadline still stands and fires on schedule
        tokio::time::sleep(Duration::from_secs(11)).await;
        let messages = drain(&mut rx1);
        assert!(messages
            .iter()
            .any(|m| matches!(m, ServerMessage::AutoFold { .. })));
        rig.task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn reconnect_within_window_keeps_the_seat() {
        let rig = launch(TableConfig {
            seats: 3,
            action_timeout: Duration::from_secs(120),
            ..TableConfig::default()
        });
        let mut rx0 = connect(&rig, 0);
        let mut rx1 = connect(&rig, 1);
        rig.handle.frame(0, ClientMessage::Sit { seat_index: 0 });
        rig.handle.frame(1, ClientMessage::Sit { seat_index: 1 });
        settle().await;
        let dealt = drain(&mut rx0)
            .iter()
            .rev()
            .find_map(|m| match m {
                ServerMessage::PrivateState { my_hole, .. } => Some(my_hole.clone()),
                _ => None,
            })
            .expect("hole cards dealt");
        rig.handle.closed(0);
        tokio::time::sleep(Duration::from_secs(30)).await;
        // same ticket, new socket
        let (tx, mut rx0b) = unbounded_channel();
        rig.handle.open(10, tx);
        rig.handle.frame(
            10,
            ClientMessage::AuthenticateWithTicket { ticket: "pk0".into() },
        );
        settle().await;
        let messages = drain(&mut rx0b);
        let rebound = messages.iter().find_map(|m| match m {
            ServerMessage::PrivateState { my_index, my_hole, .. } => {
                Some((*my_index, my_hole.clone()))
            }
            _ => None,
        });
        assert_eq!(rebound, Some((0, dealt)));
        match last_state(&messages) {
            Some(ServerMessage::TableState { view, .. }) => {
                assert_eq!(view.current_turn_index, Some(0));
                assert_eq!(view.seats[0].as_ref().map(|s| s.connected), Some(true));
            }
            other => panic!("expected a table state, got {:?}", other),
        }
        drop(drain(&mut rx1));
        rig.task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn lapsed_reclaim_window_vacates_the_seat() {
        let rig = launch(config());
        let mut rx0 = connect(&rig, 0);
        let mut rx1 = connect(&rig, 1);
        // only one seat taken, so no hand is running
        rig.handle.frame(0, ClientMessage::Sit { seat_index: 0 });
        settle().await;
        rig.handle.closed(0);
        tokio::time::sleep(Duration::from_secs(61)).await;
        let messages = drain(&mut rx1);
        match last_state(&messages) {
            Some(ServerMessage::TableState { view, .. }) => {
                assert!(view.seats[0].is_none());
            }
            other => panic!("expected a table state, got {:?}", other),
        }
        drop(drain(&mut rx0));
        rig.task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn completed_hand_emits_a_record() {
        let rig = launch(config());
        let mut rx0 = connect(&rig, 0);
        let mut rx1 = connect(&rig, 1);
        rig.handle.frame(0, ClientMessage::Sit { seat_index: 0 });
        rig.handle.frame(1, ClientMessage::Sit { seat_index: 1 });
        settle().await;
        rig.handle.frame(
            0,
            ClientMessage::Action {
                seat_index: 0,
                action: Action::Fold,
            },
        );
        settle().await;
        let records = rig.hands.recorded();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pot, 3);
        assert_eq!(records[0].table_id, rig.id.to_string());
        assert_eq!(records[0].winners.len(), 1);
        drop(drain(&mut rx0));
        drop(drain(&mut rx1));
        rig.task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn restart_recovers_the_hand_from_the_snapshot() {
        let rig = launch(config());
        let mut rx0 = connect(&rig, 0);
        let mut rx1 = connect(&rig, 1);
        rig.handle.frame(0, ClientMessage::Sit { seat_index: 0 });
        rig.handle.frame(1, ClientMessage::Sit { seat_index: 1 });
        settle().await;
        let dealt = drain(&mut rx0)
            .iter()
            .rev()
            .find_map(|m| match m {
                ServerMessage::PrivateState { my_hole, .. } => Some(my_hole.clone()),
                _ => None,
            })
            .expect("hole cards dealt");
        // limp and check to the flop, then kill the process mid-hand
        rig.handle.frame(
            0,
            ClientMessage::Action { seat_index: 0, action: Action::Call },
        );
        rig.handle.frame(
            1,
            ClientMessage::Action { seat_index: 1, action: Action::Check },
        );
        settle().await;
        rig.task.abort();
        drop(drain(&mut rx1));

        let (room, handle) = Room::restore(
            rig.id,
            config(),
            rig.snapshots.clone(),
            Arc::new(MemoryHands::default()),
            Arc::new(OpenDoor),
        )
        .await;
        assert_eq!(room.table().stage(), Stage::Flop);
        assert_eq!(room.table().pot(), 4);
        assert_eq!(room.table().community().len(), 3);
        room.table().audit().unwrap();
        let task = tokio::spawn(room.run());
        // the first player reclaims their seat and sees the same cards
        let (tx, mut rx) = unbounded_channel();
        handle.open(20, tx);
        handle.frame(
            20,
            ClientMessage::AuthenticateWithTicket { ticket: "pk0".into() },
        );
        settle().await;
        let messages = drain(&mut rx);
        let hole = messages.iter().find_map(|m| match m {
            ServerMessage::PrivateState { my_hole, .. } => Some(my_hole.clone()),
            _ => None,
        });
        assert_eq!(hole, Some(dealt));
        task.abort();
    }
}
