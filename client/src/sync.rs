use crate::game_loop::{Frame, LoopDriver};
use crate::input::InputSampler;
use crate::network::Inbound;
use crate::session::{ConnectionStatus, Scoreboard, Session};
use log::{debug, info, warn};
use shared::{GameSnapshot, Position, RoomSummary, ServerEvent, PLAYER_SPEED, SEND_INTERVAL_MS};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Court units moved per tick per held direction
    pub speed: f32,
    /// Minimum time between two outbound moves
    pub send_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            speed: PLAYER_SPEED,
            send_interval: Duration::from_millis(SEND_INTERVAL_MS),
        }
    }
}

/// The synchronization core: one optional session plus the loop driver.
///
/// Every server event goes through [`SyncClient::handle_event`]; the lobby and
/// display read the observable fields (`status`, `local_entity_id`, `position`).
pub struct SyncClient {
    config: ClientConfig,
    session: Option<Session>,
    driver: LoopDriver,
    rooms: Vec<RoomSummary>,
    last_rejection: Option<String>,
}

impl SyncClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            session: None,
            driver: LoopDriver::new(),
            rooms: Vec::new(),
            last_rejection: None,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.session
            .as_ref()
            .map_or(ConnectionStatus::Disconnected, Session::status)
    }

    pub fn local_entity_id(&self) -> Option<&str> {
        self.session.as_ref().map(Session::local_entity_id)
    }

    pub fn position(&self) -> Option<Position> {
        self.session.as_ref().and_then(Session::position)
    }

    pub fn room_id(&self) -> Option<u32> {
        self.session.as_ref().and_then(Session::room_id)
    }

    pub fn scoreboard(&self) -> Option<&Scoreboard> {
        self.session.as_ref().map(Session::scoreboard)
    }

    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        self.session.as_ref().and_then(Session::snapshot)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn input_mut(&mut self) -> Option<&mut InputSampler> {
        self.session.as_mut().map(|session| &mut session.input)
    }

    pub fn is_loop_running(&self) -> bool {
        self.driver.is_running()
    }

    /// Rooms from the latest `room_list` broadcast
    pub fn rooms(&self) -> &[RoomSummary] {
        &self.rooms
    }

    /// Most recent lobby error from the server, cleared on the next room change
    pub fn last_rejection(&self) -> Option<&str> {
        self.last_rejection.as_deref()
    }

    /// Starts a fresh session for the id the server assigned
    pub fn on_connect(&mut self, sid: String) {
        if self.session.is_some() {
            warn!("Replacing existing session on reconnect");
        }
        info!("Connected with ID: {}", sid);

        self.driver.stop();
        self.last_rejection = None;
        self.session = Some(Session::new(
            sid,
            self.config.speed,
            self.config.send_interval,
        ));
    }

    pub fn on_authoritative_state(&mut self, snapshot: GameSnapshot) {
        let Some(session) = self.session.as_mut() else {
            debug!("Dropping game state without a session");
            return;
        };
        if !session.apply_snapshot(snapshot) {
            debug!("Dropping game state while {}", session.status());
        }
    }

    /// Runs the loop if the session is in a started game
    pub fn start_loop(&mut self) -> bool {
        if self.status() != ConnectionStatus::Started {
            warn!("Not starting loop while {}", self.status());
            return false;
        }
        self.driver.start();
        true
    }

    pub fn stop_loop(&mut self) {
        if self.driver.is_running() {
            debug!("Stopping loop after {} frames", self.driver.frames());
        }
        self.driver.stop();
    }

    /// Transport is gone: stop and drop the session
    pub fn on_disconnect(&mut self, reason: &str) {
        warn!("Disconnected: {}", reason);
        self.stop_loop();
        self.session = None;
        self.rooms.clear();
    }

    pub fn handle_inbound(&mut self, inbound: Inbound) {
        match inbound {
            Inbound::Event(event) => self.handle_event(event),
            Inbound::Disconnected { reason } => self.on_disconnect(&reason),
        }
    }

    pub fn handle_event(&mut self, event: ServerEvent) {
        if let ServerEvent::Connected { sid } = event {
            self.on_connect(sid);
            return;
        }

        // Everything but room_list needs a session
        if let ServerEvent::RoomList { rooms } = event {
            debug!("Room list with {} rooms", rooms.len());
            self.rooms = rooms;
            return;
        }

        let Some(session) = self.session.as_mut() else {
            warn!("Ignoring {} before connected", event.name());
            return;
        };

        match event {
            ServerEvent::GameCreated { room_id } | ServerEvent::GameJoined { room_id } => {
                if session.join_room(room_id) {
                    self.last_rejection = None;
                }
            }
            ServerEvent::GameStarted { .. } => {
                if session.start() {
                    self.start_loop();
                }
            }
            ServerEvent::GameState(snapshot) => self.on_authoritative_state(snapshot),
            ServerEvent::GoalScored { team } => {
                let score = session.record_goal(team);
                info!("Goal for team {}, now {}", team, score);
            }
            ServerEvent::GameEnded {} => {
                self.stop_loop();
                if let Some(session) = self.session.as_mut() {
                    session.end();
                }
            }
            ServerEvent::GameLeft { .. } => {
                self.stop_loop();
                if let Some(session) = self.session.as_mut() {
                    session.leave();
                }
            }
            ServerEvent::PlayerLeft { player_id } => {
                info!("Player {} left the room", player_id);
            }
            ServerEvent::RoomNotFound { room_id } => {
                self.reject(format!("Room {} not found", room_id));
            }
            ServerEvent::AlreadyInRoom { room_id } => {
                self.reject(format!("Already in room {}", room_id));
            }
            ServerEvent::GameAlreadyStarted { room_id } => {
                self.reject(format!("Game in room {} already started", room_id));
            }
            ServerEvent::NotInRoom { error } => self.reject(error),
            ServerEvent::Connected { .. } | ServerEvent::RoomList { .. } => {}
        }
    }

    /// One loop iteration; does nothing unless the loop is running
    pub fn frame(&mut self, now: Instant, timestamp: u64) -> Frame {
        match self.session.as_mut() {
            Some(session) => self.driver.tick(session, now, timestamp),
            None => Frame::default(),
        }
    }

    fn reject(&mut self, message: String) {
        warn!("Lobby request rejected: {}", message);
        self.last_rejection = Some(message);
    }
}
