//! Per-connection session context and its lifecycle
//!
//! A [`Session`] is created when the server acknowledges the connection and
//! dropped when the transport goes away, so every connection starts with a
//! fresh pressed-set, predictor, emitter, snapshot cache and scoreboard.

use crate::emitter::DeltaEmitter;
use crate::input::InputSampler;
use crate::prediction::LocalPredictor;
use crate::snapshot::SnapshotReceiver;
use log::{info, warn};
use shared::{GameSnapshot, Position};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connected,
    Joined,
    Started,
    Ended,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Joined => "joined",
            ConnectionStatus::Started => "started",
            ConnectionStatus::Ended => "ended",
        };
        f.write_str(label)
    }
}

/// Goals per team. Counts only ever grow within a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoreboard {
    goals: BTreeMap<u8, u32>,
}

impl Scoreboard {
    pub fn record_goal(&mut self, team: u8) -> u32 {
        let score = self.goals.entry(team).or_insert(0);
        *score = score.saturating_add(1);
        *score
    }

    pub fn score(&self, team: u8) -> u32 {
        self.goals.get(&team).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        self.goals.iter().map(|(team, score)| (*team, *score))
    }
}

#[derive(Debug)]
pub struct Session {
    local_entity_id: String,
    status: ConnectionStatus,
    room_id: Option<u32>,
    scoreboard: Scoreboard,

    pub input: InputSampler,
    pub predictor: LocalPredictor,
    pub emitter: DeltaEmitter,
    pub receiver: SnapshotReceiver,
}

impl Session {
    pub fn new(local_entity_id: String, speed: f32, send_interval: Duration) -> Self {
        Self {
            local_entity_id,
            status: ConnectionStatus::Connected,
            room_id: None,
            scoreboard: Scoreboard::default(),
            input: InputSampler::new(),
            predictor: LocalPredictor::new(speed),
            emitter: DeltaEmitter::new(send_interval),
            receiver: SnapshotReceiver::new(),
        }
    }

    pub fn local_entity_id(&self) -> &str {
        &self.local_entity_id
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn room_id(&self) -> Option<u32> {
        self.room_id
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn position(&self) -> Option<Position> {
        self.predictor.position()
    }

    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        self.receiver.latest()
    }

    /// Connected -> Joined, after the server created or admitted us to a room
    pub fn join_room(&mut self, room_id: u32) -> bool {
        if self.status != ConnectionStatus::Connected {
            warn!("Ignoring room {} while {}", room_id, self.status);
            return false;
        }
        info!("Joined room {}", room_id);
        self.room_id = Some(room_id);
        self.status = ConnectionStatus::Joined;
        true
    }

    /// Joined -> Started
    pub fn start(&mut self) -> bool {
        if self.status != ConnectionStatus::Joined {
            warn!("Ignoring game start while {}", self.status);
            return false;
        }
        info!("Game started in room {:?}", self.room_id);
        self.status = ConnectionStatus::Started;
        true
    }

    /// Started -> Ended. Drops the snapshot and the local anchor with it.
    pub fn end(&mut self) -> bool {
        if self.status != ConnectionStatus::Started {
            warn!("Ignoring game end while {}", self.status);
            return false;
        }
        info!("Game ended in room {:?}", self.room_id);
        self.status = ConnectionStatus::Ended;
        self.reset_game_state();
        true
    }

    /// Joined/Started/Ended -> Connected
    pub fn leave(&mut self) -> bool {
        match self.status {
            ConnectionStatus::Joined | ConnectionStatus::Started | ConnectionStatus::Ended => {
                info!("Left room {:?}", self.room_id);
                self.status = ConnectionStatus::Connected;
                self.room_id = None;
                self.reset_game_state();
                true
            }
            status => {
                warn!("Ignoring room leave while {}", status);
                false
            }
        }
    }

    /// Snapshots are only meaningful while in a room that has not ended
    pub fn apply_snapshot(&mut self, snapshot: GameSnapshot) -> bool {
        match self.status {
            ConnectionStatus::Joined | ConnectionStatus::Started => {
                self.receiver
                    .apply_snapshot(snapshot, &self.local_entity_id, &mut self.predictor);
                true
            }
            _ => false,
        }
    }

    pub fn record_goal(&mut self, team: u8) -> u32 {
        self.scoreboard.record_goal(team)
    }

    fn reset_game_state(&mut self) {
        self.receiver.clear();
        self.predictor.reanchor(None);
        self.input.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{PlayerState, PLAYER_SPEED};

    fn session() -> Session {
        Session::new("abc".to_string(), PLAYER_SPEED, Duration::from_millis(33))
    }

    fn snapshot() -> GameSnapshot {
        let mut snapshot = GameSnapshot::default();
        snapshot.players.insert(
            "abc".to_string(),
            PlayerState {
                x: 150.0,
                y: 400.0,
                team: Some(0),
            },
        );
        snapshot
    }

    #[test]
    fn test_new_session_is_connected() {
        let session = session();
        assert_eq!(session.status(), ConnectionStatus::Connected);
        assert_eq!(session.local_entity_id(), "abc");
        assert_eq!(session.room_id(), None);
        assert_eq!(session.position(), None);
    }

    #[test]
    fn test_full_lifecycle() {
        let mut session = session();
        assert!(session.join_room(4821));
        assert_eq!(session.status(), ConnectionStatus::Joined);
        assert!(session.start());
        assert_eq!(session.status(), ConnectionStatus::Started);
        assert!(session.end());
        assert_eq!(session.status(), ConnectionStatus::Ended);
        assert!(session.leave());
        assert_eq!(session.status(), ConnectionStatus::Connected);
        assert_eq!(session.room_id(), None);
    }

    #[test]
    fn test_leave_from_joined() {
        let mut session = session();
        session.join_room(1);
        assert!(session.leave());
        assert_eq!(session.status(), ConnectionStatus::Connected);
    }

    #[test]
    fn test_invalid_transitions_are_ignored() {
        let mut session = session();
        assert!(!session.start());
        assert!(!session.end());
        assert!(!session.leave());
        assert_eq!(session.status(), ConnectionStatus::Connected);

        session.join_room(1);
        assert!(!session.join_room(2));
        assert_eq!(session.room_id(), Some(1));
        assert!(!session.end());
    }

    #[test]
    fn test_end_clears_snapshot_and_position() {
        let mut session = session();
        session.join_room(1);
        session.start();
        assert!(session.apply_snapshot(snapshot()));
        assert!(session.position().is_some());

        session.end();
        assert!(session.snapshot().is_none());
        assert!(session.position().is_none());
    }

    #[test]
    fn test_snapshots_ignored_outside_a_room() {
        let mut session = session();
        assert!(!session.apply_snapshot(snapshot()));
        assert!(session.snapshot().is_none());

        session.join_room(1);
        session.start();
        session.end();
        assert!(!session.apply_snapshot(snapshot()));
        assert!(session.snapshot().is_none());
    }

    #[test]
    fn test_scoreboard_counts_per_team() {
        let mut session = session();
        assert_eq!(session.record_goal(1), 1);
        assert_eq!(session.record_goal(1), 2);
        assert_eq!(session.record_goal(0), 1);
        assert_eq!(session.scoreboard().score(1), 2);
        assert_eq!(session.scoreboard().score(7), 0);
        assert_eq!(
            session.scoreboard().iter().collect::<Vec<_>>(),
            vec![(0, 1), (1, 2)]
        );
    }

    #[test]
    fn test_scoreboard_survives_leaving_a_room() {
        let mut session = session();
        session.join_room(1);
        session.record_goal(0);
        session.leave();
        assert_eq!(session.scoreboard().score(0), 1);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(ConnectionStatus::Started.to_string(), "started");
        assert_eq!(ConnectionStatus::Disconnected.to_string(), "disconnected");
    }
}
