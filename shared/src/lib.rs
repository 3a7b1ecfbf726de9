pub mod socketio;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

pub use socketio::Packet;

pub const GAME_WIDTH: f32 = 300.0;
pub const GAME_HEIGHT: f32 = 450.0;
pub const PLAYER_RADIUS: f32 = 15.0;
pub const BALL_RADIUS: f32 = 10.0;
pub const GOAL_DEPTH: f32 = 5.0;
pub const PLAYER_SPEED: f32 = 2.0;
pub const SEND_INTERVAL_MS: u64 = 33;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Component-wise difference `self - earlier`
    pub fn delta_from(&self, earlier: &Position) -> (f32, f32) {
        (self.x - earlier.x, self.y - earlier.y)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub team: Option<u8>,
}

impl PlayerState {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Full authoritative state pushed by the server. Replaces any earlier snapshot wholesale.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct GameSnapshot {
    #[serde(default)]
    pub players: HashMap<String, PlayerState>,
    #[serde(default)]
    pub ball: Option<Position>,
}

impl GameSnapshot {
    pub fn player(&self, id: &str) -> Option<&PlayerState> {
        self.players.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.ball.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Ended,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RoomSummary {
    pub room_id: u32,
    #[serde(default)]
    pub players: Vec<String>,
    pub status: RoomStatus,
}

/// Events pushed from the server to the client
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Connected {
        sid: String,
    },
    RoomList {
        rooms: Vec<RoomSummary>,
    },
    GameCreated {
        room_id: u32,
    },
    GameJoined {
        room_id: u32,
    },
    GameStarted {
        #[serde(default)]
        room_id: Option<u32>,
    },
    GameState(GameSnapshot),
    GoalScored {
        team: u8,
    },
    GameEnded {},
    GameLeft {
        #[serde(default)]
        room_id: Option<u32>,
    },
    PlayerLeft {
        player_id: String,
    },
    RoomNotFound {
        room_id: u32,
    },
    AlreadyInRoom {
        room_id: u32,
    },
    GameAlreadyStarted {
        room_id: u32,
    },
    NotInRoom {
        error: String,
    },
}

impl ServerEvent {
    pub const NAMES: &'static [&'static str] = &[
        "connected",
        "room_list",
        "game_created",
        "game_joined",
        "game_started",
        "game_state",
        "goal_scored",
        "game_ended",
        "game_left",
        "player_left",
        "room_not_found",
        "already_in_room",
        "game_already_started",
        "not_in_room",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Connected { .. } => "connected",
            ServerEvent::RoomList { .. } => "room_list",
            ServerEvent::GameCreated { .. } => "game_created",
            ServerEvent::GameJoined { .. } => "game_joined",
            ServerEvent::GameStarted { .. } => "game_started",
            ServerEvent::GameState(_) => "game_state",
            ServerEvent::GoalScored { .. } => "goal_scored",
            ServerEvent::GameEnded {} => "game_ended",
            ServerEvent::GameLeft { .. } => "game_left",
            ServerEvent::PlayerLeft { .. } => "player_left",
            ServerEvent::RoomNotFound { .. } => "room_not_found",
            ServerEvent::AlreadyInRoom { .. } => "already_in_room",
            ServerEvent::GameAlreadyStarted { .. } => "game_already_started",
            ServerEvent::NotInRoom { .. } => "not_in_room",
        }
    }

    /// Builds an event from its Socket.IO name and first argument
    pub fn from_parts(name: &str, data: Value) -> Result<Self, ProtocolError> {
        event_from_parts(name, data, Self::NAMES)
    }

    /// Decodes one `42[...]` event packet
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        match Packet::decode(text)? {
            Packet::Event { name, data } => Self::from_parts(&name, data),
            _ => Err(ProtocolError::NotAnEvent),
        }
    }

    pub fn payload(&self) -> Result<Value, ProtocolError> {
        tagged_data(self)
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Packet::event(self.name(), Some(self.payload()?)).encode()
    }
}

/// Events sent from the client to the server
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    CreateGame {},
    JoinGame { room_id: u32 },
    LeaveGame {},
    StartGame {},
    /// Position change since the previous tick, never an absolute position
    PlayerMove { x: f32, y: f32, timestamp: u64 },
}

impl ClientEvent {
    pub const NAMES: &'static [&'static str] = &[
        "create_game",
        "join_game",
        "leave_game",
        "start_game",
        "player_move",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::CreateGame {} => "create_game",
            ClientEvent::JoinGame { .. } => "join_game",
            ClientEvent::LeaveGame {} => "leave_game",
            ClientEvent::StartGame {} => "start_game",
            ClientEvent::PlayerMove { .. } => "player_move",
        }
    }

    pub fn from_parts(name: &str, data: Value) -> Result<Self, ProtocolError> {
        event_from_parts(name, data, Self::NAMES)
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        match Packet::decode(text)? {
            Packet::Event { name, data } => Self::from_parts(&name, data),
            _ => Err(ProtocolError::NotAnEvent),
        }
    }

    /// Argument sent with the event. The server's `create_game` and
    /// `start_game` handlers take none, so those are sent bare.
    pub fn payload(&self) -> Result<Option<Value>, ProtocolError> {
        match self {
            ClientEvent::CreateGame {} | ClientEvent::StartGame {} => Ok(None),
            _ => tagged_data(self).map(Some),
        }
    }

    pub fn to_packet(&self) -> Result<Packet, ProtocolError> {
        Ok(Packet::event(self.name(), self.payload()?))
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        self.to_packet()?.encode()
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Malformed packet: {0}")]
    Malformed(&'static str),

    #[error("Unknown packet type '{0}'")]
    UnknownPacketType(String),

    #[error("Packet is not an event")]
    NotAnEvent,

    #[error("Unknown event '{0}'")]
    UnknownEvent(String),

    #[error("Invalid payload for '{event}': {source}")]
    InvalidPayload {
        event: String,
        source: serde_json::Error,
    },

    #[error("Failed to encode event: {0}")]
    Encode(serde_json::Error),

    #[error("Invalid server URL '{0}'")]
    InvalidUrl(String),
}

// Events without a payload may omit the argument or send null; both mean `{}`.
fn event_from_parts<T: DeserializeOwned>(
    name: &str,
    data: Value,
    known: &[&str],
) -> Result<T, ProtocolError> {
    if !known.contains(&name) {
        return Err(ProtocolError::UnknownEvent(name.to_string()));
    }

    let data = match data {
        Value::Null => Value::Object(Map::new()),
        data => data,
    };
    let mut tagged = Map::new();
    tagged.insert("event".to_string(), Value::String(name.to_string()));
    tagged.insert("data".to_string(), data);

    serde_json::from_value(Value::Object(tagged)).map_err(|source| ProtocolError::InvalidPayload {
        event: name.to_string(),
        source,
    })
}

fn tagged_data<T: Serialize>(event: &T) -> Result<Value, ProtocolError> {
    let mut tagged = serde_json::to_value(event).map_err(ProtocolError::Encode)?;
    Ok(tagged
        .get_mut("data")
        .map(Value::take)
        .unwrap_or_else(|| Value::Object(Map::new())))
}
