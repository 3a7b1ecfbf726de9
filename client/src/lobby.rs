//! Keyboard lobby controls: create, join, start and leave rooms

use crate::session::ConnectionStatus;
use crate::sync::SyncClient;
use shared::ClientEvent;

/// Longest room id that can be typed
const MAX_ROOM_DIGITS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyKey {
    Create,
    Join,
    Start,
    Leave,
    Digit(u8),
    Backspace,
}

/// Maps a lobby key to the command it issues in the given state, if any
pub fn command_for(key: LobbyKey, status: ConnectionStatus, join_room: Option<u32>) -> Option<ClientEvent> {
    match (key, status) {
        (LobbyKey::Create, ConnectionStatus::Connected) => Some(ClientEvent::CreateGame {}),
        (LobbyKey::Join, ConnectionStatus::Connected) => {
            join_room.map(|room_id| ClientEvent::JoinGame { room_id })
        }
        (LobbyKey::Start, ConnectionStatus::Joined) => Some(ClientEvent::StartGame {}),
        (
            LobbyKey::Leave,
            ConnectionStatus::Joined | ConnectionStatus::Started | ConnectionStatus::Ended,
        ) => Some(ClientEvent::LeaveGame {}),
        _ => None,
    }
}

#[derive(Debug)]
pub struct LobbyControls {
    join_room: Option<u32>,
    room_input: String,
    last_status: ConnectionStatus,
}

impl LobbyControls {
    /// `join_room` is joined automatically on every new connection
    pub fn new(join_room: Option<u32>) -> Self {
        Self {
            join_room,
            room_input: String::new(),
            last_status: ConnectionStatus::Disconnected,
        }
    }

    /// Room the Join key targets: the typed id, else the configured one
    pub fn room_id(&self) -> Option<u32> {
        self.room_input.parse().ok().or(self.join_room)
    }

    pub fn room_input(&self) -> &str {
        &self.room_input
    }

    pub fn update(&mut self, status: ConnectionStatus, keys: &[LobbyKey]) -> Vec<ClientEvent> {
        let mut commands = Vec::new();

        let fresh_connection =
            self.last_status == ConnectionStatus::Disconnected && status == ConnectionStatus::Connected;
        if fresh_connection {
            if let Some(room_id) = self.join_room {
                commands.push(ClientEvent::JoinGame { room_id });
            }
        }
        self.last_status = status;

        for key in keys {
            match key {
                LobbyKey::Digit(digit) if status == ConnectionStatus::Connected => {
                    self.push_digit(*digit)
                }
                LobbyKey::Backspace if status == ConnectionStatus::Connected => {
                    self.room_input.pop();
                }
                _ => commands.extend(command_for(*key, status, self.room_id())),
            }
        }
        commands
    }

    fn push_digit(&mut self, digit: u8) {
        if self.room_input.len() >= MAX_ROOM_DIGITS {
            return;
        }
        if let Some(c) = char::from_digit(u32::from(digit), 10) {
            self.room_input.push(c);
        }
    }

    /// Text for the lobby screen
    pub fn lines(&self, client: &SyncClient) -> Vec<String> {
        let mut lines = vec![format!("Status: {}", client.status())];

        if let Some(id) = client.local_entity_id() {
            lines.push(format!("Your ID: {}", id));
        }
        if let Some(room_id) = client.room_id() {
            lines.push(format!("Game ID: {}", room_id));
        }

        match client.status() {
            ConnectionStatus::Disconnected => lines.push("Waiting for server...".to_string()),
            ConnectionStatus::Connected => {
                lines.push("C: create game".to_string());
                lines.push(format!("Room ID (0-9): {}_", self.room_input));
                if let Some(room_id) = self.room_id() {
                    lines.push(format!("J: join game {}", room_id));
                }
            }
            ConnectionStatus::Joined => {
                lines.push("S: start game".to_string());
                lines.push("L: leave game".to_string());
            }
            ConnectionStatus::Started | ConnectionStatus::Ended => {
                lines.push("L: leave game".to_string());
            }
        }

        for room in client
            .rooms()
            .iter()
            .filter(|room| client.local_entity_id().is_some_and(|id| room.players.iter().any(|p| p == id)))
        {
            lines.push(format!("Room {}: {}", room.room_id, room.players.join(", ")));
        }

        if let Some(rejection) = client.last_rejection() {
            lines.push(rejection.to_string());
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::ClientConfig;
    use shared::{RoomStatus, RoomSummary, ServerEvent};

    #[test]
    fn test_commands_depend_on_status() {
        use ConnectionStatus::*;

        assert_eq!(command_for(LobbyKey::Create, Connected, None), Some(ClientEvent::CreateGame {}));
        assert_eq!(command_for(LobbyKey::Create, Joined, None), None);
        assert_eq!(command_for(LobbyKey::Join, Connected, None), None);
        assert_eq!(
            command_for(LobbyKey::Join, Connected, Some(4821)),
            Some(ClientEvent::JoinGame { room_id: 4821 })
        );
        assert_eq!(command_for(LobbyKey::Start, Joined, None), Some(ClientEvent::StartGame {}));
        assert_eq!(command_for(LobbyKey::Start, Started, None), None);
        assert_eq!(command_for(LobbyKey::Leave, Ended, None), Some(ClientEvent::LeaveGame {}));
        assert_eq!(command_for(LobbyKey::Leave, Disconnected, None), None);
    }

    #[test]
    fn test_auto_join_once_per_connection() {
        let mut lobby = LobbyControls::new(Some(4821));

        assert!(lobby.update(ConnectionStatus::Disconnected, &[]).is_empty());
        assert_eq!(
            lobby.update(ConnectionStatus::Connected, &[]),
            vec![ClientEvent::JoinGame { room_id: 4821 }]
        );
        assert!(lobby.update(ConnectionStatus::Connected, &[]).is_empty());

        // Reconnect joins again
        lobby.update(ConnectionStatus::Disconnected, &[]);
        assert_eq!(lobby.update(ConnectionStatus::Connected, &[]).len(), 1);
    }

    #[test]
    fn test_no_auto_join_without_room() {
        let mut lobby = LobbyControls::new(None);
        assert!(lobby.update(ConnectionStatus::Connected, &[]).is_empty());
        assert_eq!(
            lobby.update(ConnectionStatus::Connected, &[LobbyKey::Create]),
            vec![ClientEvent::CreateGame {}]
        );
    }

    #[test]
    fn test_typed_room_id_is_joined() {
        let mut lobby = LobbyControls::new(None);
        lobby.update(ConnectionStatus::Connected, &[]);

        let typed = [LobbyKey::Digit(4), LobbyKey::Digit(8), LobbyKey::Digit(2), LobbyKey::Digit(1)];
        assert!(lobby.update(ConnectionStatus::Connected, &typed).is_empty());
        assert_eq!(lobby.room_input(), "4821");

        assert_eq!(
            lobby.update(ConnectionStatus::Connected, &[LobbyKey::Join]),
            vec![ClientEvent::JoinGame { room_id: 4821 }]
        );
    }

    #[test]
    fn test_typed_room_id_overrides_configured_one() {
        let mut lobby = LobbyControls::new(Some(1111));
        lobby.update(ConnectionStatus::Connected, &[LobbyKey::Digit(7), LobbyKey::Digit(9)]);
        assert_eq!(lobby.room_id(), Some(79));

        lobby.update(
            ConnectionStatus::Connected,
            &[LobbyKey::Backspace, LobbyKey::Backspace, LobbyKey::Backspace],
        );
        assert_eq!(lobby.room_input(), "");
        assert_eq!(lobby.room_id(), Some(1111));
    }

    #[test]
    fn test_room_entry_only_while_connected() {
        let mut lobby = LobbyControls::new(None);
        lobby.update(ConnectionStatus::Joined, &[LobbyKey::Digit(5)]);
        assert_eq!(lobby.room_input(), "");

        let too_long = [LobbyKey::Digit(9); 12];
        lobby.update(ConnectionStatus::Connected, &too_long);
        assert_eq!(lobby.room_input().len(), MAX_ROOM_DIGITS);
    }

    #[test]
    fn test_lobby_lines() {
        let lobby = LobbyControls::new(None);
        let mut client = SyncClient::new(ClientConfig::default());
        assert_eq!(lobby.lines(&client)[0], "Status: disconnected");

        client.handle_event(ServerEvent::Connected { sid: "abc".into() });
        client.handle_event(ServerEvent::GameCreated { room_id: 1234 });
        client.handle_event(ServerEvent::RoomList {
            rooms: vec![
                RoomSummary {
                    room_id: 1234,
                    players: vec!["abc".into(), "def".into()],
                    status: RoomStatus::Waiting,
                },
                RoomSummary {
                    room_id: 5678,
                    players: vec!["ghi".into()],
                    status: RoomStatus::Playing,
                },
            ],
        });

        let lines = lobby.lines(&client);
        assert!(lines.contains(&"Your ID: abc".to_string()));
        assert!(lines.contains(&"S: start game".to_string()));
        assert!(lines.contains(&"Room 1234: abc, def".to_string()));
        assert!(!lines.iter().any(|line| line.starts_with("Room 5678")));
    }
}
