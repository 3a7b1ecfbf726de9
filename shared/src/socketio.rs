//! Socket.IO v5 / Engine.IO v4 framing over a WebSocket
//!
//! Every WebSocket text frame is one Engine.IO packet: a single type digit
//! followed by its payload. Engine.IO `message` packets (`4`) carry a
//! Socket.IO packet, so an event on the default namespace looks like
//! `42["game_state",{...}]`. Only the text subset the game server uses is
//! supported: no binary attachments and no acknowledgements.

use crate::ProtocolError;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Engine.IO protocol revision requested in the connect URL
pub const ENGINE_IO_VERSION: u8 = 4;

/// First packet the server sends on a new connection
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
}

impl Handshake {
    /// How long the connection may stay silent before it is considered dead
    pub fn liveness_window(&self) -> Duration {
        Duration::from_millis(self.ping_interval + self.ping_timeout)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// `0{handshake}`
    Open(Handshake),
    /// `1`
    Close,
    /// `2`, answered with [`Packet::Pong`]
    Ping,
    /// `3`
    Pong,
    /// `40` from the client, `40{"sid":..}` from the server
    Connect { sid: Option<String> },
    /// `41`
    Disconnect,
    /// `42["name", data]`; missing data decodes as `Value::Null`
    Event { name: String, data: Value },
    /// `44{"message":..}`
    ConnectError { message: String },
    /// `6`
    Noop,
}

impl Packet {
    pub fn event(name: &str, data: Option<Value>) -> Self {
        Packet::Event {
            name: name.to_string(),
            data: data.unwrap_or(Value::Null),
        }
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let mut chars = text.chars();
        let kind = chars.next().ok_or(ProtocolError::Malformed("empty packet"))?;
        let rest = chars.as_str();

        match kind {
            '0' => serde_json::from_str(rest)
                .map(Packet::Open)
                .map_err(ProtocolError::InvalidJson),
            '1' => Ok(Packet::Close),
            '2' => Ok(Packet::Ping),
            '3' => Ok(Packet::Pong),
            '4' => decode_socket_packet(rest),
            '6' => Ok(Packet::Noop),
            other => Err(ProtocolError::UnknownPacketType(other.to_string())),
        }
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        let text = match self {
            Packet::Open(handshake) => format!(
                "0{}",
                serde_json::json!({
                    "sid": handshake.sid,
                    "upgrades": handshake.upgrades,
                    "pingInterval": handshake.ping_interval,
                    "pingTimeout": handshake.ping_timeout,
                })
            ),
            Packet::Close => "1".to_string(),
            Packet::Ping => "2".to_string(),
            Packet::Pong => "3".to_string(),
            Packet::Connect { sid: None } => "40".to_string(),
            Packet::Connect { sid: Some(sid) } => format!("40{}", serde_json::json!({ "sid": sid })),
            Packet::Disconnect => "41".to_string(),
            Packet::Event { name, data } => {
                let args = match data {
                    Value::Null => serde_json::json!([name]),
                    data => serde_json::json!([name, data]),
                };
                format!("42{}", serde_json::to_string(&args).map_err(ProtocolError::Encode)?)
            }
            Packet::ConnectError { message } => {
                format!("44{}", serde_json::json!({ "message": message }))
            }
            Packet::Noop => "6".to_string(),
        };
        Ok(text)
    }
}

fn decode_socket_packet(text: &str) -> Result<Packet, ProtocolError> {
    let mut chars = text.chars();
    let kind = chars
        .next()
        .ok_or(ProtocolError::Malformed("empty message packet"))?;
    let rest = skip_namespace(chars.as_str());

    match kind {
        '0' => {
            let sid = if rest.is_empty() {
                None
            } else {
                let value: Value = serde_json::from_str(rest).map_err(ProtocolError::InvalidJson)?;
                value.get("sid").and_then(Value::as_str).map(str::to_string)
            };
            Ok(Packet::Connect { sid })
        }
        '1' => Ok(Packet::Disconnect),
        '2' => {
            // Acknowledgement id, if any, precedes the arguments
            let args = rest.trim_start_matches(|c: char| c.is_ascii_digit());
            decode_event_args(args)
        }
        '4' => {
            let value: Value = serde_json::from_str(rest).map_err(ProtocolError::InvalidJson)?;
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string());
            Ok(Packet::ConnectError { message })
        }
        other => Err(ProtocolError::UnknownPacketType(format!("4{}", other))),
    }
}

// Non-default namespaces are written as `/name,` before the payload
fn skip_namespace(text: &str) -> &str {
    if !text.starts_with('/') {
        return text;
    }
    match text.find(',') {
        Some(comma) => &text[comma + 1..],
        None => "",
    }
}

fn decode_event_args(text: &str) -> Result<Packet, ProtocolError> {
    let args: Value = serde_json::from_str(text).map_err(ProtocolError::InvalidJson)?;
    let Value::Array(mut args) = args else {
        return Err(ProtocolError::Malformed("event arguments are not an array"));
    };
    if args.is_empty() {
        return Err(ProtocolError::Malformed("event without a name"));
    }

    let data = if args.len() > 1 { args.swap_remove(1) } else { Value::Null };
    match args.swap_remove(0) {
        Value::String(name) => Ok(Packet::Event { name, data }),
        _ => Err(ProtocolError::Malformed("event name is not a string")),
    }
}

/// Turns a server address such as `http://127.0.0.1:5001` into the
/// Engine.IO WebSocket endpoint, `ws://127.0.0.1:5001/socket.io/?EIO=4&transport=websocket`.
///
/// An explicit path replaces the default `/socket.io`.
pub fn websocket_url(server: &str) -> Result<String, ProtocolError> {
    let invalid = || ProtocolError::InvalidUrl(server.to_string());

    let (scheme, rest) = server.split_once("://").ok_or_else(invalid)?;
    let scheme = match scheme {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => return Err(invalid()),
    };

    let rest = rest.trim_end_matches('/');
    let (authority, path) = match rest.find('/') {
        Some(slash) => rest.split_at(slash),
        None => (rest, "/socket.io"),
    };
    if authority.is_empty() {
        return Err(invalid());
    }

    Ok(format!(
        "{}://{}{}/?EIO={}&transport=websocket",
        scheme, authority, path, ENGINE_IO_VERSION
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_handshake() {
        let text = r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
        match Packet::decode(text).unwrap() {
            Packet::Open(handshake) => {
                assert_eq!(handshake.sid, "lv_VI97HAXpY6yYWAAAC");
                assert_eq!(handshake.liveness_window(), Duration::from_millis(45_000));
            }
            other => panic!("Expected open, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_control_packets() {
        assert_eq!(Packet::decode("1").unwrap(), Packet::Close);
        assert_eq!(Packet::decode("2").unwrap(), Packet::Ping);
        assert_eq!(Packet::decode("3").unwrap(), Packet::Pong);
        assert_eq!(Packet::decode("6").unwrap(), Packet::Noop);
        assert_eq!(Packet::decode("41").unwrap(), Packet::Disconnect);
        assert_eq!(
            Packet::decode(r#"40{"sid":"abc"}"#).unwrap(),
            Packet::Connect {
                sid: Some("abc".into())
            }
        );
        assert_eq!(
            Packet::decode(r#"44{"message":"Not authorized"}"#).unwrap(),
            Packet::ConnectError {
                message: "Not authorized".into()
            }
        );
    }

    #[test]
    fn test_decode_events() {
        assert_eq!(
            Packet::decode(r#"42["connected",{"sid":"abc"}]"#).unwrap(),
            Packet::event("connected", Some(json!({"sid": "abc"})))
        );
        assert_eq!(
            Packet::decode(r#"42["game_ended"]"#).unwrap(),
            Packet::event("game_ended", None)
        );
        // Namespace and acknowledgement id are skipped
        assert_eq!(
            Packet::decode(r#"42/admin,7["goal_scored",{"team":1}]"#).unwrap(),
            Packet::event("goal_scored", Some(json!({"team": 1})))
        );
    }

    #[test]
    fn test_decode_rejects_bad_packets() {
        assert!(matches!(Packet::decode(""), Err(ProtocolError::Malformed(_))));
        assert!(matches!(
            Packet::decode("9"),
            Err(ProtocolError::UnknownPacketType(_))
        ));
        assert!(matches!(Packet::decode("42{}"), Err(ProtocolError::Malformed(_))));
        assert!(matches!(Packet::decode("42[]"), Err(ProtocolError::Malformed(_))));
        assert!(matches!(Packet::decode("42[1]"), Err(ProtocolError::Malformed(_))));
        assert!(matches!(
            Packet::decode("42not json"),
            Err(ProtocolError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_encode_events() {
        assert_eq!(Packet::event("create_game", None).encode().unwrap(), r#"42["create_game"]"#);
        assert_eq!(
            Packet::event("join_game", Some(json!({"room_id": 4821})))
                .encode()
                .unwrap(),
            r#"42["join_game",{"room_id":4821}]"#
        );
        assert_eq!(Packet::Connect { sid: None }.encode().unwrap(), "40");
        assert_eq!(Packet::Pong.encode().unwrap(), "3");
    }

    #[test]
    fn test_encoded_handshake_decodes() {
        let handshake = Handshake {
            sid: "eio".into(),
            upgrades: Vec::new(),
            ping_interval: 100,
            ping_timeout: 50,
        };
        let text = Packet::Open(handshake.clone()).encode().unwrap();
        assert_eq!(Packet::decode(&text).unwrap(), Packet::Open(handshake));
    }

    #[test]
    fn test_websocket_url() {
        assert_eq!(
            websocket_url("http://127.0.0.1:5001").unwrap(),
            "ws://127.0.0.1:5001/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            websocket_url("https://game.example.com/").unwrap(),
            "wss://game.example.com/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            websocket_url("ws://localhost:5001/custom/path").unwrap(),
            "ws://localhost:5001/custom/path/?EIO=4&transport=websocket"
        );
        assert!(matches!(
            websocket_url("not-a-url"),
            Err(ProtocolError::InvalidUrl(_))
        ));
        assert!(websocket_url("ftp://host").is_err());
        assert!(websocket_url("http://").is_err());
    }
}
