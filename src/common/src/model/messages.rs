use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{ClientError, Result},
    model::game::{Card, GameType, Move, Selection},
};

pub type PlayerId = String;

/// Server-assigned room identifier. Some games send it as a number, others as a string; it is
/// always held (and sent back) as a string.
#[derive(Debug, Hash, Eq, PartialEq, Clone)]
pub struct RoomId(pub String);

impl<'de> Deserialize<'de> for RoomId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => RoomId(text),
            Raw::Number(number) => RoomId(number.to_string()),
        })
    }
}
impl Serialize for RoomId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        RoomId(value.to_owned())
    }
}

// Outbound messages

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SocketRequest<T> {
    pub player_id: PlayerId,
    #[serde(flatten)]
    pub request: T,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "request_type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientRequest {
    // Matchmaking: let the server pick a room for this game
    JoinGameByType { game_type: GameType },
    // Join a room the player already knows about
    JoinGameById { room_id: RoomId },
    MakeMove {
        room_id: RoomId,
        #[serde(rename = "move")]
        value: Move,
    },
}

pub type Envelope = SocketRequest<ClientRequest>;

// Inbound messages

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Player {
    pub player_id: PlayerId,
    #[serde(default)]
    pub num_points: i64,
    #[serde(default)]
    pub num_cards: u32,
    // Tic-tac-toe cells claimed by this player
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selections: Option<Vec<u8>>,
    // Rock-paper-scissors: whether this player has locked in a selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

impl Player {
    pub fn new(player_id: impl Into<PlayerId>) -> Self {
        Player {
            player_id: player_id.into(),
            num_points: 0,
            num_cards: 0,
            selections: None,
            selected: None,
        }
    }
}

/// Lifecycle position of a chinese poker match, carried in the shared view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    StartGame,
    StartMatch,
    DealCards,
    StartRound,
    StartTurn,
    AwaitPlayerAction,
    EndTurn,
    EndRound,
    EndMatch,
    UpdatePoints,
    EndGame,
    Unrecognized(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::StartGame => "START_GAME",
            Status::StartMatch => "START_MATCH",
            Status::DealCards => "DEAL_CARDS",
            Status::StartRound => "START_ROUND",
            Status::StartTurn => "START_TURN",
            Status::AwaitPlayerAction => "AWAIT_PLAYER_ACTION",
            Status::EndTurn => "END_TURN",
            Status::EndRound => "END_ROUND",
            Status::EndMatch => "END_MATCH",
            Status::UpdatePoints => "UPDATE_POINTS",
            Status::EndGame => "END_GAME",
            Status::Unrecognized(other) => other,
        }
    }
}

impl From<&str> for Status {
    fn from(value: &str) -> Self {
        match value {
            "START_GAME" => Status::StartGame,
            "START_MATCH" => Status::StartMatch,
            "DEAL_CARDS" => Status::DealCards,
            "START_ROUND" => Status::StartRound,
            "START_TURN" => Status::StartTurn,
            "AWAIT_PLAYER_ACTION" => Status::AwaitPlayerAction,
            "END_TURN" => Status::EndTurn,
            "END_ROUND" => Status::EndRound,
            "END_MATCH" => Status::EndMatch,
            "UPDATE_POINTS" => Status::UpdatePoints,
            "END_GAME" => Status::EndGame,
            other => Status::Unrecognized(other.to_owned()),
        }
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Status::from(s.as_str()))
    }
}
impl Serialize for Status {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct RoundResult {
    #[serde(default)]
    pub winner: Option<PlayerId>,
}

/// Per-room broadcast view. Every game fills a different subset of these fields.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SharedView {
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub players: Option<Vec<Player>>,
    #[serde(default, alias = "current_player")]
    pub current_player_id: Option<PlayerId>,
    #[serde(default)]
    pub move_history: Option<Vec<Value>>,
    #[serde(default)]
    pub result: Option<RoundResult>,
    #[serde(default)]
    pub is_over: bool,
    #[serde(default)]
    pub winner: Option<PlayerId>,
}

/// State only the receiving player can see.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PrivateView {
    #[serde(default)]
    pub cards: Option<Vec<Card>>,
    #[serde(default)]
    pub selection: Option<Selection>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Error {
        error: String,
    },
    PlayerJoined {
        room_id: RoomId,
        player_ids: Vec<PlayerId>,
    },
    GameState {
        shared_view: Option<SharedView>,
        private_view: Option<PrivateView>,
    },
    // Well-formed envelope with a message type this client does not handle
    Unrecognized {
        message_type: String,
    },
}

#[derive(Deserialize)]
struct Frame {
    message_type: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorPayload {
    Text(String),
    Object { error: String },
}

#[derive(Deserialize)]
struct PlayerJoinedPayload {
    room_id: RoomId,
    #[serde(default)]
    player_ids: Vec<PlayerId>,
}

#[derive(Deserialize)]
struct GameStatePayload {
    #[serde(default)]
    shared_view: Option<SharedView>,
    #[serde(default)]
    private_view: Option<PrivateView>,
}

impl ServerMessage {
    /// Decode one inbound text frame. Unknown message types decode successfully as
    /// [`ServerMessage::Unrecognized`]; anything that is not a well-formed envelope is a
    /// protocol error.
    pub fn decode(text: &str) -> Result<Self> {
        let frame: Frame = serde_json::from_str(text)?;
        let message = match frame.message_type.as_str() {
            "ERROR" => {
                let error = match serde_json::from_value::<ErrorPayload>(frame.payload)? {
                    ErrorPayload::Text(error) | ErrorPayload::Object { error } => error,
                };
                ServerMessage::Error { error }
            }
            "PLAYER_JOINED" | "GAME_ROOM_UPDATE" => {
                let payload: PlayerJoinedPayload = serde_json::from_value(frame.payload)?;
                ServerMessage::PlayerJoined {
                    room_id: payload.room_id,
                    player_ids: payload.player_ids,
                }
            }
            "GAME_STATE" => {
                if !frame.payload.is_object() {
                    return Err(ClientError::Protocol(
                        "GAME_STATE payload must be an object".into(),
                    ));
                }
                let payload: GameStatePayload = serde_json::from_value(frame.payload)?;
                ServerMessage::GameState {
                    shared_view: payload.shared_view,
                    private_view: payload.private_view,
                }
            }
            _ => ServerMessage::Unrecognized {
                message_type: frame.message_type,
            },
        };
        Ok(message)
    }
}
