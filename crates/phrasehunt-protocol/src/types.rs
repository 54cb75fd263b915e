//! Event types for the Phrase Hunt wire format.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A unique identifier for a connected player.
///
/// Allocated by the server when a connection opens; never reused within a
/// process. Serializes as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// An event sent by a client.
///
/// One variant per event kind, each carrying its own payload, so the
/// dispatcher is a single exhaustive `match`.
///
/// Decoding goes through a loose `{event, data}` shape rather than serde's adjacently
/// tagged representation: browsers routinely attach an empty `data` to
/// navigation events, and the older `GET_*` kind names are still accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
#[serde(try_from = "RawClientEvent")]
pub enum ClientEvent {
    /// Navigate to the home page, leaving any room.
    GetHome,
    /// Start a game in the current room.
    StartGame,
    /// Submit a word for the running game.
    SubmitWord(String),
    /// Create a new room and join it.
    GetRoom,
    /// Show the join-room prompt.
    GetJoinRoom,
    /// Join the room with the given code.
    SubmitRoomCode(String),
    /// Change the display name.
    SetName(String),
}

impl ClientEvent {
    /// The wire name of this event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GetHome => "get_home",
            Self::StartGame => "start_game",
            Self::SubmitWord(_) => "submit_word",
            Self::GetRoom => "get_room",
            Self::GetJoinRoom => "get_join_room",
            Self::SubmitRoomCode(_) => "submit_room_code",
            Self::SetName(_) => "set_name",
        }
    }
}

/// The untyped shape every client event arrives in.
#[derive(Debug, Deserialize)]
struct RawClientEvent {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl TryFrom<RawClientEvent> for ClientEvent {
    type Error = ProtocolError;

    fn try_from(raw: RawClientEvent) -> Result<Self, Self::Error> {
        let event = match raw.event.as_str() {
            "get_home" | "GET_home" => Self::GetHome,
            "start_game" => Self::StartGame,
            "submit_word" => Self::SubmitWord(text(raw.data, "submit_word")?),
            "get_room" | "GET_room" => Self::GetRoom,
            "get_join_room" | "GET_join_room" => Self::GetJoinRoom,
            "submit_room_code" => {
                Self::SubmitRoomCode(text(raw.data, "submit_room_code")?)
            }
            "set_name" => Self::SetName(text(raw.data, "set_name")?),
            _ => return Err(ProtocolError::UnknownEvent(raw.event)),
        };
        Ok(event)
    }
}

fn text(data: serde_json::Value, event: &'static str) -> Result<String, ProtocolError> {
    match data {
        serde_json::Value::String(s) => Ok(s),
        _ => Err(ProtocolError::InvalidPayload {
            event,
            expected: "a string",
        }),
    }
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// An event pushed to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Replace the visible page with this rendered fragment.
    ShowPage(String),
    /// Countdown and scoreboard snapshot for the running game.
    GameUpdate(GameUpdate),
    /// The submitted room code matched no live room.
    RoomNotFound,
}

impl ServerEvent {
    /// The wire name of this event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ShowPage(_) => "show_page",
            Self::GameUpdate(_) => "game_update",
            Self::RoomNotFound => "room_not_found",
        }
    }
}

/// Payload of a `game_update` event.
///
/// Field names are PascalCase on the wire, matching what existing clients
/// read (`SecondsLeft`, `RecordInfo`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GameUpdate {
    /// Countdown ticks remaining.
    pub seconds_left: u32,
    /// Rendered scoreboard fragment.
    pub record_info: String,
    /// The leaderboard, highest score first.
    #[serde(default)]
    pub standings: Vec<Standing>,
    /// `true` on the final update of a game.
    #[serde(default)]
    pub finished: bool,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Standing {
    pub name: String,
    pub score: u64,
    pub words: Vec<String>,
}
