//! Read-only snapshots handed to the page renderer.

use phrasehunt_protocol::Standing;
use serde::Serialize;

use crate::RoomCode;

/// What a room page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomView {
    pub code: RoomCode,
    /// Display names in join order.
    pub players: Vec<String>,
    pub game_running: bool,
}

/// What the game page and the scoreboard fragment show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameView {
    pub room: RoomCode,
    pub phrase: String,
    pub seconds_left: u32,
    pub finished: bool,
    /// Leaderboard, highest score first.
    pub standings: Vec<Standing>,
}
