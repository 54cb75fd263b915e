//! Error types for the room layer.

use phrasehunt_protocol::PlayerId;

use crate::{GamePhase, RoomCode};

/// Errors that can occur during room and game operations.
///
/// Most of these are "stale action" errors: the dispatcher logs them and
/// carries on. None of them is fatal to a connection on its own.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The string is not four characters from `[A-Z0-9]`.
    #[error("invalid room code {0:?}")]
    InvalidCode(String),

    /// The room lost its last player and was removed from the registry.
    #[error("room {0} is closed")]
    Closed(RoomCode),

    /// The player is already on this room's roster.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomCode),

    /// A game is already running in this room.
    #[error("room {0} already has a game in progress")]
    GameInProgress(RoomCode),

    /// The room has no active game.
    #[error("room {0} has no active game")]
    NoActiveGame(RoomCode),

    /// The game is not accepting submissions in its current phase.
    #[error("game is {0}, not running")]
    GameNotRunning(GamePhase),

    /// The player joined after the game started and has no record.
    #[error("player {0} has no record in this game")]
    NoRecord(PlayerId),

    /// The game phase machine was asked to move somewhere it can't go.
    #[error("invalid game transition from {from} to {to}")]
    InvalidTransition { from: GamePhase, to: GamePhase },

    /// The player's outbound queue stayed full for the whole send timeout.
    #[error("send to player {0} timed out")]
    SendTimedOut(PlayerId),

    /// The player's connection writer is gone.
    #[error("player {0} is disconnected")]
    Disconnected(PlayerId),
}

/// Errors a [`PageRenderer`](crate::PageRenderer) may report.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The renderer has no template for this page.
    #[error("missing template {0}")]
    MissingTemplate(&'static str),

    /// The template failed while rendering.
    #[error("template {template} failed: {reason}")]
    Template {
        template: &'static str,
        reason: String,
    },

    /// The view could not be serialized.
    #[error("view serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
