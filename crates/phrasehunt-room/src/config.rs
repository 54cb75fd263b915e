//! Room configuration and the game phase machine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Settings shared by every room a registry creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Countdown length of a game, in ticks.
    pub game_duration: u32,

    /// Whether a player may score the same word more than once.
    pub duplicate_words: DuplicateWords,

    /// Upper bound on how long a broadcast waits for one player's
    /// outbound queue before giving up on that player.
    pub send_timeout: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            game_duration: 15,
            duplicate_words: DuplicateWords::default(),
            send_timeout: Duration::from_secs(2),
        }
    }
}

/// Policy for a player re-submitting a word they already scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateWords {
    /// Every acceptance counts, repeats included.
    #[default]
    Allow,
    /// A word already in the player's record is rejected.
    Reject,
}

// ---------------------------------------------------------------------------
// GamePhase
// ---------------------------------------------------------------------------

/// The lifecycle phase of a game.
///
/// ```text
/// NotStarted → Running → Ended
/// ```
///
/// Words are accepted only while `Running`. There is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    NotStarted,
    Running,
    Ended,
}

impl GamePhase {
    /// Returns the phase that follows this one, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::NotStarted => Some(Self::Running),
            Self::Running => Some(Self::Ended),
            Self::Ended => None,
        }
    }

    /// Returns `true` if moving to `target` is a valid single step.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }

    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NotStarted"),
            Self::Running => write!(f, "Running"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}
