//! Room and game orchestration for Phrase Hunt.
//!
//! Many connection tasks mutate the same rooms concurrently. Shared state is
//! guarded by exactly two kinds of lock:
//!
//! - one [`tokio::sync::Mutex`] around the [`RoomRegistry`] map, and
//! - one per [`Room`], covering its roster, its active [`Game`] and the
//!   game's leaderboard together.
//!
//! The only nesting is room → registry, when the last player leaves and the
//! room unregisters itself. No code path holds two room locks.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: code → room table; the only place codes are minted
//! - [`Room`]: roster, active game, broadcasts
//! - [`Game`] / [`Record`]: countdown, phrase, leaderboard
//! - [`Player`]: name, score, current room, outbound channel
//! - [`GameServices`]: the pluggable validator, scorer, phrase source and
//!   page renderer

mod code;
mod config;
mod error;
mod game;
mod player;
mod registry;
mod room;
mod services;
mod view;

pub use code::RoomCode;
pub use config::{DuplicateWords, GamePhase, RoomConfig};
pub use error::{RenderError, RoomError};
pub use game::{Game, GameId, Record, Rejection, SubmitOutcome};
pub use player::{Player, PlayerSender};
pub use registry::RoomRegistry;
pub use room::{Departure, Room, TickOutcome};
pub use services::{
    AcceptAll, FixedPhrase, FixedPoints, GameServices, JsonRenderer, Page,
    PageRenderer, PhraseSource, PhraseSubstring, Scorer, WordValidator,
};
pub use view::{GameView, RoomView};
