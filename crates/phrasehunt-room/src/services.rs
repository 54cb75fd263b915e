//! Pluggable collaborators: word validation, scoring, phrases and pages.
//!
//! Rooms reach these only through the traits below. Each is injected as an
//! `Arc<dyn _>` inside [`GameServices`], so a server can swap any one of
//! them without touching room logic.

use std::fmt;
use std::sync::Arc;

use serde_json::json;

use crate::{GameView, RenderError, RoomView};

// ---------------------------------------------------------------------------
// Word validation
// ---------------------------------------------------------------------------

/// Decides whether a submitted word counts for the current phrase.
pub trait WordValidator: Send + Sync + 'static {
    fn is_acceptable(&self, word: &str, phrase: &str) -> bool;
}

/// Accepts every submission.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl WordValidator for AcceptAll {
    fn is_acceptable(&self, _word: &str, _phrase: &str) -> bool {
        true
    }
}

/// Accepts a non-blank word that appears somewhere in the phrase,
/// ignoring case.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhraseSubstring;

impl WordValidator for PhraseSubstring {
    fn is_acceptable(&self, word: &str, phrase: &str) -> bool {
        if word.trim().is_empty() {
            return false;
        }
        phrase.to_lowercase().contains(&word.to_lowercase())
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Points awarded for an accepted word.
pub trait Scorer: Send + Sync + 'static {
    fn points_for(&self, word: &str) -> u32;
}

/// The same number of points for every word.
#[derive(Debug, Clone, Copy)]
pub struct FixedPoints(pub u32);

impl Default for FixedPoints {
    fn default() -> Self {
        Self(100)
    }
}

impl Scorer for FixedPoints {
    fn points_for(&self, _word: &str) -> u32 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Phrases
// ---------------------------------------------------------------------------

/// Supplies the target phrase for each new game.
pub trait PhraseSource: Send + Sync + 'static {
    fn next_phrase(&self) -> String;
}

/// Always hands out the same phrase.
#[derive(Debug, Clone)]
pub struct FixedPhrase(pub String);

impl Default for FixedPhrase {
    fn default() -> Self {
        Self("the cat in the hat is back".to_owned())
    }
}

impl PhraseSource for FixedPhrase {
    fn next_phrase(&self) -> String {
        self.0.clone()
    }
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// A page (or fragment) the client can be shown.
#[derive(Debug, Clone, Copy)]
pub enum Page<'a> {
    Home,
    JoinRoom,
    Room(&'a RoomView),
    Game(&'a GameView),
    /// The leaderboard fragment carried inside every `game_update`.
    Scoreboard(&'a GameView),
}

impl Page<'_> {
    /// Template identifier for this page.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::JoinRoom => "join_room",
            Self::Room(_) => "room",
            Self::Game(_) => "game",
            Self::Scoreboard(_) => "scoreboard",
        }
    }
}

/// Turns a page into the opaque string sent in `show_page` and
/// `game_update` payloads.
pub trait PageRenderer: Send + Sync + 'static {
    fn render(&self, page: Page<'_>) -> Result<String, RenderError>;
}

/// Renders every page as a JSON document: `{"page": <name>, "view": ...}`.
///
/// Useful for tests and headless clients; a real deployment plugs in an
/// HTML renderer instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl PageRenderer for JsonRenderer {
    fn render(&self, page: Page<'_>) -> Result<String, RenderError> {
        let value = match page {
            Page::Home | Page::JoinRoom => json!({ "page": page.name() }),
            Page::Room(view) => json!({ "page": page.name(), "view": view }),
            Page::Game(view) | Page::Scoreboard(view) => {
                json!({ "page": page.name(), "view": view })
            }
        };
        Ok(serde_json::to_string(&value)?)
    }
}

// ---------------------------------------------------------------------------
// GameServices
// ---------------------------------------------------------------------------

/// The collaborator set shared by every room of a registry.
#[derive(Clone)]
pub struct GameServices {
    pub validator: Arc<dyn WordValidator>,
    pub scorer: Arc<dyn Scorer>,
    pub phrases: Arc<dyn PhraseSource>,
    pub renderer: Arc<dyn PageRenderer>,
}

impl GameServices {
    pub fn with_validator(mut self, validator: impl WordValidator) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn with_scorer(mut self, scorer: impl Scorer) -> Self {
        self.scorer = Arc::new(scorer);
        self
    }

    pub fn with_phrases(mut self, phrases: impl PhraseSource) -> Self {
        self.phrases = Arc::new(phrases);
        self
    }

    pub fn with_renderer(mut self, renderer: impl PageRenderer) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    /// Renders `page`, degrading to an empty payload if the renderer fails.
    pub fn render_page(&self, page: Page<'_>) -> String {
        match self.renderer.render(page) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(page = page.name(), error = %e, "page render failed");
                String::new()
            }
        }
    }
}

impl Default for GameServices {
    fn default() -> Self {
        Self {
            validator: Arc::new(PhraseSubstring),
            scorer: Arc::new(FixedPoints::default()),
            phrases: Arc::new(FixedPhrase::default()),
            renderer: Arc::new(JsonRenderer),
        }
    }
}

impl fmt::Debug for GameServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameServices").finish_non_exhaustive()
    }
}
