//! # Phrase Hunt
//!
//! A multiplayer word game server. Players gather in rooms identified by
//! four-character codes, and race to find words hidden in a phrase before a
//! countdown runs out.
//!
//! The crate ties the layers together:
//! transport (bytes) → protocol (events) → room (state) → session (dispatch).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use phrasehunt::prelude::*;
//!
//! # async fn start() -> Result<(), PhraseHuntError> {
//! let server = PhraseHuntServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .validator(AcceptAll)
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod countdown;
mod error;
mod handler;
mod server;
mod session;

pub use config::ServerConfig;
pub use error::PhraseHuntError;
pub use server::{PhraseHuntServer, PhraseHuntServerBuilder};

/// Everything needed to configure and run a server.
pub mod prelude {
    pub use crate::{PhraseHuntError, PhraseHuntServer, PhraseHuntServerBuilder, ServerConfig};
    pub use phrasehunt_protocol::{ClientEvent, GameUpdate, PlayerId, ServerEvent, Standing};
    pub use phrasehunt_room::{
        AcceptAll, DuplicateWords, FixedPhrase, FixedPoints, GameServices, GameView,
        JsonRenderer, Page, PageRenderer, PhraseSource, PhraseSubstring, RenderError,
        RoomConfig, RoomView, Scorer, WordValidator,
    };
    pub use phrasehunt_tick::{TickConfig, TickPolicy};
}
