//! Wire protocol for Phrase Hunt.
//!
//! Every message on the wire is a JSON object of the form
//! `{"event": <kind>, "data": <payload>}`:
//!
//! - [`ClientEvent`]: what a browser sends (navigate, join, submit a word)
//! - [`ServerEvent`]: what the server pushes back (`show_page`,
//!   `game_update`, `room_not_found`)
//! - [`Codec`] / [`JsonCodec`]: how those events become bytes
//!
//! ```text
//! Transport (bytes) → Protocol (events) → Room (state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{ClientEvent, GameUpdate, PlayerId, ServerEvent, Standing};
