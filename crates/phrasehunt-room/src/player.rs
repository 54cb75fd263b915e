//! A connected participant.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::time::Duration;

use phrasehunt_protocol::{PlayerId, ServerEvent};
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio::sync::{Notify, mpsc};
use tracing::warn;

use crate::{Room, RoomError};

/// Bounded channel carrying events to a player's connection writer.
pub type PlayerSender = mpsc::Sender<ServerEvent>;

/// Name given to players who never sent `set_name`.
const DEFAULT_NAME: &str = "user";

/// One connected participant.
///
/// Shared as `Arc<Player>` between the player's own session, the roster of
/// the room they are in, and the game records that mention them. The
/// session is the only writer of the name; rooms are the only writers of
/// the room reference; games are the only writers of the score.
///
/// A player whose outbox stops draining is marked unresponsive. Broadcasts
/// skip it from then on, and its connection handler is woken to tear the
/// connection down.
#[derive(Debug)]
pub struct Player {
    id: PlayerId,
    name: RwLock<String>,
    score: AtomicU64,
    room: Mutex<Weak<Room>>,
    outbox: PlayerSender,
    unresponsive: AtomicBool,
    severed: Notify,
}

impl Player {
    /// Creates a player with the default name, zero score and no room.
    pub fn new(id: PlayerId, outbox: PlayerSender) -> Arc<Self> {
        Arc::new(Self {
            id,
            name: RwLock::new(DEFAULT_NAME.to_owned()),
            score: AtomicU64::new(0),
            room: Mutex::new(Weak::new()),
            outbox,
            unresponsive: AtomicBool::new(false),
            severed: Notify::new(),
        })
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Current display name.
    pub fn name(&self) -> String {
        self.name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the display name. Any string is accepted, including "".
    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write().unwrap_or_else(PoisonError::into_inner) = name.into();
    }

    /// Total points earned across all games this connection played.
    pub fn score(&self) -> u64 {
        self.score.load(Ordering::Relaxed)
    }

    pub(crate) fn add_score(&self, points: u64) {
        self.score.fetch_add(points, Ordering::Relaxed);
    }

    /// The room this player is in, if it is still alive.
    pub fn room(&self) -> Option<Arc<Room>> {
        self.room
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .upgrade()
    }

    pub(crate) fn set_room(&self, room: &Arc<Room>) {
        *self.room.lock().unwrap_or_else(PoisonError::into_inner) = Arc::downgrade(room);
    }

    /// Clears the room reference if it still points at `room`.
    pub(crate) fn clear_room(&self, room: &Room) {
        let mut current = self.room.lock().unwrap_or_else(PoisonError::into_inner);
        if std::ptr::eq(current.as_ptr(), room) {
            *current = Weak::new();
        }
    }

    /// `true` once a delivery timed out or found the connection gone.
    pub fn is_unresponsive(&self) -> bool {
        self.unresponsive.load(Ordering::Acquire)
    }

    /// Stops all further deliveries and wakes whoever waits in
    /// [`Player::unresponsive`]. Idempotent.
    pub fn mark_unresponsive(&self) {
        if !self.unresponsive.swap(true, Ordering::AcqRel) {
            warn!(player_id = %self.id, "player marked unresponsive");
            self.severed.notify_one();
        }
    }

    /// Resolves once the player has been marked unresponsive.
    pub async fn unresponsive(&self) {
        if self.is_unresponsive() {
            return;
        }
        // notify_one stores a permit if the mark lands before this wait.
        self.severed.notified().await;
    }

    /// Queues an event for this player's connection, waiting at most
    /// `timeout` for space in the queue.
    ///
    /// A timeout or a closed outbox marks the player unresponsive, and every
    /// later delivery fails at once with [`RoomError::Disconnected`].
    pub async fn deliver(&self, event: ServerEvent, timeout: Duration) -> Result<(), RoomError> {
        if self.is_unresponsive() {
            return Err(RoomError::Disconnected(self.id));
        }
        let result = self
            .outbox
            .send_timeout(event, timeout)
            .await
            .map_err(|e| match e {
                SendTimeoutError::Timeout(_) => RoomError::SendTimedOut(self.id),
                SendTimeoutError::Closed(_) => RoomError::Disconnected(self.id),
            });
        if result.is_err() {
            self.mark_unresponsive();
        }
        result
    }
}
