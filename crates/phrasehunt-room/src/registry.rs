//! Room registry: the code → room table.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tokio::sync::Mutex;

use crate::{GameServices, Room, RoomCode, RoomConfig};

/// Process-wide table of live rooms.
///
/// Constructed once at startup and shared by every connection. It is the
/// only place room codes are minted, and a code stays unique for as long as
/// its room is registered. Rooms unregister themselves when their last
/// player leaves.
pub struct RoomRegistry {
    /// Handed to each room so it can unregister itself.
    this: Weak<RoomRegistry>,
    config: RoomConfig,
    services: GameServices,
    rooms: Mutex<HashMap<RoomCode, Arc<Room>>>,
}

impl RoomRegistry {
    /// Creates an empty registry. Every room it creates shares `config` and
    /// `services`.
    pub fn new(config: RoomConfig, services: GameServices) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            config,
            services,
            rooms: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn services(&self) -> &GameServices {
        &self.services
    }

    /// Creates an empty room under a fresh random code.
    pub async fn create_room(&self) -> Arc<Room> {
        self.create_room_with(|| RoomCode::random(&mut rand::rng()))
            .await
    }

    /// Creates a room, drawing codes from `next_code` until one is free.
    ///
    /// Generation and insertion happen under the same lock, so two callers
    /// can never claim the same code.
    pub(crate) async fn create_room_with(
        &self,
        mut next_code: impl FnMut() -> RoomCode,
    ) -> Arc<Room> {
        let mut rooms = self.rooms.lock().await;
        let code = loop {
            let candidate = next_code();
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
            tracing::debug!(code = %candidate, "room code collision, regenerating");
        };

        let room = Room::new(
            code,
            self.this.clone(),
            self.config.clone(),
            self.services.clone(),
        );
        rooms.insert(code, Arc::clone(&room));
        tracing::info!(room = %code, rooms = rooms.len(), "room created");
        room
    }

    pub async fn lookup(&self, code: RoomCode) -> Option<Arc<Room>> {
        self.rooms.lock().await.get(&code).cloned()
    }

    /// Drops `code` from the table. Returns `false` if it was not there.
    pub async fn remove(&self, code: RoomCode) -> bool {
        let mut rooms = self.rooms.lock().await;
        let removed = rooms.remove(&code).is_some();
        if removed {
            tracing::info!(room = %code, rooms = rooms.len(), "room removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.rooms.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.lock().await.is_empty()
    }

    /// Codes of all live rooms, sorted.
    pub async fn codes(&self) -> Vec<RoomCode> {
        let mut codes: Vec<_> = self.rooms.lock().await.keys().copied().collect();
        codes.sort();
        codes
    }
}

impl std::fmt::Debug for RoomRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomRegistry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
