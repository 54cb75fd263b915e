//! A room: its roster, its active game and its broadcasts.
//!
//! Everything mutable lives in one `RoomInner` behind one Tokio mutex.
//! Joins, leaves, submissions and countdown ticks all take that lock, and
//! broadcasts run while it is held so every member sees the same snapshot.

use std::fmt;
use std::sync::{Arc, Weak};

use futures_util::future::join_all;
use phrasehunt_protocol::{GameUpdate, ServerEvent};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    Game, GameId, GamePhase, GameServices, GameView, Page, Player, RoomCode, RoomConfig,
    RoomError, RoomRegistry, RoomView, SubmitOutcome,
};

/// What happened when a player was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    /// The player was not on the roster.
    NotMember,
    /// The player left; others remain.
    Left { remaining: usize },
    /// The player was the last one; the room is closed and unregistered.
    RoomClosed,
}

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running { seconds_left: u32 },
    /// The countdown hit zero; final standings were broadcast.
    Ended,
    /// The tick belongs to a game that is no longer active.
    Stale,
}

struct RoomInner {
    players: Vec<Arc<Player>>,
    game: Option<Game>,
    closed: bool,
}

/// A named group of players sharing at most one game.
pub struct Room {
    code: RoomCode,
    registry: Weak<RoomRegistry>,
    config: RoomConfig,
    services: GameServices,
    inner: Mutex<RoomInner>,
}

impl Room {
    pub(crate) fn new(
        code: RoomCode,
        registry: Weak<RoomRegistry>,
        config: RoomConfig,
        services: GameServices,
    ) -> Arc<Self> {
        Arc::new(Self {
            code,
            registry,
            config,
            services,
            inner: Mutex::new(RoomInner {
                players: Vec::new(),
                game: None,
                closed: false,
            }),
        })
    }

    pub fn code(&self) -> RoomCode {
        self.code
    }

    /// Adds `player` to the roster and broadcasts the room page to
    /// everyone, the newcomer included.
    ///
    /// Fails with [`RoomError::AlreadyInRoom`] while `player` is still a
    /// member of this or any other live room; callers leave first.
    pub async fn add_player(self: &Arc<Self>, player: &Arc<Player>) -> Result<(), RoomError> {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return Err(RoomError::Closed(self.code));
        }
        if inner.players.iter().any(|p| p.id() == player.id()) {
            return Err(RoomError::AlreadyInRoom(player.id(), self.code));
        }
        if let Some(current) = player.room() {
            return Err(RoomError::AlreadyInRoom(player.id(), current.code()));
        }

        inner.players.push(Arc::clone(player));
        player.set_room(self);
        info!(room = %self.code, player_id = %player.id(), players = inner.players.len(), "player joined");

        let page = self.room_page(&inner);
        self.send_all(&inner.players, ServerEvent::ShowPage(page)).await;
        Ok(())
    }

    /// Removes `player` if present.
    ///
    /// When the roster empties, the room closes itself: the active game is
    /// dropped and the code is released from the registry. Otherwise the
    /// remaining members get the updated room page. A departing player's
    /// record stays on the leaderboard.
    pub async fn remove_player(&self, player: &Player) -> Departure {
        let mut inner = self.inner.lock().await;
        let Some(pos) = inner.players.iter().position(|p| p.id() == player.id()) else {
            debug!(room = %self.code, player_id = %player.id(), "remove of non-member ignored");
            return Departure::NotMember;
        };
        inner.players.remove(pos);
        player.clear_room(self);
        info!(room = %self.code, player_id = %player.id(), players = inner.players.len(), "player left");

        if inner.players.is_empty() {
            inner.closed = true;
            if let Some(game) = inner.game.take() {
                info!(room = %self.code, game_id = %game.id(), "game abandoned");
            }
            // Lock order: room, then registry.
            if let Some(registry) = self.registry.upgrade() {
                registry.remove(self.code).await;
            }
            return Departure::RoomClosed;
        }

        let remaining = inner.players.len();
        let page = self.room_page(&inner);
        self.send_all(&inner.players, ServerEvent::ShowPage(page)).await;
        Departure::Left { remaining }
    }

    /// Starts a game with everyone currently in the room.
    ///
    /// Broadcasts the game page and then an initial `game_update`. Returns
    /// the id the countdown must tick with.
    pub async fn start_game(&self) -> Result<GameId, RoomError> {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return Err(RoomError::Closed(self.code));
        }
        if inner.game.is_some() {
            return Err(RoomError::GameInProgress(self.code));
        }

        let mut game = Game::new(
            self.code,
            self.services.phrases.next_phrase(),
            self.config.game_duration,
            self.config.duplicate_words,
        );
        game.start(&inner.players)?;
        let id = game.id();
        let view = game.view();
        inner.game = Some(game);
        info!(room = %self.code, game_id = %id, players = inner.players.len(), "game started");

        let page = self.services.render_page(Page::Game(&view));
        self.send_all(&inner.players, ServerEvent::ShowPage(page)).await;
        self.send_all(&inner.players, self.game_update(&view)).await;
        Ok(id)
    }

    /// Submits `word` on behalf of `player` to the active game.
    ///
    /// Accepted words trigger a `game_update` broadcast; rejected words are
    /// silent.
    pub async fn submit_word(
        &self,
        player: &Player,
        word: &str,
    ) -> Result<SubmitOutcome, RoomError> {
        let mut inner = self.inner.lock().await;
        let game = inner
            .game
            .as_mut()
            .ok_or(RoomError::NoActiveGame(self.code))?;
        let outcome = game.submit_word(
            word,
            player,
            self.services.validator.as_ref(),
            self.services.scorer.as_ref(),
        )?;

        match outcome {
            SubmitOutcome::Accepted { points, total } => {
                debug!(room = %self.code, player_id = %player.id(), word, points, total, "word accepted");
                let update = self.game_update(&game.view());
                self.send_all(&inner.players, update).await;
            }
            SubmitOutcome::Rejected(reason) => {
                debug!(room = %self.code, player_id = %player.id(), word, ?reason, "word rejected");
            }
        }
        Ok(outcome)
    }

    /// Advances the countdown of game `game_id` and broadcasts the result.
    ///
    /// When the countdown runs out the final standings go out with
    /// `finished` set and the game is cleared from the room.
    pub async fn tick(&self, game_id: GameId) -> TickOutcome {
        let mut inner = self.inner.lock().await;
        let Some(game) = inner.game.as_mut().filter(|g| g.id() == game_id) else {
            return TickOutcome::Stale;
        };

        let phase = game.tick();
        let view = game.view();
        let update = self.game_update(&view);
        let outcome = if phase == GamePhase::Ended {
            inner.game = None;
            info!(room = %self.code, %game_id, "game ended");
            TickOutcome::Ended
        } else {
            TickOutcome::Running {
                seconds_left: view.seconds_left,
            }
        };
        self.send_all(&inner.players, update).await;
        outcome
    }

    /// Sends `event` to every member.
    pub async fn broadcast(&self, event: ServerEvent) {
        let inner = self.inner.lock().await;
        self.send_all(&inner.players, event).await;
    }

    pub async fn view(&self) -> RoomView {
        let inner = self.inner.lock().await;
        Self::room_view(self.code, &inner)
    }

    /// Snapshot of the active game, if any.
    pub async fn game_view(&self) -> Option<GameView> {
        self.inner.lock().await.game.as_ref().map(Game::view)
    }

    pub async fn player_count(&self) -> usize {
        self.inner.lock().await.players.len()
    }

    pub async fn has_active_game(&self) -> bool {
        self.inner.lock().await.game.is_some()
    }

    /// `true` once the last player has left.
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.closed
    }

    fn room_view(code: RoomCode, inner: &RoomInner) -> RoomView {
        RoomView {
            code,
            players: inner.players.iter().map(|p| p.name()).collect(),
            game_running: inner.game.is_some(),
        }
    }

    fn room_page(&self, inner: &RoomInner) -> String {
        let view = Self::room_view(self.code, inner);
        self.services.render_page(Page::Room(&view))
    }

    fn game_update(&self, view: &GameView) -> ServerEvent {
        ServerEvent::GameUpdate(GameUpdate {
            seconds_left: view.seconds_left,
            record_info: self.services.render_page(Page::Scoreboard(view)),
            standings: view.standings.clone(),
            finished: view.finished,
        })
    }

    /// Delivers to every responsive player concurrently. Each delivery is
    /// bounded by the send timeout; a player that misses it is marked
    /// unresponsive and skipped by every later broadcast.
    async fn send_all(&self, players: &[Arc<Player>], event: ServerEvent) {
        let kind = event.kind();
        let timeout = self.config.send_timeout;
        let sends = players.iter().filter(|p| !p.is_unresponsive()).map(|player| {
            let event = event.clone();
            async move {
                if let Err(e) = player.deliver(event, timeout).await {
                    warn!(room = %self.code, player_id = %player.id(), event = kind, error = %e, "broadcast delivery failed");
                }
            }
        });
        join_all(sends).await;
    }
}

impl fmt::Debug for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Room")
            .field("code", &self.code)
            .finish_non_exhaustive()
    }
}
