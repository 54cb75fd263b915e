//! Session dispatcher: turns one player's client events into room actions.

use std::sync::Arc;

use phrasehunt_protocol::{ClientEvent, ServerEvent};
use phrasehunt_room::{GameServices, Page, Player, Room, RoomCode, RoomError};
use tracing::{debug, warn};

use crate::PhraseHuntError;
use crate::countdown;
use crate::server::ServerState;

/// Per-connection dispatcher owning the connection's [`Player`].
///
/// Events are handled one at a time, in arrival order. Only
/// [`PhraseHuntError::ProtocolViolation`] escapes [`dispatch`](Self::dispatch);
/// everything else is logged and the connection carries on.
pub(crate) struct Session {
    player: Arc<Player>,
    state: Arc<ServerState>,
}

impl Session {
    pub(crate) fn new(player: Arc<Player>, state: Arc<ServerState>) -> Self {
        Self { player, state }
    }

    pub(crate) fn player(&self) -> &Arc<Player> {
        &self.player
    }

    fn services(&self) -> &GameServices {
        self.state.registry.services()
    }

    pub(crate) async fn dispatch(&self, event: ClientEvent) -> Result<(), PhraseHuntError> {
        match event {
            ClientEvent::GetHome => {
                self.leave_room().await;
                self.show(Page::Home).await;
            }
            ClientEvent::StartGame => self.start_game().await?,
            ClientEvent::SubmitWord(word) => self.submit_word(&word).await,
            ClientEvent::GetRoom => self.create_room().await,
            ClientEvent::GetJoinRoom => self.show(Page::JoinRoom).await,
            ClientEvent::SubmitRoomCode(code) => self.join_room(&code).await,
            ClientEvent::SetName(name) => {
                debug!(player_id = %self.player.id(), %name, "name set");
                self.player.set_name(name);
            }
        }
        Ok(())
    }

    /// Takes the player out of its current room, if any.
    pub(crate) async fn leave_room(&self) {
        if let Some(room) = self.player.room() {
            room.remove_player(&self.player).await;
        }
    }

    async fn start_game(&self) -> Result<(), PhraseHuntError> {
        let Some(room) = self.player.room() else {
            return Err(PhraseHuntError::ProtocolViolation(
                "start_game outside a room".into(),
            ));
        };
        match room.start_game().await {
            Ok(game_id) => {
                countdown::spawn(room, game_id, self.state.config.tick_interval);
            }
            Err(e) => {
                debug!(player_id = %self.player.id(), room = %room.code(), error = %e, "start_game ignored");
            }
        }
        Ok(())
    }

    async fn submit_word(&self, word: &str) {
        let Some(room) = self.player.room() else {
            debug!(player_id = %self.player.id(), word, "submission outside a room ignored");
            return;
        };
        if let Err(e) = room.submit_word(&self.player, word).await {
            debug!(player_id = %self.player.id(), room = %room.code(), word, error = %e, "submission ignored");
        }
    }

    async fn create_room(&self) {
        self.leave_room().await;
        loop {
            let room = self.state.registry.create_room().await;
            match room.add_player(&self.player).await {
                Ok(()) => return,
                Err(RoomError::Closed(code)) => {
                    debug!(room = %code, "fresh room closed before join, creating another");
                }
                Err(e) => {
                    warn!(player_id = %self.player.id(), room = %room.code(), error = %e, "could not join new room");
                    return;
                }
            }
        }
    }

    async fn join_room(&self, code: &str) {
        let room = match RoomCode::parse(code) {
            Ok(code) => self.state.registry.lookup(code).await,
            Err(e) => {
                debug!(player_id = %self.player.id(), error = %e, "malformed room code");
                None
            }
        };
        let Some(room) = room else {
            self.send(ServerEvent::RoomNotFound).await;
            return;
        };

        let already_here = self
            .player
            .room()
            .is_some_and(|current| Arc::ptr_eq(&current, &room));
        if !already_here {
            self.leave_room().await;
            if let Err(e) = room.add_player(&self.player).await {
                debug!(player_id = %self.player.id(), room = %room.code(), error = %e, "join failed");
                self.send(ServerEvent::RoomNotFound).await;
                return;
            }
        }
        self.show_room(&room).await;
    }

    async fn show_room(&self, room: &Room) {
        let view = room.view().await;
        self.show(Page::Room(&view)).await;
    }

    async fn show(&self, page: Page<'_>) {
        let body = self.services().render_page(page);
        self.send(ServerEvent::ShowPage(body)).await;
    }

    async fn send(&self, event: ServerEvent) {
        let timeout = self.state.registry.config().send_timeout;
        if let Err(e) = self.player.deliver(event, timeout).await {
            warn!(player_id = %self.player.id(), error = %e, "reply not delivered");
        }
    }
}

#[cfg(test)]
mod tests {
    use phrasehunt_room::AcceptAll;
    use tokio::sync::mpsc;

    use super::*;
    use crate::ServerConfig;

    fn state() -> Arc<ServerState> {
        Arc::new(ServerState::new(
            ServerConfig::default(),
            GameServices::default().with_validator(AcceptAll),
        ))
    }

    fn session(state: &Arc<ServerState>) -> (Session, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(64);
        let player = Player::new(state.next_player_id(), tx);
        (Session::new(player, Arc::clone(state)), rx)
    }

    fn drain(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn page(event: &ServerEvent) -> serde_json::Value {
        match event {
            ServerEvent::ShowPage(body) => serde_json::from_str(body).unwrap(),
            other => panic!("expected show_page, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_home_shows_home_page() {
        let state = state();
        let (session, mut rx) = session(&state);
        session.dispatch(ClientEvent::GetHome).await.unwrap();
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(page(&events[0])["page"], "home");
    }

    #[tokio::test]
    async fn test_get_join_room_shows_prompt_without_state_change() {
        let state = state();
        let (session, mut rx) = session(&state);
        session.dispatch(ClientEvent::GetJoinRoom).await.unwrap();
        assert_eq!(page(&drain(&mut rx)[0])["page"], "join_room");
        assert!(session.player().room().is_none());
        assert!(state.registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_room_creates_and_joins() {
        let state = state();
        let (session, mut rx) = session(&state);
        session.dispatch(ClientEvent::GetRoom).await.unwrap();

        let room = session.player().room().unwrap();
        assert!(state.registry.lookup(room.code()).await.is_some());
        let events = drain(&mut rx);
        assert_eq!(page(&events[0])["view"]["code"], room.code().to_string());
    }

    #[tokio::test]
    async fn test_get_room_twice_leaves_the_first_room() {
        let state = state();
        let (session, _rx) = session(&state);
        session.dispatch(ClientEvent::GetRoom).await.unwrap();
        let first = session.player().room().unwrap().code();
        session.dispatch(ClientEvent::GetRoom).await.unwrap();

        assert!(state.registry.lookup(first).await.is_none());
        assert_eq!(state.registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_home_leaves_room() {
        let state = state();
        let (session, _rx) = session(&state);
        session.dispatch(ClientEvent::GetRoom).await.unwrap();
        let code = session.player().room().unwrap().code();

        session.dispatch(ClientEvent::GetHome).await.unwrap();
        assert!(session.player().room().is_none());
        assert!(state.registry.lookup(code).await.is_none());
    }

    #[tokio::test]
    async fn test_start_game_outside_room_is_violation() {
        let state = state();
        let (session, _rx) = session(&state);
        let err = session.dispatch(ClientEvent::StartGame).await.unwrap_err();
        assert!(matches!(err, PhraseHuntError::ProtocolViolation(_)));
    }

    #[tokio::test]
    async fn test_start_game_twice_is_ignored() {
        let state = state();
        let (session, _rx) = session(&state);
        session.dispatch(ClientEvent::GetRoom).await.unwrap();
        session.dispatch(ClientEvent::StartGame).await.unwrap();
        session.dispatch(ClientEvent::StartGame).await.unwrap();
        assert!(session.player().room().unwrap().has_active_game().await);
    }

    #[tokio::test]
    async fn test_submit_word_without_room_or_game_is_ignored() {
        let state = state();
        let (session, mut rx) = session(&state);
        session
            .dispatch(ClientEvent::SubmitWord("cat".into()))
            .await
            .unwrap();
        session.dispatch(ClientEvent::GetRoom).await.unwrap();
        drain(&mut rx);
        session
            .dispatch(ClientEvent::SubmitWord("cat".into()))
            .await
            .unwrap();
        assert!(drain(&mut rx).is_empty());
        assert_eq!(session.player().score(), 0);
    }

    #[tokio::test]
    async fn test_submit_word_scores_in_running_game() {
        let state = state();
        let (session, mut rx) = session(&state);
        session.dispatch(ClientEvent::GetRoom).await.unwrap();
        session.dispatch(ClientEvent::StartGame).await.unwrap();
        drain(&mut rx);

        session
            .dispatch(ClientEvent::SubmitWord("cat".into()))
            .await
            .unwrap();
        let events = drain(&mut rx);
        let [ServerEvent::GameUpdate(update)] = events.as_slice() else {
            panic!("expected one game update, got {events:?}");
        };
        assert_eq!(update.standings[0].score, 100);
        assert_eq!(session.player().score(), 100);
    }

    #[tokio::test]
    async fn test_submit_room_code_unknown_replies_not_found() {
        let state = state();
        let (session, mut rx) = session(&state);
        session
            .dispatch(ClientEvent::SubmitRoomCode("ZZZZ".into()))
            .await
            .unwrap();
        assert_eq!(drain(&mut rx), [ServerEvent::RoomNotFound]);
        assert!(session.player().room().is_none());
    }

    #[tokio::test]
    async fn test_submit_room_code_malformed_replies_not_found() {
        let state = state();
        let (session, mut rx) = session(&state);
        session
            .dispatch(ClientEvent::SubmitRoomCode("not a code".into()))
            .await
            .unwrap();
        assert_eq!(drain(&mut rx), [ServerEvent::RoomNotFound]);
    }

    #[tokio::test]
    async fn test_submit_room_code_joins_and_replies_with_room_page() {
        let state = state();
        let (host, _host_rx) = session(&state);
        let (guest, mut guest_rx) = session(&state);
        host.dispatch(ClientEvent::GetRoom).await.unwrap();
        let code = host.player().room().unwrap().code();

        guest
            .dispatch(ClientEvent::SubmitRoomCode(code.to_string()))
            .await
            .unwrap();

        let room = guest.player().room().unwrap();
        assert_eq!(room.code(), code);
        assert_eq!(room.player_count().await, 2);
        // Broadcast on join, then the direct reply.
        let events = drain(&mut guest_rx);
        assert_eq!(events.len(), 2);
        assert_eq!(page(&events[1])["page"], "room");
    }

    #[tokio::test]
    async fn test_submit_room_code_moves_player_between_rooms() {
        let state = state();
        let (host, _host_rx) = session(&state);
        let (mover, _mover_rx) = session(&state);
        host.dispatch(ClientEvent::GetRoom).await.unwrap();
        mover.dispatch(ClientEvent::GetRoom).await.unwrap();
        let old = mover.player().room().unwrap().code();
        let target = host.player().room().unwrap().code();

        mover
            .dispatch(ClientEvent::SubmitRoomCode(target.to_string()))
            .await
            .unwrap();

        assert_eq!(mover.player().room().unwrap().code(), target);
        assert!(state.registry.lookup(old).await.is_none());
    }

    #[tokio::test]
    async fn test_set_name_accepts_empty() {
        let state = state();
        let (session, _rx) = session(&state);
        session
            .dispatch(ClientEvent::SetName(String::new()))
            .await
            .unwrap();
        assert_eq!(session.player().name(), "");
    }

    #[tokio::test]
    async fn test_leave_room_without_room_is_noop() {
        let state = state();
        let (session, _rx) = session(&state);
        session.leave_room().await;
        assert!(session.player().room().is_none());
    }
}
