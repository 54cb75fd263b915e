//! Countdown driver: ticks a room's game on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use phrasehunt_room::{GameId, Room, TickOutcome};
use phrasehunt_tick::{TickConfig, TickScheduler};
use tokio::task::JoinHandle;

/// Spawns the countdown for game `game_id` in `room`.
///
/// The task stops on its own once the game ends or is no longer the
/// room's active game.
pub(crate) fn spawn(room: Arc<Room>, game_id: GameId, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(run(room, game_id, TickConfig::every(interval)))
}

pub(crate) async fn run(room: Arc<Room>, game_id: GameId, config: TickConfig) {
    let mut scheduler = TickScheduler::new(config);
    tracing::debug!(room = %room.code(), %game_id, interval = ?scheduler.interval(), "countdown started");

    loop {
        let info = scheduler.wait_for_tick().await;
        // A late wake-up still owes the game every second it missed.
        for _ in 0..=info.ticks_skipped {
            match room.tick(game_id).await {
                TickOutcome::Running { .. } => {}
                TickOutcome::Ended => {
                    tracing::debug!(room = %room.code(), %game_id, ticks = scheduler.tick_count(), "countdown finished");
                    return;
                }
                TickOutcome::Stale => {
                    tracing::debug!(room = %room.code(), %game_id, "game no longer active, countdown stopped");
                    return;
                }
            }
        }
        scheduler.record_tick_end();
    }
}

#[cfg(test)]
mod tests {
    use phrasehunt_protocol::{PlayerId, ServerEvent};
    use phrasehunt_room::{GameServices, Player, RoomConfig, RoomRegistry};
    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_countdown_runs_game_to_completion() {
        let registry = RoomRegistry::new(
            RoomConfig {
                game_duration: 3,
                ..RoomConfig::default()
            },
            GameServices::default(),
        );
        let (tx, mut rx) = mpsc::channel(64);
        let player = Player::new(PlayerId(1), tx);
        let room = registry.create_room().await;
        room.add_player(&player).await.unwrap();
        let game_id = room.start_game().await.unwrap();

        let start = tokio::time::Instant::now();
        spawn(Arc::clone(&room), game_id, Duration::from_secs(1))
            .await
            .unwrap();

        assert!(start.elapsed() >= Duration::from_secs(3));
        assert!(!room.has_active_game().await);

        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            if let ServerEvent::GameUpdate(update) = event {
                last = Some(update);
            }
        }
        let last = last.unwrap();
        assert!(last.finished);
        assert_eq!(last.seconds_left, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_stops_when_room_closes() {
        let registry = RoomRegistry::new(RoomConfig::default(), GameServices::default());
        let (tx, _rx) = mpsc::channel(64);
        let player = Player::new(PlayerId(1), tx);
        let room = registry.create_room().await;
        room.add_player(&player).await.unwrap();
        let game_id = room.start_game().await.unwrap();

        let handle = spawn(Arc::clone(&room), game_id, Duration::from_secs(1));
        room.remove_player(&player).await;

        let start = tokio::time::Instant::now();
        handle.await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
