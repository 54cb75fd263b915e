//! Server configuration.

use std::time::Duration;

use phrasehunt_room::RoomConfig;
use serde::{Deserialize, Serialize};

/// Settings for a [`PhraseHuntServer`](crate::PhraseHuntServer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// Settings shared by every room.
    pub room: RoomConfig,

    /// Time between countdown ticks.
    pub tick_interval: Duration,

    /// Capacity of each player's outbound queue.
    pub outbox_capacity: usize,

    /// Drop a connection that sends nothing for this long. `None` keeps
    /// idle connections open.
    pub idle_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_owned(),
            room: RoomConfig::default(),
            tick_interval: Duration::from_secs(1),
            outbox_capacity: 64,
            idle_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.outbox_capacity, 64);
        assert!(config.idle_timeout.is_none());
        assert_eq!(config.room.game_duration, 15);
    }
}
