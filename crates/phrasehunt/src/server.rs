//! `PhraseHuntServer` builder and accept loop.
//!
//! This is the entry point for running a Phrase Hunt server. It ties
//! together the layers: transport → protocol → room → session.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use phrasehunt_protocol::{JsonCodec, PlayerId};
use phrasehunt_room::{
    GameServices, PageRenderer, PhraseSource, RoomRegistry, Scorer, WordValidator,
};
use phrasehunt_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{PhraseHuntError, ServerConfig};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) registry: Arc<RoomRegistry>,
    pub(crate) config: ServerConfig,
    pub(crate) codec: JsonCodec,
    next_player_id: AtomicU64,
}

impl ServerState {
    pub(crate) fn new(config: ServerConfig, services: GameServices) -> Self {
        Self {
            registry: RoomRegistry::new(config.room.clone(), services),
            config,
            codec: JsonCodec,
            next_player_id: AtomicU64::new(1),
        }
    }

    pub(crate) fn next_player_id(&self) -> PlayerId {
        PlayerId(self.next_player_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// Builder for configuring and starting a Phrase Hunt server.
///
/// Every collaborator has a default; override only what you need.
pub struct PhraseHuntServerBuilder {
    config: ServerConfig,
    services: GameServices,
}

impl PhraseHuntServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            services: GameServices::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_owned();
        self
    }

    /// Replaces the whole configuration, bind address included.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn validator(mut self, validator: impl WordValidator) -> Self {
        self.services = self.services.with_validator(validator);
        self
    }

    pub fn scorer(mut self, scorer: impl Scorer) -> Self {
        self.services = self.services.with_scorer(scorer);
        self
    }

    pub fn phrases(mut self, phrases: impl PhraseSource) -> Self {
        self.services = self.services.with_phrases(phrases);
        self
    }

    pub fn renderer(mut self, renderer: impl PageRenderer) -> Self {
        self.services = self.services.with_renderer(renderer);
        self
    }

    /// Binds the listener and builds the server.
    pub async fn build(self) -> Result<PhraseHuntServer, PhraseHuntError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;
        let state = Arc::new(ServerState::new(self.config, self.services));
        Ok(PhraseHuntServer { transport, state })
    }
}

impl Default for PhraseHuntServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Phrase Hunt server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct PhraseHuntServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl PhraseHuntServer {
    pub fn builder() -> PhraseHuntServerBuilder {
        PhraseHuntServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The room registry every connection shares.
    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.state.registry
    }

    /// Runs the accept loop, spawning a handler task per connection. Runs
    /// until the process is terminated.
    pub async fn run(mut self) -> Result<(), PhraseHuntError> {
        tracing::info!(addr = %self.state.config.bind_addr, "phrase hunt server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
