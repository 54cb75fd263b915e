//! Per-connection handler: outbox writer, read loop and cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Allocate a player and its bounded outbox
//!   2. Spawn a writer task draining the outbox into the socket
//!   3. Loop: receive events → decode → dispatch through the session
//!   4. On exit, take the player out of its room and stop the writer
//!
//! The read loop also ends when the player is marked unresponsive, either
//! by a room broadcast that timed out or by the writer failing to flush a
//! frame within the send timeout.

use std::sync::Arc;
use std::time::Duration;

use phrasehunt_protocol::{ClientEvent, Codec, JsonCodec, ServerEvent};
use phrasehunt_room::Player;
use phrasehunt_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::PhraseHuntError;
use crate::server::ServerState;
use crate::session::Session;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), PhraseHuntError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let player_id = state.next_player_id();

    let (outbox_tx, outbox_rx) = mpsc::channel(state.config.outbox_capacity.max(1));
    let player = Player::new(player_id, outbox_tx);
    tracing::info!(%conn_id, %player_id, "player connected");

    let send_timeout = state.registry.config().send_timeout;
    let writer = tokio::spawn(write_outbox(
        Arc::clone(&conn),
        Arc::clone(&player),
        outbox_rx,
        state.codec,
        send_timeout,
    ));
    let session = Session::new(player, Arc::clone(&state));

    let result = read_loop(&conn, &state, &session).await;
    if let Err(PhraseHuntError::ProtocolViolation(reason)) = &result {
        tracing::warn!(%player_id, %reason, "dropping misbehaving client");
    }

    // No room may keep a player whose connection is gone.
    session.leave_room().await;
    writer.abort();
    if let Err(e) = conn.close().await {
        tracing::debug!(%player_id, error = %e, "close failed");
    }
    tracing::info!(%conn_id, %player_id, "player disconnected");
    result
}

/// Receives and dispatches events until the client goes away.
async fn read_loop(
    conn: &WebSocketConnection,
    state: &ServerState,
    session: &Session,
) -> Result<(), PhraseHuntError> {
    let player = session.player();
    let player_id = player.id();

    loop {
        let next = async {
            match state.config.idle_timeout {
                Some(limit) => tokio::time::timeout(limit, conn.recv()).await.ok(),
                None => Some(conn.recv().await),
            }
        };
        let received = tokio::select! {
            received = next => match received {
                Some(received) => received,
                None => {
                    tracing::info!(%player_id, "connection idle, closing");
                    return Ok(());
                }
            },
            () = player.unresponsive() => {
                tracing::info!(%player_id, "player unresponsive, closing");
                return Ok(());
            }
        };

        let data = match received {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%player_id, "connection closed cleanly");
                return Ok(());
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                return Err(e.into());
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "ignoring undecodable event");
                continue;
            }
        };

        tracing::debug!(%player_id, event = event.kind(), "event received");
        session.dispatch(event).await?;
    }
}

/// Drains the player's outbox into the socket, in order.
///
/// Each frame must be flushed within `send_timeout`; a peer that stops
/// reading gets the player marked unresponsive.
async fn write_outbox(
    conn: Arc<WebSocketConnection>,
    player: Arc<Player>,
    mut outbox: mpsc::Receiver<ServerEvent>,
    codec: JsonCodec,
    send_timeout: Duration,
) {
    let conn_id = conn.id();
    while let Some(event) = outbox.recv().await {
        let bytes = match codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, event = event.kind(), error = %e, "encode failed");
                continue;
            }
        };
        match tokio::time::timeout(send_timeout, conn.send(&bytes)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "send failed, stopping writer");
                break;
            }
            Err(_) => {
                tracing::warn!(%conn_id, "socket send timed out, stopping writer");
                break;
            }
        }
    }
    player.mark_unresponsive();
}
