//! Per-connection handler: identification and message routing.
//!
//! Each accepted connection gets two Tokio tasks:
//!   1. this handler, the only code that reads the socket; it decodes
//!      lines and routes them to the registry or the room
//!   2. a writer that drains the connection's outbound queue onto the
//!      socket
//!
//! The connection ends on EOF, a read error, or the writer stopping. The
//! writer stops on a write failure, on a write that outlasts
//! `SessionConfig::write_timeout`, or once its queue is drained after the
//! registry pruned a slow connection. Either way the player is
//! unregistered and leaves the table.

use std::sync::Arc;
use std::time::Duration;

use drawpoker_protocol::{ClientMessage, Codec, Recipient, ServerMessage};
use drawpoker_session::{outbound_channel, Frame, Outbound};
use drawpoker_transport::{ConnectionId, LineConnection, LineWriter};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::DrawPokerError;

/// Where a connection is in its lifecycle.
enum Identity {
    /// No successful `hello` yet. The handler still owns the outbound
    /// sender so it can answer registration failures.
    Anonymous(Outbound),

    /// Registered. The registry owns the sender now.
    Named(String),
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: LineConnection,
    state: Arc<ServerState>,
) -> Result<(), DrawPokerError> {
    let conn_id = conn.id();
    tracing::info!(%conn_id, peer = %conn.peer_addr(), "client connected");

    let (mut reader, writer) = conn.into_split();
    let (outbound, queue) = outbound_channel(&state.session_config);
    let mut writer_task = tokio::spawn(write_loop(
        conn_id,
        writer,
        queue,
        state.session_config.write_timeout,
    ));
    let mut identity = Identity::Anonymous(outbound);

    let result = loop {
        tokio::select! {
            received = reader.recv() => match received {
                Ok(Some(data)) => {
                    let msg: ClientMessage = match state.codec.decode(&data) {
                        Ok(msg) => msg,
                        Err(e) => {
                            tracing::debug!(%conn_id, error = %e, "discarding undecodable line");
                            continue;
                        }
                    };
                    handle_message(&state, conn_id, &mut identity, msg).await;
                }
                Ok(None) => {
                    tracing::info!(%conn_id, "connection closed by client");
                    break Ok(());
                }
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "recv error");
                    break Err(DrawPokerError::from(e));
                }
            },
            _ = &mut writer_task => {
                tracing::info!(%conn_id, "writer stopped, closing connection");
                break Ok(());
            }
        }
    };

    // Dropping the identity drops any sender still held here; once the
    // registry's is gone too, the writer flushes its queue and closes.
    if let Identity::Named(nick) = identity {
        depart(&state, conn_id, nick).await;
    }
    result
}

/// Routes one decoded client message.
async fn handle_message(
    state: &ServerState,
    conn_id: ConnectionId,
    identity: &mut Identity,
    msg: ClientMessage,
) {
    let nick = match identity {
        Identity::Named(nick) => nick.clone(),
        Identity::Anonymous(outbound) => {
            match msg {
                ClientMessage::Hello { nick } => {
                    let outbound = outbound.clone();
                    if let Some(name) = hello(state, conn_id, &nick, outbound).await {
                        *identity = Identity::Named(name);
                    }
                }
                other => {
                    tracing::debug!(%conn_id, msg = ?other, "ignoring message before hello");
                }
            }
            return;
        }
    };

    match msg {
        ClientMessage::Hello { .. } => {
            let reply = ServerMessage::info(format!("You are already connected as {nick}."));
            if let Some(frame) = state.encode(&reply) {
                state.registry.lock().await.send_to(conn_id, &frame);
            }
        }
        ClientMessage::Chat { msg } => {
            let chat = ServerMessage::Chat { from: nick, msg };
            state.broadcast(&chat, None).await;
        }
        ClientMessage::JoinGame => {
            let mut room = state.room.lock().await;
            let out = match room.join(&nick) {
                Ok(out) => out,
                Err(e) => {
                    tracing::warn!(%conn_id, nick = %nick, error = %e, "join rejected");
                    vec![(Recipient::Player(nick), ServerMessage::info(format!("Cannot join: {e}.")))]
                }
            };
            state.dispatch(out).await;
        }
        ClientMessage::Draw { cards } => {
            let mut room = state.room.lock().await;
            let out = room.draw(&nick, &cards);
            state.dispatch(out).await;
        }
    }
}

/// Registers the connection under `nick`. On success announces the new
/// player and the table state; on failure tells only this connection why.
async fn hello(
    state: &ServerState,
    conn_id: ConnectionId,
    nick: &str,
    outbound: Outbound,
) -> Option<String> {
    let registered = state
        .registry
        .lock()
        .await
        .register(conn_id, nick, outbound.clone());

    match registered {
        Ok(name) => {
            let room = state.room.lock().await;
            state
                .dispatch(vec![
                    (Recipient::All, ServerMessage::info(format!("{name} connected."))),
                    (Recipient::All, room.state_message()),
                ])
                .await;
            Some(name)
        }
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "hello rejected");
            let reply = ServerMessage::info(format!("Cannot identify: {e}."));
            if let Some(frame) = state.encode(&reply) {
                // Not registered, so the registry cannot reach us.
                let _ = outbound.try_send(frame);
            }
            None
        }
    }
}

/// Removes a named player: unregister, announce, leave the table.
async fn depart(state: &ServerState, conn_id: ConnectionId, nick: String) {
    let mut room = state.room.lock().await;

    let still_ours = {
        let mut registry = state.registry.lock().await;
        registry.unregister(conn_id);
        // If the registry pruned us earlier, the name may already belong
        // to someone else who is now seated under it.
        !registry.contains_nick(&nick)
    };
    if !still_ours {
        tracing::info!(%conn_id, nick = %nick, "nickname reused, skipping table leave");
        return;
    }

    tracing::info!(%conn_id, nick = %nick, "player disconnected");
    let mut out = vec![(Recipient::All, ServerMessage::info(format!("{nick} left.")))];
    out.extend(room.leave(&nick));
    state.dispatch(out).await;
}

/// Drains the outbound queue onto the socket until every sender is gone,
/// a write fails, or a write takes longer than `write_timeout`.
async fn write_loop(
    conn_id: ConnectionId,
    mut writer: LineWriter,
    mut queue: mpsc::Receiver<Frame>,
    write_timeout: Duration,
) {
    while let Some(frame) = queue.recv().await {
        match tokio::time::timeout(write_timeout, writer.send(&frame)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "write failed");
                return;
            }
            Err(_) => {
                tracing::info!(%conn_id, "peer stopped reading, write timed out");
                return;
            }
        }
    }
    if let Err(e) = writer.close().await {
        tracing::debug!(%conn_id, error = %e, "shutdown failed");
    }
}
