//! `DrawPokerServer` builder and server loop.
//!
//! This is the entry point for running a drawpoker server. It ties
//! together all the layers: transport → protocol → session → room.

use std::sync::Arc;

use drawpoker_protocol::{Codec, JsonCodec, Recipient, ServerMessage};
use drawpoker_room::{GameRoom, Outbox, RoomConfig};
use drawpoker_session::{Frame, Registry, SessionConfig};
use drawpoker_transport::{ConnectionId, TcpLineTransport, Transport, DEFAULT_MAX_FRAME_LEN};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{DrawPokerError, ServerConfig};

/// Shared server state passed to each connection handler task.
///
/// Lock order is always `room` before `registry`. Chat takes only the
/// registry lock.
pub(crate) struct ServerState {
    pub(crate) registry: Mutex<Registry>,
    pub(crate) room: Mutex<GameRoom>,
    pub(crate) codec: JsonCodec,
    pub(crate) session_config: SessionConfig,
}

impl ServerState {
    pub(crate) fn encode(&self, msg: &ServerMessage) -> Option<Frame> {
        match self.codec.encode(msg) {
            Ok(bytes) => Some(Frame::from(bytes)),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode server message");
                None
            }
        }
    }

    /// Delivers room output in order. Callers still holding the room lock
    /// keep room messages totally ordered.
    pub(crate) async fn dispatch(&self, out: Outbox) {
        if out.is_empty() {
            return;
        }
        let mut registry = self.registry.lock().await;
        for (recipient, msg) in out {
            let Some(frame) = self.encode(&msg) else {
                continue;
            };
            match recipient {
                Recipient::All => {
                    registry.broadcast(&frame, None);
                }
                Recipient::Player(nick) => {
                    registry.send_to_nick(&nick, &frame);
                }
            }
        }
    }

    /// Encodes `msg` once and enqueues it for everyone but `exclude`.
    pub(crate) async fn broadcast(&self, msg: &ServerMessage, exclude: Option<ConnectionId>) {
        if let Some(frame) = self.encode(msg) {
            self.registry.lock().await.broadcast(&frame, exclude);
        }
    }
}

/// Builder for configuring and starting a drawpoker server.
///
/// # Example
///
/// ```rust,no_run
/// # use drawpoker::{DrawPokerServer, DrawPokerError, RoomConfig};
/// # async fn start() -> Result<(), DrawPokerError> {
/// let server = DrawPokerServer::builder()
///     .bind("127.0.0.1:5000")
///     .room_config(RoomConfig { max_players: 6, ..RoomConfig::default() })
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct DrawPokerServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    session_config: SessionConfig,
    max_frame_len: usize,
    seed: Option<u64>,
}

impl DrawPokerServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::from_config(ServerConfig::default())
    }

    fn from_config(config: ServerConfig) -> Self {
        Self {
            bind_addr: config.bind_addr,
            room_config: config.room,
            session_config: config.session,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            seed: None,
        }
    }

    /// Replaces address, room and session settings at once.
    pub fn config(self, config: ServerConfig) -> Self {
        Self {
            max_frame_len: self.max_frame_len,
            seed: self.seed,
            ..Self::from_config(config)
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Longest accepted inbound line, in bytes.
    pub fn max_frame_len(mut self, max: usize) -> Self {
        self.max_frame_len = max;
        self
    }

    /// Seeds the room's shuffle for reproducible deals.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// # Errors
    /// [`DrawPokerError::Room`] if the room config's seat range is invalid,
    /// [`DrawPokerError::Transport`] if the address cannot be bound.
    pub async fn build(self) -> Result<DrawPokerServer, DrawPokerError> {
        self.room_config.validate()?;

        let transport = TcpLineTransport::bind(&self.bind_addr)
            .await?
            .with_max_frame_len(self.max_frame_len);

        let room = match self.seed {
            Some(seed) => GameRoom::with_seed(self.room_config, seed),
            None => GameRoom::new(self.room_config),
        };

        let state = Arc::new(ServerState {
            registry: Mutex::new(Registry::new(self.session_config.clone())),
            room: Mutex::new(room),
            codec: JsonCodec,
            session_config: self.session_config,
        });

        Ok(DrawPokerServer { transport, state })
    }
}

impl Default for DrawPokerServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A drawpoker server bound to its listen address.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct DrawPokerServer {
    transport: TcpLineTransport,
    state: Arc<ServerState>,
}

impl DrawPokerServer {
    /// Creates a new builder.
    pub fn builder() -> DrawPokerServerBuilder {
        DrawPokerServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task for each accepted connection. Accept errors
    /// are logged and the loop continues; it runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), DrawPokerError> {
        tracing::info!(addr = ?self.local_addr().ok(), "drawpoker server running");

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
