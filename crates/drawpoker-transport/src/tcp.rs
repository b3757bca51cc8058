//! Line-delimited TCP transport built on `tokio::net`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

use crate::{ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Longest line accepted from a peer, excluding the newline.
pub const DEFAULT_MAX_FRAME_LEN: usize = 64 * 1024;

/// A TCP [`Transport`] whose frames are newline-terminated lines.
pub struct TcpLineTransport {
    listener: TcpListener,
    max_frame_len: usize,
}

impl TcpLineTransport {
    /// Binds a new transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::BindFailed)?;
        tracing::info!(addr, "TCP line transport listening");
        Ok(Self {
            listener,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        })
    }

    /// Sets the longest line a peer may send before being disconnected.
    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }
}

impl Transport for TcpLineTransport {
    type Connection = LineConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        // Frames are small and latency matters more than packet count.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(%peer, error = %e, "could not set TCP_NODELAY");
        }

        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %peer, "accepted TCP connection");

        Ok(LineConnection {
            id,
            peer,
            stream,
            max_frame_len: self.max_frame_len,
        })
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// A single accepted connection, not yet split.
pub struct LineConnection {
    id: ConnectionId,
    peer: SocketAddr,
    stream: TcpStream,
    max_frame_len: usize,
}

impl LineConnection {
    /// Returns the unique identifier for this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// The remote peer's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Splits the connection into independently owned read and write halves.
    pub fn into_split(self) -> (LineReader, LineWriter) {
        let (read, write) = self.stream.into_split();
        (
            LineReader {
                inner: BufReader::new(read),
                max_frame_len: self.max_frame_len,
            },
            LineWriter {
                inner: BufWriter::new(write),
            },
        )
    }
}

/// The receiving half of a [`LineConnection`].
pub struct LineReader {
    inner: BufReader<OwnedReadHalf>,
    max_frame_len: usize,
}

impl LineReader {
    /// Receives the next line, without its trailing `\n`.
    ///
    /// Returns `Ok(None)` when the peer closed the connection. A final
    /// line that ends at EOF without a newline is still returned.
    ///
    /// # Errors
    /// [`TransportError::ReceiveFailed`] on socket errors and
    /// [`TransportError::FrameTooLong`] when no newline arrives within the
    /// frame limit.
    pub async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut line = Vec::new();
        // One extra byte so a line of exactly `max_frame_len` still fits
        // together with its newline.
        let limit = self.max_frame_len as u64 + 1;
        let n = (&mut self.inner)
            .take(limit)
            .read_until(b'\n', &mut line)
            .await
            .map_err(TransportError::ReceiveFailed)?;

        if n == 0 {
            return Ok(None);
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        } else if line.len() > self.max_frame_len {
            return Err(TransportError::FrameTooLong(self.max_frame_len));
        }
        Ok(Some(line))
    }
}

/// The sending half of a [`LineConnection`].
pub struct LineWriter {
    inner: BufWriter<OwnedWriteHalf>,
}

impl LineWriter {
    /// Writes `frame` followed by `\n` and flushes.
    ///
    /// The caller guarantees `frame` contains no newline of its own.
    pub async fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.inner
            .write_all(frame)
            .await
            .map_err(TransportError::SendFailed)?;
        self.inner
            .write_all(b"\n")
            .await
            .map_err(TransportError::SendFailed)?;
        self.inner.flush().await.map_err(TransportError::SendFailed)
    }

    /// Flushes pending bytes and shuts down the write direction.
    pub async fn close(mut self) -> Result<(), TransportError> {
        self.inner.shutdown().await.map_err(TransportError::SendFailed)
    }
}
