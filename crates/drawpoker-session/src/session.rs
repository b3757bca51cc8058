//! Per-connection delivery types and session configuration.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

/// One encoded wire line, without its trailing newline.
///
/// `Arc<[u8]>` so a broadcast encodes once and every queue shares the same
/// bytes.
pub type Frame = Arc<[u8]>;

/// Sending end of a connection's outbound queue.
pub type Outbound = mpsc::Sender<Frame>;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for connection sessions.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Frames a connection may have queued before it is considered too
    /// slow and disconnected.
    ///
    /// Default: 256.
    pub outbound_queue: usize,

    /// Longest accepted nickname, in characters.
    ///
    /// Default: 32.
    pub max_nick_len: usize,

    /// How long one line may take to reach the socket. A peer that stops
    /// reading stalls its writer; past this the connection is closed.
    ///
    /// Default: 10 seconds.
    pub write_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            outbound_queue: 256,
            max_nick_len: 32,
            write_timeout: Duration::from_secs(10),
        }
    }
}

/// Creates a connection's bounded outbound queue.
pub fn outbound_channel(config: &SessionConfig) -> (Outbound, mpsc::Receiver<Frame>) {
    // `mpsc::channel` panics on zero capacity.
    mpsc::channel(config.outbound_queue.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.outbound_queue, 256);
        assert_eq!(config.max_nick_len, 32);
        assert_eq!(config.write_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_outbound_channel_zero_capacity_is_clamped() {
        let config = SessionConfig {
            outbound_queue: 0,
            ..SessionConfig::default()
        };
        let (tx, _rx) = outbound_channel(&config);
        assert_eq!(tx.max_capacity(), 1);
    }
}
