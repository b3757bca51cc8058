//! Connection registry for drawpoker.
//!
//! This crate knows who is connected and how to reach them:
//!
//! 1. **Identity**: a connection becomes a named player once it sends
//!    `hello`; the [`Registry`] keeps nicknames unique.
//! 2. **Delivery**: every registered connection owns a bounded outbound
//!    queue ([`Outbound`]). [`Registry::broadcast`] and
//!    [`Registry::send_to_nick`] only enqueue; a per-connection writer task
//!    does the socket I/O.
//! 3. **Pruning**: a connection whose queue is full or closed is dropped
//!    from the registry on the spot.
//!
//! # How it fits in the stack
//!
//! ```text
//! Session handler (above)  ← registers on hello, dispatches room output
//!     ↕
//! Registry (this crate)    ← nickname ↔ connection, outbound queues
//!     ↕
//! Transport (below)        ← provides ConnectionId
//! ```

mod error;
mod registry;
mod session;

pub use error::SessionError;
pub use registry::Registry;
pub use session::{outbound_channel, Frame, Outbound, SessionConfig};
