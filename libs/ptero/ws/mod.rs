//! Server console sockets
//!
//! A [`Shard`] wraps one server's daemon socket. It authenticates with a
//! token from a [`TokenSource`], renews the token when the daemon asks, and
//! forwards decoded events to a [`ShardHandler`].

pub mod connection_state;
pub mod events;
pub mod handler;
pub mod shard;

pub use connection_state::{AtomicConnectionState, ConnectionState};
pub use events::{NetworkStats, ServerStats, ShardEvent, WsPayload};
pub use handler::{NoopHandler, ShardHandler, StaticToken, TokenSource};
pub use shard::{dispatch, Shard};
