//! Push Relay
//!
//! Process-wide registry of connected push channels. Each channel is the
//! sending half of an unbounded queue drained by that connection's WebSocket
//! writer, so a broadcast never waits on a slow tab.
//!
//! The queues have no cap: a tab that stops reading keeps accumulating
//! output until it disconnects.

pub mod registry;

pub use registry::{BroadcastReport, ChannelId, PushRelay};
