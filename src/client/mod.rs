//! Client side of the relay protocol
//!
//! A [`ChatSession`] is created per tab. Input goes through a [`Composer`],
//! `begin_send` turns it into an [`OutboundRequest`](crate::models::OutboundRequest)
//! plus an optimistic placeholder, [`RelayClient`] posts it, and a
//! [`PushSubscriber`] feeds replies back through `apply_push`.

pub mod composer;
pub mod http;
pub mod reconnect;
pub mod session;
pub mod subscriber;

pub use composer::{Composer, ComposerInput};
pub use http::RelayClient;
pub use reconnect::{Backoff, ReconnectPolicy};
pub use session::{ChatSession, Resolution, SendState, PLACEHOLDER_TEXT};
pub use subscriber::PushSubscriber;
