//! gnubot - keyword-triggered replies for Twitch chat.
//!
//! Lines from the gateway are framed and classified by `gnubot-proto`, run
//! through the [`dispatch::Dispatcher`] against a [`registry::Registry`] of
//! pattern tuples, and the replies callbacks queue are written back by the
//! [`client::Session`] that owns the socket.

pub mod assets;
pub mod bot;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod marker;
pub mod registry;
pub mod responders;
pub mod rules;
pub mod store;
