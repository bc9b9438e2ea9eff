//! Integration test common infrastructure.
//!
//! Provides a fake gateway the bot connects to, and helpers for spawning the
//! bot binaries against a throwaway config and store.

#![allow(dead_code)]

pub mod bot;
pub mod gateway;

#[allow(unused_imports)]
pub use bot::TestBot;
#[allow(unused_imports)]
pub use gateway::{FakeGateway, GatewayPeer};
