//! Configuration loading and management.
//!
//! - [`types`]: config struct definitions and loading (Config, IrcConfig, BotConfig, StorageConfig)
//! - [`defaults`]: serde default functions
//! - [`validation`]: startup checks

mod defaults;
mod types;
mod validation;

pub use types::{BotConfig, Config, ConfigError, IrcConfig, StorageConfig};
pub use validation::{ValidationError, validate};
