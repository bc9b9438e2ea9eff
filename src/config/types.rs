//! Core configuration types and loading.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::defaults::{
    default_address, default_audit_list, default_dispatch_delay_ms, default_interject_threshold,
    default_storage_path, default_true,
};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Gateway connection and credentials.
    pub irc: IrcConfig,
    /// Reply behavior.
    #[serde(default)]
    pub bot: BotConfig,
    /// Persistent state.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a file. Files ending in `.json` are read as
    /// JSON, everything else as TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Gateway connection configuration.
#[derive(Clone, Deserialize)]
pub struct IrcConfig {
    /// `host:port` of the gateway (default: irc.chat.twitch.tv:6667).
    #[serde(default = "default_address")]
    pub address: String,
    /// Login name sent with `NICK`.
    pub nick: String,
    /// Token sent with `PASS`, usually `oauth:...`.
    pub password: String,
}

impl fmt::Debug for IrcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IrcConfig")
            .field("address", &self.address)
            .field("nick", &self.nick)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Reply behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Room joined after the stored channel list.
    #[serde(default)]
    pub home_room: Option<String>,
    /// Delay before a chat event is dispatched (default: 500).
    #[serde(default = "default_dispatch_delay_ms")]
    pub dispatch_delay_ms: u64,
    /// Matches per author before the interjection is whispered (default: 25).
    #[serde(default = "default_interject_threshold")]
    pub interject_threshold: u64,
    /// Interjection text; the built-in copy is used when unset.
    #[serde(default)]
    pub interjection_file: Option<PathBuf>,
    /// `%`-separated quotes; the built-in copy is used when unset.
    #[serde(default)]
    pub quotes_file: Option<PathBuf>,
    /// Declarative rules loaded on top of the built-in responders.
    #[serde(default)]
    pub rules_file: Option<PathBuf>,
    /// Ask for a new room on Ctrl-C instead of quitting (default: true).
    #[serde(default = "default_true")]
    pub prompt_on_interrupt: bool,
    /// Channel list of rooms where the gnu responder stays quiet.
    #[serde(default = "default_audit_list")]
    pub audit_list: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            home_room: None,
            dispatch_delay_ms: default_dispatch_delay_ms(),
            interject_threshold: default_interject_threshold(),
            interjection_file: None,
            quotes_file: None,
            rules_file: None,
            prompt_on_interrupt: true,
            audit_list: default_audit_list(),
        }
    }
}

impl BotConfig {
    pub fn dispatch_delay(&self) -> Duration {
        Duration::from_millis(self.dispatch_delay_ms)
    }
}

/// Persistent state configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the redb file (default: db/gnubot.redb).
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
[irc]
nick = "gnubot"
password = "oauth:abc"
"#,
        )
        .unwrap();

        assert_eq!(config.irc.address, "irc.chat.twitch.tv:6667");
        assert_eq!(config.bot.dispatch_delay(), Duration::from_millis(500));
        assert_eq!(config.bot.interject_threshold, 25);
        assert!(config.bot.prompt_on_interrupt);
        assert_eq!(config.bot.audit_list, "audited_by_gnu");
        assert_eq!(config.storage.path, "db/gnubot.redb");
        assert!(config.bot.home_room.is_none());
    }

    #[test]
    fn test_full_toml() {
        let config = Config::from_toml(
            r##"
[irc]
address = "127.0.0.1:6667"
nick = "gnubot"
password = "oauth:abc"

[bot]
home_room = "#gnu"
dispatch_delay_ms = 0
interject_threshold = 3
rules_file = "rules.toml"
prompt_on_interrupt = false

[storage]
path = "/tmp/gnubot.redb"
"##,
        )
        .unwrap();

        assert_eq!(config.bot.home_room.as_deref(), Some("#gnu"));
        assert_eq!(config.bot.interject_threshold, 3);
        assert_eq!(config.bot.rules_file, Some(PathBuf::from("rules.toml")));
        assert!(!config.bot.prompt_on_interrupt);
    }

    #[test]
    fn test_load_picks_format_by_extension() {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            json,
            r#"{{"irc": {{"nick": "gnubot", "password": "oauth:abc"}}, "bot": {{"home_room": "gnu"}}}}"#
        )
        .unwrap();
        let config = Config::load(json.path()).unwrap();
        assert_eq!(config.bot.home_room.as_deref(), Some("gnu"));

        let mut toml_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(toml_file, "[irc]\nnick = \"a\"\npassword = \"b\"\n").unwrap();
        assert_eq!(Config::load(toml_file.path()).unwrap().irc.nick, "a");
    }

    #[test]
    fn test_missing_irc_section_fails() {
        assert!(matches!(
            Config::from_toml("[bot]\nhome_room = \"#x\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = Config::from_toml("[irc]\nnick = \"a\"\npassword = \"oauth:secret\"\n").unwrap();
        let debug = format!("{:?}", config.irc);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }
}
