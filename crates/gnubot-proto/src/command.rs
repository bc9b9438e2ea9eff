//! Outbound gateway commands.
//!
//! Every command goes on the wire as `<VERB> <value>\r\n` with an upper-cased
//! verb. Twitch only needs a handful of verbs; anything else can be sent
//! through [`Command::Raw`].

use std::fmt;

/// An outbound command.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Command {
    /// `PASS oauth:token`
    PASS(String),
    /// `NICK nickname`
    NICK(String),
    /// `JOIN #room`
    JOIN(String),
    /// `PART #room`
    PART(String),
    /// `PONG token`
    PONG(String),
    /// `PRIVMSG #room :text`
    PRIVMSG(String, String),
    /// Any other verb with a preformatted value.
    Raw(String, String),
}

impl Command {
    /// Build a command from a verb and value the way a generic `push_cmd`
    /// would. Known verbs map onto their typed variants.
    pub fn from_parts(verb: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match verb.to_ascii_uppercase().as_str() {
            "PASS" => Self::PASS(value),
            "NICK" => Self::NICK(value),
            "JOIN" => Self::JOIN(value),
            "PART" => Self::PART(value),
            "PONG" => Self::PONG(value),
            "PRIVMSG" => match value.split_once(" :") {
                Some((room, text)) => Self::PRIVMSG(room.to_string(), text.to_string()),
                None => Self::Raw("PRIVMSG".to_string(), value),
            },
            other => Self::Raw(other.to_string(), value),
        }
    }

    /// `PRIVMSG <room> :<text>`
    pub fn privmsg(room: impl Into<String>, text: impl Into<String>) -> Self {
        Self::PRIVMSG(room.into(), text.into())
    }

    /// Twitch whisper, relayed through a room: `PRIVMSG <room> :/w <author> <text>`
    pub fn whisper(room: impl Into<String>, author: &str, text: &str) -> Self {
        Self::PRIVMSG(room.into(), format!("/w {author} {text}"))
    }

    /// The upper-cased verb.
    pub fn verb(&self) -> &str {
        match self {
            Self::PASS(_) => "PASS",
            Self::NICK(_) => "NICK",
            Self::JOIN(_) => "JOIN",
            Self::PART(_) => "PART",
            Self::PONG(_) => "PONG",
            Self::PRIVMSG(..) => "PRIVMSG",
            Self::Raw(verb, _) => verb,
        }
    }

    /// The value that follows the verb.
    pub fn value(&self) -> String {
        match self {
            Self::PASS(v) | Self::NICK(v) | Self::JOIN(v) | Self::PART(v) | Self::PONG(v) => {
                v.clone()
            }
            Self::PRIVMSG(room, text) => format!("{room} :{text}"),
            Self::Raw(_, value) => value.clone(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb().to_ascii_uppercase(), self.value())
    }
}
