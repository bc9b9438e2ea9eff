//! Classification of framed lines.
//!
//! Only two inbound shapes matter to the bot:
//!
//! ```text
//! PING <token>
//! <prefix> PRIVMSG <room> :<message...>
//! ```
//!
//! Everything else (numerics, JOIN echoes, truncated frames, invalid UTF-8)
//! is [`Event::Unknown`] and is dropped by the caller.

/// A chat message seen in a joined room.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChatEvent {
    /// Room the message was sent to, including its `#` sigil.
    pub room: String,
    /// Sender nickname, without the `!user@host` envelope.
    pub author: String,
    /// Message text, without the leading `:`.
    pub message: String,
}

impl ChatEvent {
    /// Build an event from its parts.
    pub fn new(
        room: impl Into<String>,
        author: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            room: room.into(),
            author: author.into(),
            message: message.into(),
        }
    }
}

/// A classified inbound line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Keep-alive; must be answered with `PONG <token>`.
    Ping(String),
    /// A chat message.
    Chat(ChatEvent),
    /// Anything the bot does not act on.
    Unknown,
}

impl Event {
    /// Classify a raw framed line.
    pub fn classify(line: &[u8]) -> Self {
        match std::str::from_utf8(line) {
            Ok(text) => Self::classify_str(text),
            Err(_) => Self::Unknown,
        }
    }

    /// Classify a decoded line.
    pub fn classify_str(line: &str) -> Self {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        Self::from_tokens(&tokens)
    }

    /// Classify a line that has already been split on whitespace.
    pub fn from_tokens(tokens: &[&str]) -> Self {
        match tokens {
            ["PING", token, ..] => Self::Ping((*token).to_string()),
            [prefix, "PRIVMSG", room, rest @ ..] => {
                let joined = rest.join(" ");
                let message = joined.strip_prefix(':').unwrap_or(&joined);
                Self::Chat(ChatEvent::new(*room, author_from_prefix(prefix), message))
            }
            _ => Self::Unknown,
        }
    }

    /// Returns the chat event, if this is one.
    pub fn as_chat(&self) -> Option<&ChatEvent> {
        match self {
            Self::Chat(chat) => Some(chat),
            _ => None,
        }
    }
}

/// Extract the nickname from a `:nick!user@host` prefix.
pub fn author_from_prefix(prefix: &str) -> &str {
    let prefix = prefix.strip_prefix(':').unwrap_or(prefix);
    prefix.split_once('!').map_or(prefix, |(nick, _)| nick)
}
