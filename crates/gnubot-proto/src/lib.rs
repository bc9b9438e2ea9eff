//! # gnubot-proto
//!
//! Wire-level building blocks for talking to a Twitch-style IRC gateway.
//!
//! ## Features
//!
//! - Line framing on runs of `~`, `\r` and `\n` terminators
//! - Classification of framed lines into keep-alive pings and chat events
//! - Outbound command serialization (`<VERB> <value>\r\n`)
//! - A combined tokio codec for use with `tokio_util::codec::Framed`
//!
//! ## Quick Start
//!
//! ```rust
//! use gnubot_proto::{Event, LineFramer};
//!
//! let mut framer = LineFramer::new();
//! let lines: Vec<_> = framer
//!     .feed(b":nick!nick@tmi PRIVMSG #room :hello world\r\nPING :tm")
//!     .collect();
//! assert_eq!(lines.len(), 1);
//!
//! match Event::classify(&lines[0]) {
//!     Event::Chat(chat) => assert_eq!(chat.author, "nick"),
//!     other => panic!("unexpected {other:?}"),
//! }
//!
//! // The partial PING stays buffered until its terminator arrives.
//! assert_eq!(framer.pending(), b"PING :tm");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod codec;
pub mod command;
pub mod error;
pub mod event;
pub mod line;

pub use self::codec::RelayCodec;
pub use self::command::Command;
pub use self::error::ProtocolError;
pub use self::event::{author_from_prefix, ChatEvent, Event};
pub use self::line::{is_terminator, LineCodec, LineFramer, Lines};
