//! Connection shell.
//!
//! Owns the gateway socket through a [`Framed`] transport with the
//! [`RelayCodec`], so framing and classification happen in the codec and the
//! shell only sees [`Event`]s. Everything written to the socket goes through
//! this one type.

mod event_loop;
mod prompt;

pub use event_loop::{Mode, Session};
pub use prompt::ask_room;

use crate::dispatch::Outbox;
use crate::store::StoreError;
use futures_util::{SinkExt, StreamExt};
use gnubot_proto::{Command, Event, ProtocolError, RelayCodec};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

/// Errors from the connection shell.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("connection closed by gateway")]
    ConnectionClosed,
}

/// Add the `#` sigil when missing.
pub fn normalize_room(room: &str) -> String {
    let room = room.trim();
    if room.starts_with('#') {
        room.to_string()
    } else {
        format!("#{room}")
    }
}

/// Framed connection to the gateway.
pub struct Connection<T = TcpStream> {
    transport: Framed<T, RelayCodec>,
}

impl Connection<TcpStream> {
    /// Connect to `address` (`host:port`).
    pub async fn open(address: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(address).await?;
        stream.set_nodelay(true)?;
        info!(address = %address, "Connected to gateway");
        Ok(Self::from_stream(stream))
    }
}

impl<T> Connection<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub fn from_stream(stream: T) -> Self {
        Self {
            transport: Framed::new(stream, RelayCodec::new()),
        }
    }

    /// Send one command and flush.
    pub async fn push_cmd(&mut self, cmd: Command) -> Result<(), ClientError> {
        debug!(verb = cmd.verb(), "Sending command");
        self.transport.send(cmd).await?;
        Ok(())
    }

    /// Send `<VERB> <value>`.
    pub async fn push_raw(&mut self, verb: &str, value: &str) -> Result<(), ClientError> {
        self.push_cmd(Command::from_parts(verb, value)).await
    }

    /// Send `PASS` then `NICK`.
    pub async fn login(&mut self, nick: &str, password: &str) -> Result<(), ClientError> {
        self.transport.feed(Command::PASS(password.to_string())).await?;
        self.transport.feed(Command::NICK(nick.to_string())).await?;
        SinkExt::<Command>::flush(&mut self.transport).await?;
        info!(nick = %nick, "Logged in");
        Ok(())
    }

    /// Join `room`, adding the `#` sigil when missing. Returns the joined name.
    pub async fn connect(&mut self, room: &str) -> Result<String, ClientError> {
        let room = normalize_room(room);
        debug!(room = %room, "Joining room");
        self.push_cmd(Command::JOIN(room.clone())).await?;
        Ok(room)
    }

    /// Write every command in `outbox`. Commands the codec refuses are logged
    /// and dropped; I/O errors abort the flush.
    pub async fn flush(&mut self, outbox: &mut Outbox) -> Result<usize, ClientError> {
        let mut written = 0;
        for cmd in outbox.drain() {
            match self.transport.feed(cmd).await {
                Ok(()) => written += 1,
                Err(ProtocolError::Io(e)) => return Err(e.into()),
                Err(e) => warn!(error = %e, "Dropping outbound command"),
            }
        }
        SinkExt::<Command>::flush(&mut self.transport).await?;
        Ok(written)
    }

    /// Next event from the gateway; `None` at end of stream.
    pub async fn next_event(&mut self) -> Option<Result<Event, ProtocolError>> {
        self.transport.next().await
    }
}
