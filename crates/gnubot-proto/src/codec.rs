//! Gateway codec for tokio.
//!
//! Wraps [`LineCodec`] on the read side and classifies each line into an
//! [`Event`]; on the write side it serializes [`Command`]s.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::command::Command;
use crate::error::{self, ProtocolError};
use crate::event::Event;
use crate::line::LineCodec;

/// Tokio codec for reading [`Event`]s and writing [`Command`]s.
#[derive(Debug, Default)]
pub struct RelayCodec {
    inner: LineCodec,
}

impl RelayCodec {
    /// Create a new codec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sanitize an outbound line.
    ///
    /// - Truncates at the first `\r` or `\n`
    /// - Rejects NUL
    pub fn sanitize(mut data: String) -> error::Result<String> {
        if let Some(pos) = data.find(|c| c == '\r' || c == '\n') {
            data.truncate(pos);
        }
        if data.contains('\0') {
            return Err(ProtocolError::IllegalControlChar('\0'));
        }
        Ok(data)
    }
}

impl Decoder for RelayCodec {
    type Item = Event;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Event>> {
        self.inner
            .decode(src)
            .map(|line| line.map(|line| Event::classify(&line)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<Event>> {
        self.inner
            .decode_eof(src)
            .map(|line| line.map(|line| Event::classify(&line)))
    }
}

impl Encoder<Command> for RelayCodec {
    type Error = ProtocolError;

    fn encode(&mut self, cmd: Command, dst: &mut BytesMut) -> error::Result<()> {
        if cmd.verb().is_empty() {
            return Err(ProtocolError::EmptyVerb);
        }
        let mut line = Self::sanitize(cmd.to_string())?;
        line.push_str("\r\n");
        self.inner.encode(line, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ChatEvent;

    #[test]
    fn test_sanitize_truncates_newline() {
        let result = RelayCodec::sanitize("PRIVMSG #test :hello\r\nJOIN #evil".to_string());
        assert_eq!(result.unwrap(), "PRIVMSG #test :hello");
    }

    #[test]
    fn test_sanitize_rejects_nul() {
        let result = RelayCodec::sanitize("PRIVMSG #test :hel\0lo".to_string());
        assert!(matches!(result, Err(ProtocolError::IllegalControlChar('\0'))));
    }

    #[test]
    fn test_decode_events() {
        let mut codec = RelayCodec::new();
        let mut buf = BytesMut::from("PING :tmi.twitch.tv\r\n:a!a@a PRIVMSG #r :yo\r\n:tmi 001 x\r\n");

        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Event::Ping(":tmi.twitch.tv".into()))
        );
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Event::Chat(ChatEvent::new("#r", "a", "yo")))
        );
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Event::Unknown));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_encode_appends_crlf() {
        let mut codec = RelayCodec::new();
        let mut buf = BytesMut::new();

        codec.encode(Command::PONG("123".into()), &mut buf).unwrap();
        codec
            .encode(Command::privmsg("#room", "two\nlines"), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"PONG 123\r\nPRIVMSG #room :two\r\n");
    }

    #[test]
    fn test_encode_rejects_empty_verb() {
        let mut codec = RelayCodec::new();
        let mut buf = BytesMut::new();
        let result = codec.encode(Command::Raw(String::new(), "x".into()), &mut buf);
        assert!(matches!(result, Err(ProtocolError::EmptyVerb)));
    }
}
