//! Fake gateway.
//!
//! Listens on an ephemeral port, accepts the bot's connection and lets a test
//! script the lines the bot receives and assert on what it sends back.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

/// Listening side of the fake gateway.
pub struct FakeGateway {
    listener: TcpListener,
}

impl FakeGateway {
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self { listener })
    }

    /// `host:port` to put in the bot's config.
    pub fn address(&self) -> String {
        self.listener
            .local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_default()
    }

    /// Wait for the bot to connect.
    pub async fn accept(&self) -> anyhow::Result<GatewayPeer> {
        let (stream, _) = timeout(Duration::from_secs(10), self.listener.accept()).await??;
        let (read_half, write_half) = stream.into_split();
        Ok(GatewayPeer {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }
}

/// The gateway end of one bot connection.
pub struct GatewayPeer {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl GatewayPeer {
    /// Send a raw line, adding `\r\n` when missing.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with("\r\n") {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Send a chat line as `author` in `room`.
    pub async fn privmsg(&mut self, author: &str, room: &str, text: &str) -> anyhow::Result<()> {
        self.send_raw(&format!(
            ":{author}!{author}@{author}.tmi.twitch.tv PRIVMSG {room} :{text}"
        ))
        .await
    }

    /// Receive one line from the bot, without its terminator.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let read = timeout(dur, self.reader.read_line(&mut line)).await??;
        if read == 0 {
            anyhow::bail!("bot closed the connection");
        }
        Ok(line.trim_end().to_string())
    }

    /// Receive lines until one satisfies `predicate`.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<String>>
    where
        F: FnMut(&str) -> bool,
    {
        let mut lines = Vec::new();
        loop {
            let line = self.recv().await?;
            let done = predicate(&line);
            lines.push(line);
            if done {
                break;
            }
        }
        Ok(lines)
    }

    /// Consume the login and join lines the bot sends on connect.
    pub async fn expect_login(&mut self, rooms: &[&str]) -> anyhow::Result<()> {
        let pass = self.recv().await?;
        anyhow::ensure!(pass.starts_with("PASS "), "expected PASS, got {pass:?}");
        let nick = self.recv().await?;
        anyhow::ensure!(nick.starts_with("NICK "), "expected NICK, got {nick:?}");
        for room in rooms {
            let join = self.recv().await?;
            anyhow::ensure!(join == format!("JOIN {room}"), "expected JOIN {room}, got {join:?}");
        }
        Ok(())
    }
}
