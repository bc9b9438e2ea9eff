//! Bot process management.
//!
//! Spawns the `gnubot` binary against a generated config inside a temporary
//! directory, and kills it on drop.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Duration;
use tempfile::TempDir;

/// A running bot.
pub struct TestBot {
    child: Child,
    _dir: TempDir,
}

impl TestBot {
    /// Write `gnubot.toml` for `address` plus `extra` config lines, and spawn
    /// the bot.
    pub fn spawn(address: &str, extra: &str) -> anyhow::Result<Self> {
        Self::spawn_in(tempfile::tempdir()?, address, extra)
    }

    /// Like [`TestBot::spawn`], reusing a directory that may already hold a
    /// store (`db/gnubot.redb`).
    pub fn spawn_in(dir: TempDir, address: &str, extra: &str) -> anyhow::Result<Self> {
        let config_path = write_config(dir.path(), address, extra)?;

        let child = Command::new(env!("CARGO_BIN_EXE_gnubot"))
            .arg(&config_path)
            .env("RUST_LOG", "gnubot=debug")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        Ok(Self { child, _dir: dir })
    }

    /// Store path used by bots spawned in `dir`.
    pub fn store_path(dir: &Path) -> PathBuf {
        dir.join("db/gnubot.redb")
    }

    /// Send SIGTERM.
    #[cfg(unix)]
    pub fn terminate(&self) -> anyhow::Result<()> {
        let status = Command::new("kill")
            .args(["-TERM", &self.child.id().to_string()])
            .status()?;
        anyhow::ensure!(status.success(), "kill -TERM failed: {status}");
        Ok(())
    }

    /// Wait for the process to exit on its own.
    pub async fn wait(&mut self, limit: Duration) -> anyhow::Result<ExitStatus> {
        let deadline = tokio::time::Instant::now() + limit;
        loop {
            if let Some(status) = self.child.try_wait()? {
                return Ok(status);
            }
            if tokio::time::Instant::now() >= deadline {
                anyhow::bail!("bot did not exit within {limit:?}");
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

impl Drop for TestBot {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Write a config with fast dispatch and no interrupt prompt.
pub fn write_config(dir: &Path, address: &str, extra: &str) -> anyhow::Result<PathBuf> {
    let config_path = dir.join("gnubot.toml");
    let content = format!(
        r##"
[irc]
address = "{address}"
nick = "gnubot"
password = "oauth:test"

[bot]
home_room = "#home"
dispatch_delay_ms = 0
prompt_on_interrupt = false
{extra}

[storage]
path = "{store}"
"##,
        store = TestBot::store_path(dir).display(),
    );
    std::fs::write(&config_path, content)?;
    Ok(config_path)
}
