//! gnubot - reply bot for Twitch chat.

use gnubot::client::Mode;
use gnubot::config::{Config, validate};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "gnubot.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "Refusing to start with {} configuration error(s)",
            errors.len()
        ));
    }

    info!(
        address = %config.irc.address,
        nick = %config.irc.nick,
        storage = %config.storage.path,
        "Starting gnubot"
    );

    let (mode_tx, mode_rx) = watch::channel(Mode::Run);
    quit_on_terminate(mode_tx)?;
    gnubot::bot::run(&config, mode_rx).await?;

    info!("Shutdown complete");
    Ok(())
}

/// Switch the session to [`Mode::Quit`] on SIGTERM. The handler is installed
/// before returning so a signal sent right after startup is not lost.
#[cfg(unix)]
fn quit_on_terminate(mode: watch::Sender<Mode>) -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::spawn(async move {
        if terminate.recv().await.is_some() {
            info!("SIGTERM received, quitting");
            if mode.send(Mode::Quit).is_err() {
                warn!("Session already gone");
            }
        }
    });
    Ok(())
}

/// Ctrl-C is the only stop signal off unix.
#[cfg(not(unix))]
fn quit_on_terminate(mode: watch::Sender<Mode>) -> std::io::Result<()> {
    tokio::spawn(async move {
        mode.closed().await;
    });
    Ok(())
}
