//! Process bootstrap: stores, reply text, registry and the gateway session.

use crate::assets::{AssetError, Assets};
use crate::client::{ClientError, Connection, Mode, Session};
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::registry::Registry;
use crate::responders::register_builtins;
use crate::rules::{RuleError, RuleSet};
use crate::store::{ChannelStore, InterjectCounter, RedbStore, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;
use tracing::{info, warn};

/// Errors that stop the bot.
#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Assets(#[from] AssetError),

    #[error(transparent)]
    Rules(#[from] RuleError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Build the registry: built-in responders first, then the rules file.
pub fn build_registry<S>(
    config: &Config,
    store: Arc<S>,
    assets: &Assets,
) -> Result<Registry, BotError>
where
    S: ChannelStore + InterjectCounter + 'static,
{
    let mut registry = Registry::new();
    register_builtins(
        &mut registry,
        store.clone(),
        store.clone(),
        assets.interjection(),
        &config.bot.audit_list,
    );

    if let Some(path) = &config.bot.rules_file {
        let rules = RuleSet::load(path)?;
        rules.register(&mut registry, store)?;
        info!(path = %path.display(), count = rules.len(), "Loaded rules");
    }

    info!(
        registrations = registry.len(),
        callbacks = registry.callback_count(),
        "Registry built"
    );
    Ok(registry)
}

/// Log in, join the stored channels and the home room, and build the session.
pub async fn start<T, S>(
    config: &Config,
    mut conn: Connection<T>,
    store: Arc<S>,
    assets: &Assets,
    mode: watch::Receiver<Mode>,
) -> Result<Session<T>, BotError>
where
    T: AsyncRead + AsyncWrite + Unpin,
    S: ChannelStore + InterjectCounter + 'static,
{
    let registry = build_registry(config, store.clone(), assets)?;

    conn.login(&config.irc.nick, &config.irc.password).await?;
    for room in store.get_channels()? {
        conn.connect(&room).await?;
    }
    if let Some(home) = &config.bot.home_room {
        conn.connect(home).await?;
    }

    Ok(Session::new(conn, Dispatcher::new(registry), store, mode)
        .with_delay(config.bot.dispatch_delay())
        .with_prompt(config.bot.prompt_on_interrupt))
}

/// Run the bot against the configured gateway until it quits or the
/// connection drops. A random quote is logged on the way out.
pub async fn run(config: &Config, mode: watch::Receiver<Mode>) -> Result<(), BotError> {
    let store = Arc::new(RedbStore::open(
        &config.storage.path,
        config.bot.interject_threshold,
    )?);
    let assets = Assets::load(
        config.bot.interjection_file.as_deref(),
        config.bot.quotes_file.as_deref(),
    )?;

    let conn = Connection::open(&config.irc.address).await?;
    let mut session = start(config, conn, store, &assets, mode).await?;
    let result = session.run().await;

    match assets.random_quote() {
        Some(quote) => info!(quote = %quote, "Goodbye"),
        None => warn!("No quotes loaded"),
    }
    Ok(result?)
}
