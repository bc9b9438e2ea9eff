use super::prompt::ask_room;
use super::{ClientError, Connection};
use crate::dispatch::{Dispatcher, Outbox};
use crate::store::ChannelStore;
use gnubot_proto::{ChatEvent, Command, Event, ProtocolError};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, BufReader, Stdin};
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

/// Receive loop state, checked once per iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Run,
    Quit,
}

enum SelectResult {
    /// A read completed (or the stream ended)
    Read(Option<Result<Event, ProtocolError>>),
    /// Ctrl-C
    Interrupted,
    /// The mode channel changed or closed
    ModeChanged { closed: bool },
}

/// Ctrl-C source, registered once for the life of a session so an interrupt
/// that lands while an event is being handled is still delivered.
#[cfg(unix)]
struct Interrupts(tokio::signal::unix::Signal);

#[cfg(unix)]
impl Interrupts {
    fn new() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};
        Ok(Self(signal(SignalKind::interrupt())?))
    }

    async fn recv(&mut self) {
        if self.0.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
struct Interrupts;

#[cfg(not(unix))]
impl Interrupts {
    fn new() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// One gateway session: a connection, the dispatcher and the stores the
/// interrupt prompt writes to.
pub struct Session<T> {
    conn: Connection<T>,
    dispatcher: Dispatcher,
    channels: Arc<dyn ChannelStore>,
    delay: Duration,
    prompt_on_interrupt: bool,
    mode: watch::Receiver<Mode>,
    stdin: Option<BufReader<Stdin>>,
}

impl<T> Session<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        conn: Connection<T>,
        dispatcher: Dispatcher,
        channels: Arc<dyn ChannelStore>,
        mode: watch::Receiver<Mode>,
    ) -> Self {
        Self {
            conn,
            dispatcher,
            channels,
            delay: Duration::ZERO,
            prompt_on_interrupt: false,
            mode,
            stdin: None,
        }
    }

    /// Wait this long before dispatching each chat event.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Ask for a new room on Ctrl-C instead of quitting.
    pub fn with_prompt(mut self, prompt: bool) -> Self {
        self.prompt_on_interrupt = prompt;
        self
    }

    pub fn connection(&mut self) -> &mut Connection<T> {
        &mut self.conn
    }

    /// Run until the mode switches to [`Mode::Quit`], the user quits from the
    /// interrupt prompt, or the gateway closes the connection. Failed writes
    /// are logged and the loop keeps reading.
    pub async fn run(&mut self) -> Result<(), ClientError> {
        let mut mode_open = true;
        let mut interrupts = Interrupts::new()?;
        info!("Starting receiver");

        loop {
            if *self.mode.borrow() == Mode::Quit {
                info!("Quit requested");
                return Ok(());
            }

            let select_result = tokio::select! {
                result = self.conn.next_event() => SelectResult::Read(result),

                _ = interrupts.recv() => SelectResult::Interrupted,

                changed = self.mode.changed(), if mode_open => {
                    SelectResult::ModeChanged { closed: changed.is_err() }
                }
            };

            match select_result {
                SelectResult::Read(Some(Ok(event))) => {
                    if let Err(e) = self.handle_event(event).await {
                        warn!(error = %e, "Write error");
                    }
                }

                SelectResult::Read(Some(Err(e))) => {
                    warn!(error = %e, "Read error");
                }

                SelectResult::Read(None) => {
                    info!("Gateway closed the connection");
                    return Err(ClientError::ConnectionClosed);
                }

                SelectResult::Interrupted => match self.handle_interrupt().await {
                    Ok(true) => {}
                    Ok(false) => return Ok(()),
                    Err(e) => warn!(error = %e, "Interrupt prompt failed"),
                },

                SelectResult::ModeChanged { closed } => {
                    if closed {
                        mode_open = false;
                    }
                }
            }
        }
    }

    async fn handle_event(&mut self, event: Event) -> Result<(), ClientError> {
        match event {
            Event::Ping(token) => {
                debug!(token = %token, "PING");
                self.conn.push_cmd(Command::PONG(token)).await
            }
            Event::Chat(chat) => self.handle_chat(chat).await,
            Event::Unknown => {
                trace!("Ignoring line");
                Ok(())
            }
        }
    }

    async fn handle_chat(&mut self, chat: ChatEvent) -> Result<(), ClientError> {
        debug!(room = %chat.room, author = %chat.author, message = %chat.message, "Chat");
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut outbox = Outbox::new();
        let report = self.dispatcher.dispatch(&chat, &mut outbox);
        if report.activated > 0 {
            debug!(
                activated = report.activated,
                fired = report.fired,
                skipped = report.skipped,
                failed = report.failed,
                "Dispatched"
            );
        }
        self.conn.flush(&mut outbox).await?;
        Ok(())
    }

    /// Returns `false` when the session should end.
    async fn handle_interrupt(&mut self) -> Result<bool, ClientError> {
        if !self.prompt_on_interrupt {
            info!("Interrupted");
            return Ok(false);
        }

        let stdin = self
            .stdin
            .get_or_insert_with(|| BufReader::new(tokio::io::stdin()));
        let mut stdout = tokio::io::stdout();

        let Some(room) = ask_room(stdin, &mut stdout).await? else {
            info!("No room given, quitting");
            return Ok(false);
        };

        let room = super::normalize_room(&room);
        match self.channels.add_channel(&room) {
            Ok(added) => info!(room = %room, added, "Added channel"),
            Err(e) => warn!(room = %room, error = %e, "Failed to store channel"),
        }
        self.conn.connect(&room).await?;
        Ok(true)
    }
}
