//! Dispatch engine.
//!
//! Matches a chat event against every registration and runs the callbacks of
//! the ones that activate. Callbacks never write to the socket directly: they
//! push commands into a [`Client`], normally an [`Outbox`] that the connection
//! task flushes once dispatch is done.

use crate::registry::{Entry, Invocation, Registry};
use gnubot_proto::{ChatEvent, Command};
use tracing::{debug, info, warn};

/// Outbound side as seen by callbacks.
pub trait Client {
    /// Queue a command.
    fn push_cmd(&mut self, cmd: Command);

    /// Queue `<VERB> <value>`.
    fn push_raw(&mut self, verb: &str, value: &str) {
        self.push_cmd(Command::from_parts(verb, value));
    }

    /// Send `text` to `room`, one `PRIVMSG` per non-empty line.
    fn send_message(&mut self, room: &str, text: &str) {
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            info!(room = %room, text = %line, "Sending message");
            self.push_cmd(Command::privmsg(room, line));
        }
    }

    /// Whisper `text` to `author` through `room`.
    fn whisper(&mut self, room: &str, author: &str, text: &str) {
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            info!(room = %room, author = %author, "Sending whisper");
            self.push_cmd(Command::whisper(room, author, line));
        }
    }
}

/// Buffers commands produced during dispatch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Outbox {
    commands: Vec<Command>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Take every buffered command, leaving the outbox empty.
    pub fn drain(&mut self) -> std::vec::Drain<'_, Command> {
        self.commands.drain(..)
    }

    pub fn into_inner(self) -> Vec<Command> {
        self.commands
    }
}

impl Client for Outbox {
    fn push_cmd(&mut self, cmd: Command) {
        self.commands.push(cmd);
    }
}

/// What happened during one dispatch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Registrations with at least one matching pattern.
    pub activated: usize,
    /// Callbacks that ran and returned `Ok`.
    pub fired: usize,
    /// Callbacks whose marker evaluated to false.
    pub skipped: usize,
    /// Callbacks that returned an error, or whose marker failed.
    pub failed: usize,
}

enum Outcome {
    Fired,
    Skipped,
    Failed,
}

/// Owns the registry and runs events through it.
#[derive(Debug, Default)]
pub struct Dispatcher {
    registry: Registry,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Run `event` through every registration, in registration order.
    pub fn dispatch(&self, event: &ChatEvent, client: &mut dyn Client) -> DispatchReport {
        let lowered = event.message.to_lowercase();
        let mut report = DispatchReport::default();

        for registration in self.registry.all() {
            let matched = registration.matches(&lowered);
            if matched.is_empty() {
                continue;
            }
            report.activated += 1;
            debug!(
                room = %event.room,
                patterns = ?registration.patterns(),
                matched = ?matched,
                "Registration activated"
            );

            let invocation = Invocation {
                room: &event.room,
                author: &event.author,
                message: &event.message,
                matches: &matched,
            };

            for entry in registration.entries() {
                match run_entry(entry, event, &invocation, client) {
                    Outcome::Fired => report.fired += 1,
                    Outcome::Skipped => report.skipped += 1,
                    Outcome::Failed => report.failed += 1,
                }
            }
        }

        report
    }
}

fn run_entry(
    entry: &Entry,
    event: &ChatEvent,
    invocation: &Invocation<'_>,
    client: &mut dyn Client,
) -> Outcome {
    if let Some(marker) = entry.marker() {
        match marker.evaluate(event) {
            Ok(true) => {}
            Ok(false) => {
                debug!(callback = entry.name(), room = %event.room, "Marker rejected event");
                return Outcome::Skipped;
            }
            Err(e) => {
                warn!(callback = entry.name(), error = %e, "Marker evaluation failed");
                return Outcome::Failed;
            }
        }
    }

    match entry.callback().call(client, invocation) {
        Ok(()) => Outcome::Fired,
        Err(e) => {
            warn!(
                callback = entry.name(),
                code = e.error_code(),
                error = %e,
                "Callback failed"
            );
            Outcome::Failed
        }
    }
}
