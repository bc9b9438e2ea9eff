//! Built-in responders.

use crate::dispatch::Client;
use crate::error::{CallbackError, CallbackResult};
use crate::marker::{Marker, Selector, Supplier};
use crate::registry::{Callback, Handle, Invocation, Registry};
use crate::store::{ChannelStore, InterjectCounter};
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use tracing::info;

pub const GNU_PATTERNS: &[&str] = &[
    "nano",
    "linux",
    "emacs",
    "grep",
    "windows",
    "vscode",
    "visual studio",
];
pub const RMS_PATTERNS: &[&str] = &["stallman", "richard stallman", "rms"];
pub const DOMINATION_PATTERNS: &[&str] = &["total gnu domination"];
pub const PLATFORM_PATTERNS: &[&str] = &["platform"];
pub const SOURCE_PATTERNS: &[&str] = &["source"];

pub const SOURCE_ANNOUNCEMENT: &str = "The GNU/gnubot source is licensed under GPLv3 and \
     distributed with the bot. Ask the operator for a copy.";

/// Title-case every word: the first letter after a non-letter is upper-cased,
/// the rest lower-cased.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut boundary = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if boundary {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            boundary = false;
        } else {
            out.push(c);
            boundary = true;
        }
    }
    out
}

/// Corrects mentions of non-GNU software, and whispers the full interjection
/// to repeat offenders.
pub struct Gnu {
    counter: Arc<dyn InterjectCounter>,
    interjection: String,
}

impl Gnu {
    pub fn new(counter: Arc<dyn InterjectCounter>, interjection: impl Into<String>) -> Self {
        Self {
            counter,
            interjection: interjection.into(),
        }
    }

    /// Guard keeping the responder out of rooms listed in `audit_list`.
    pub fn marker(channels: Arc<dyn ChannelStore>, audit_list: &str) -> Marker {
        Marker::excluding(Selector::Room, Supplier::channel_list(channels, audit_list))
    }
}

impl Callback for Gnu {
    fn name(&self) -> &str {
        "gnu"
    }

    fn call(&self, client: &mut dyn Client, inv: &Invocation<'_>) -> CallbackResult {
        if inv.message.to_lowercase().contains("gnu") {
            return Ok(());
        }

        if self.counter.record_and_check(inv.author)? {
            info!(room = %inv.room, author = %inv.author, "Interjecting");
            client.whisper(inv.room, inv.author, &self.interjection);
        }

        let corrections: Vec<String> = inv
            .matches
            .iter()
            .map(|thing| format!("Not {thing}, GNU/{}", title_case(thing)))
            .collect();
        client.send_message(
            inv.room,
            &format!("Guys, please. {}", corrections.join(". ")),
        );
        Ok(())
    }
}

/// Insists on the proper title.
pub struct Rms;

impl Callback for Rms {
    fn name(&self) -> &str {
        "rms"
    }

    fn call(&self, client: &mut dyn Client, inv: &Invocation<'_>) -> CallbackResult {
        let name = inv.matches.last().ok_or(CallbackError::NoMatch)?;
        let reply = if inv.message.to_lowercase().contains("holy") {
            format!("God may bless Holy {name}")
        } else {
            format!("Guys please. Not {name}, Holy {name}")
        };
        client.send_message(inv.room, &reply);
        Ok(())
    }
}

/// Render a Monday-first month calendar, one row per line.
pub fn month_calendar(year: i32, month: u32) -> Option<String> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let days = next.signed_duration_since(first).num_days();

    let title = format!("{} {}", first.format("%B"), year);
    let mut out = format!("{title:^20}").trim_end().to_string();
    out.push('\n');
    out.push_str("Mo Tu We Th Fr Sa Su\n");

    let mut cells: Vec<String> = (0..first.weekday().num_days_from_monday())
        .map(|_| "  ".to_string())
        .collect();
    cells.extend((1..=days).map(|day| format!("{day:>2}")));
    for week in cells.chunks(7) {
        out.push_str(week.join(" ").trim_end());
        out.push('\n');
    }
    Some(out)
}

/// Posts the calendar of January 2020.
pub struct Domination;

impl Callback for Domination {
    fn name(&self) -> &str {
        "domination"
    }

    fn call(&self, client: &mut dyn Client, inv: &Invocation<'_>) -> CallbackResult {
        let calendar = month_calendar(2020, 1)
            .ok_or_else(|| CallbackError::Internal("invalid calendar month".into()))?;
        client.send_message(inv.room, &calendar);
        Ok(())
    }
}

/// Reports the host operating system.
pub struct Platform {
    system: String,
}

impl Platform {
    pub fn new() -> Self {
        Self::with_system(system_name(std::env::consts::OS))
    }

    pub fn with_system(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a Rust target OS name onto the usual system name.
pub fn system_name(os: &str) -> String {
    match os {
        "linux" | "android" => "Linux".to_string(),
        "macos" | "ios" => "Darwin".to_string(),
        "windows" => "Windows".to_string(),
        "freebsd" => "FreeBSD".to_string(),
        "openbsd" => "OpenBSD".to_string(),
        "netbsd" => "NetBSD".to_string(),
        other => title_case(other),
    }
}

impl Callback for Platform {
    fn name(&self) -> &str {
        "platform"
    }

    fn call(&self, client: &mut dyn Client, inv: &Invocation<'_>) -> CallbackResult {
        client.send_message(inv.room, &format!("This bot runs under GNU/{}", self.system));
        Ok(())
    }
}

/// Announces where the source lives.
pub struct Source;

impl Callback for Source {
    fn name(&self) -> &str {
        "source"
    }

    fn call(&self, client: &mut dyn Client, inv: &Invocation<'_>) -> CallbackResult {
        client.send_message(inv.room, SOURCE_ANNOUNCEMENT);
        Ok(())
    }
}

/// Register every built-in responder.
pub fn register_builtins(
    registry: &mut Registry,
    channels: Arc<dyn ChannelStore>,
    counter: Arc<dyn InterjectCounter>,
    interjection: &str,
    audit_list: &str,
) -> Vec<Handle> {
    vec![
        registry.register_marked(
            GNU_PATTERNS.iter().copied(),
            Arc::new(Gnu::new(counter, interjection)),
            Gnu::marker(channels, audit_list),
        ),
        registry.register(RMS_PATTERNS.iter().copied(), Arc::new(Rms)),
        registry.register(DOMINATION_PATTERNS.iter().copied(), Arc::new(Domination)),
        registry.register(PLATFORM_PATTERNS.iter().copied(), Arc::new(Platform::new())),
        registry.register(SOURCE_PATTERNS.iter().copied(), Arc::new(Source)),
    ]
}
