//! Declarative reply rules.
//!
//! A rules file is TOML with one `[[rules]]` table per callback:
//!
//! ```toml
//! [[rules]]
//! name = "welcome"
//! handles = ["hello", "good morning"]
//! message = "Welcome to {room}, {author}!"
//!
//! [rules.check]
//! lhs = { field = "author" }
//! relation = "not_equals"
//! rhs = "nightbot"
//! post = ["truth"]
//! ```
//!
//! Operands are `{ field = "room" | "author" | "message" }`,
//! `{ list = "<channel list>" }` or a plain string. The check runs as
//! `relation(lhs, rhs)` followed by each post hook; when it comes out false
//! the rule stays silent. Message placeholders: `{room}`, `{author}`,
//! `{message}`, `{matches}`; `{{` and `}}` produce literal braces.

use crate::dispatch::Client;
use crate::error::CallbackResult;
use crate::marker::{PostHook, Relation, Selector, Value};
use crate::registry::{Callback, Handle, Invocation, Registry};
use crate::store::ChannelStore;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading or compiling rules.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("failed to read rules file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rules: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("rule '{rule}' has no patterns")]
    NoPatterns { rule: String },

    #[error("rule '{rule}' has a blank pattern, which would match every message")]
    BlankPattern { rule: String },

    #[error("rule '{rule}' is defined more than once")]
    Duplicate { rule: String },

    #[error("rule '{rule}' has a bad message template: {reason}")]
    Template { rule: String, reason: String },
}

/// Parsed rules file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// One `[[rules]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    pub name: String,
    pub handles: Handles,
    pub message: String,
    #[serde(default)]
    pub check: Option<CheckSpec>,
}

/// `handles` accepts a single pattern or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Handles {
    One(String),
    Many(Vec<String>),
}

impl Handles {
    pub fn patterns(&self) -> Vec<String> {
        match self {
            Self::One(p) => vec![p.clone()],
            Self::Many(ps) => ps.clone(),
        }
    }
}

/// `check = { lhs, relation, rhs, post }`
#[derive(Debug, Clone, Deserialize)]
pub struct CheckSpec {
    pub lhs: OperandSpec,
    pub relation: Relation,
    pub rhs: OperandSpec,
    #[serde(default)]
    pub post: Vec<PostHook>,
}

/// Operand of a check.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OperandSpec {
    Field { field: Selector },
    List { list: String },
    Literal(String),
}

impl OperandSpec {
    fn resolve(&self, inv: &Invocation<'_>, store: &dyn ChannelStore) -> CallbackResult<Value> {
        Ok(match self {
            Self::Field { field } => Value::Text(
                match field {
                    Selector::Room => inv.room,
                    Selector::Author => inv.author,
                    Selector::Message => inv.message,
                }
                .to_string(),
            ),
            Self::List { list } => Value::Set(store.channels_in(list)?.collect()),
            Self::Literal(text) => Value::Text(text.clone()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Room,
    Author,
    Message,
    Matches,
}

/// Compiled message template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Compile `source`, rejecting unknown or unterminated placeholders.
    pub fn parse(source: &str) -> Result<Self, String> {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    text.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    text.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => name.push(ch),
                            None => return Err(format!("unterminated placeholder '{{{name}'")),
                        }
                    }
                    let segment = match name.trim() {
                        "room" => Segment::Room,
                        "author" => Segment::Author,
                        "message" => Segment::Message,
                        "matches" => Segment::Matches,
                        other => return Err(format!("unknown placeholder '{other}'")),
                    };
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(segment);
                }
                '}' => return Err("unmatched '}'".to_string()),
                _ => text.push(c),
            }
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Ok(Self { segments })
    }

    pub fn render(&self, inv: &Invocation<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(t) => out.push_str(t),
                Segment::Room => out.push_str(inv.room),
                Segment::Author => out.push_str(inv.author),
                Segment::Message => out.push_str(inv.message),
                Segment::Matches => out.push_str(&inv.matches.join(", ")),
            }
        }
        out
    }
}

/// Callback built from a [`RuleSpec`].
pub struct RuleCallback {
    name: String,
    template: Template,
    check: Option<CheckSpec>,
    store: Arc<dyn ChannelStore>,
}

impl RuleCallback {
    pub fn compile(spec: &RuleSpec, store: Arc<dyn ChannelStore>) -> Result<Self, RuleError> {
        let template = Template::parse(&spec.message).map_err(|reason| RuleError::Template {
            rule: spec.name.clone(),
            reason,
        })?;
        Ok(Self {
            name: spec.name.clone(),
            template,
            check: spec.check.clone(),
            store,
        })
    }

    fn passes(&self, inv: &Invocation<'_>) -> CallbackResult<bool> {
        let Some(check) = &self.check else {
            return Ok(true);
        };
        let lhs = check.lhs.resolve(inv, self.store.as_ref())?;
        let rhs = check.rhs.resolve(inv, self.store.as_ref())?;
        let result = check.relation.apply(&lhs, &rhs);
        Ok(check.post.iter().fold(result, |acc, hook| hook.apply(acc)))
    }
}

impl Callback for RuleCallback {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, client: &mut dyn Client, inv: &Invocation<'_>) -> CallbackResult {
        if !self.passes(inv)? {
            debug!(rule = %self.name, room = %inv.room, "Rule check failed");
            return Ok(());
        }
        client.send_message(inv.room, &self.template.render(inv));
        Ok(())
    }
}

impl RuleSet {
    /// Read and parse a rules file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RuleError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, RuleError> {
        Ok(toml::from_str(content)?)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Compile every rule and register it. Nothing is registered unless all
    /// rules compile.
    pub fn register(
        &self,
        registry: &mut Registry,
        store: Arc<dyn ChannelStore>,
    ) -> Result<Vec<Handle>, RuleError> {
        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(self.rules.len());

        for spec in &self.rules {
            if !seen.insert(spec.name.as_str()) {
                return Err(RuleError::Duplicate {
                    rule: spec.name.clone(),
                });
            }
            let patterns = spec.handles.patterns();
            if patterns.is_empty() {
                return Err(RuleError::NoPatterns {
                    rule: spec.name.clone(),
                });
            }
            if patterns.iter().any(|p| p.trim().is_empty()) {
                return Err(RuleError::BlankPattern {
                    rule: spec.name.clone(),
                });
            }
            compiled.push((patterns, RuleCallback::compile(spec, store.clone())?));
        }

        let handles = compiled
            .into_iter()
            .map(|(patterns, callback)| {
                info!(rule = %callback.name, patterns = ?patterns, "Registered rule");
                registry.register(patterns, Arc::new(callback))
            })
            .collect();
        Ok(handles)
    }
}
