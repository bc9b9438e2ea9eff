//! Callback guards.
//!
//! A [`Marker`] gates a single callback on a condition over the current chat
//! event:
//!
//! ```text
//! result = relation(supplier(), event.<selector>)
//! result = post_hook_n(...post_hook_1(result))
//! ```
//!
//! The supplier is invoked on every evaluation so that a marker backed by the
//! channel store always sees the current list.

use crate::store::{ChannelStore, StoreError};
use gnubot_proto::ChatEvent;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while evaluating a marker.
#[derive(Debug, Error)]
pub enum MarkerError {
    #[error("supplier failed to read store: {0}")]
    Store(#[from] StoreError),

    #[error("supplier failed: {0}")]
    Supplier(String),
}

/// Chat event field a marker or rule looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selector {
    Room,
    Author,
    Message,
}

impl Selector {
    /// Borrow the selected field from `event`.
    pub fn select<'a>(&self, event: &'a ChatEvent) -> &'a str {
        match self {
            Self::Room => &event.room,
            Self::Author => &event.author,
            Self::Message => &event.message,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Room => "room",
            Self::Author => "author",
            Self::Message => "message",
        })
    }
}

/// Operand of a relation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Set(Vec<String>),
}

/// Binary relation, applied in its natural argument order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// `contains(a, b)`: `b` is an element of set `a`, or a substring of text `a`.
    Contains,
    Equals,
    NotEquals,
}

impl Relation {
    pub fn apply(&self, a: &Value, b: &Value) -> bool {
        match self {
            Self::Contains => match (a, b) {
                (Value::Set(items), Value::Text(item)) => items.iter().any(|i| i == item),
                (Value::Set(items), Value::Set(subset)) => {
                    subset.iter().all(|s| items.iter().any(|i| i == s))
                }
                (Value::Text(haystack), Value::Text(needle)) => haystack.contains(needle.as_str()),
                (Value::Text(haystack), Value::Set(needles)) => {
                    needles.iter().all(|n| haystack.contains(n.as_str()))
                }
            },
            Self::Equals => a == b,
            Self::NotEquals => a != b,
        }
    }
}

/// Transform applied to a relation's result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostHook {
    Not,
    Truth,
}

impl PostHook {
    pub fn apply(&self, value: bool) -> bool {
        match self {
            Self::Not => !value,
            Self::Truth => value,
        }
    }
}

type SupplierFn = dyn Fn() -> Result<Vec<String>, MarkerError> + Send + Sync;

/// Zero-argument source of a marker's right-hand operand.
#[derive(Clone)]
pub enum Supplier {
    /// A fixed set.
    Literal(Vec<String>),
    /// A named list in the channel store, read on every call.
    ChannelList {
        store: Arc<dyn ChannelStore>,
        list: String,
    },
    /// Anything else.
    Custom(Arc<SupplierFn>),
}

impl Supplier {
    pub fn literal<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Literal(items.into_iter().map(Into::into).collect())
    }

    pub fn channel_list(store: Arc<dyn ChannelStore>, list: impl Into<String>) -> Self {
        Self::ChannelList {
            store,
            list: list.into(),
        }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn() -> Result<Vec<String>, MarkerError> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Produce the operand.
    pub fn supply(&self) -> Result<Vec<String>, MarkerError> {
        match self {
            Self::Literal(items) => Ok(items.clone()),
            Self::ChannelList { store, list } => Ok(store.channels_in(list)?.collect()),
            Self::Custom(f) => f(),
        }
    }
}

impl fmt::Debug for Supplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(items) => f.debug_tuple("Literal").field(items).finish(),
            Self::ChannelList { list, .. } => {
                f.debug_struct("ChannelList").field("list", list).finish()
            }
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Guard attached to one callback.
#[derive(Clone, Debug)]
pub struct Marker {
    selector: Selector,
    relation: Relation,
    supplier: Supplier,
    post_hooks: Vec<PostHook>,
}

impl Marker {
    pub fn new(selector: Selector, relation: Relation, supplier: Supplier) -> Self {
        Self {
            selector,
            relation,
            supplier,
            post_hooks: Vec::new(),
        }
    }

    /// Fire only when the selected field is a member of the supplied set.
    pub fn within(selector: Selector, supplier: Supplier) -> Self {
        Self::new(selector, Relation::Contains, supplier)
    }

    /// Fire only when the selected field is not a member of the supplied set.
    pub fn excluding(selector: Selector, supplier: Supplier) -> Self {
        Self::within(selector, supplier).with_post_hook(PostHook::Not)
    }

    pub fn with_post_hook(mut self, hook: PostHook) -> Self {
        self.post_hooks.push(hook);
        self
    }

    pub fn selector(&self) -> Selector {
        self.selector
    }

    /// Evaluate against `event`.
    pub fn evaluate(&self, event: &ChatEvent) -> Result<bool, MarkerError> {
        let lhs = Value::Text(self.selector.select(event).to_string());
        let rhs = Value::Set(self.supplier.supply()?);

        let result = self.relation.apply(&rhs, &lhs);
        Ok(self
            .post_hooks
            .iter()
            .fold(result, |acc, hook| hook.apply(acc)))
    }
}
