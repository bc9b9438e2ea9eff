//! Pattern registry.
//!
//! Maps an ordered tuple of keyword patterns to the callbacks registered for
//! it. Registrations are kept in insertion order, and so are the callbacks
//! inside each registration.
//!
//! Tuples are compared by value and order: `["a", "b"]` and `["b", "a"]` are
//! two separate registrations even though they match the same messages.

use crate::dispatch::Client;
use crate::error::CallbackResult;
use crate::marker::Marker;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Arguments handed to a callback.
#[derive(Clone, Copy, Debug)]
pub struct Invocation<'a> {
    pub room: &'a str,
    pub author: &'a str,
    pub message: &'a str,
    /// Patterns that hit, in registration tuple order. Never empty.
    pub matches: &'a [String],
}

/// A reply callback.
pub trait Callback: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Run the callback. Replies go through `client`.
    fn call(&self, client: &mut dyn Client, invocation: &Invocation<'_>) -> CallbackResult;
}

/// Adapter turning a closure into a [`Callback`].
pub struct FnCallback<F> {
    name: String,
    f: F,
}

impl<F> FnCallback<F>
where
    F: Fn(&mut dyn Client, &Invocation<'_>) -> CallbackResult + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Callback for FnCallback<F>
where
    F: Fn(&mut dyn Client, &Invocation<'_>) -> CallbackResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, client: &mut dyn Client, invocation: &Invocation<'_>) -> CallbackResult {
        (self.f)(client, invocation)
    }
}

/// A callback and its optional guard.
#[derive(Clone)]
pub struct Entry {
    callback: Arc<dyn Callback>,
    marker: Option<Marker>,
}

impl Entry {
    pub fn callback(&self) -> &dyn Callback {
        self.callback.as_ref()
    }

    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    pub fn name(&self) -> &str {
        self.callback.name()
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("callback", &self.callback.name())
            .field("marker", &self.marker)
            .finish()
    }
}

/// One pattern tuple and its callbacks.
#[derive(Clone, Debug)]
pub struct Registration {
    patterns: Vec<String>,
    entries: Vec<Entry>,
}

impl Registration {
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Patterns contained in `lowered` (an already lower-cased message), in
    /// tuple order.
    pub fn matches(&self, lowered: &str) -> Vec<String> {
        self.patterns
            .iter()
            .filter(|p| lowered.contains(p.as_str()))
            .cloned()
            .collect()
    }
}

/// Opaque handle to a registered callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    registration: usize,
    position: usize,
}

/// Ordered mapping from pattern tuples to callbacks.
#[derive(Debug, Default)]
pub struct Registry {
    registrations: Vec<Registration>,
    index: HashMap<Vec<String>, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `patterns`. Patterns are lower-cased.
    pub fn register<I, S>(&mut self, patterns: I, callback: Arc<dyn Callback>) -> Handle
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.insert(patterns, Entry {
            callback,
            marker: None,
        })
    }

    /// Register `callback` under `patterns`, guarded by `marker`.
    pub fn register_marked<I, S>(
        &mut self,
        patterns: I,
        callback: Arc<dyn Callback>,
        marker: Marker,
    ) -> Handle
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.insert(patterns, Entry {
            callback,
            marker: Some(marker),
        })
    }

    fn insert<I, S>(&mut self, patterns: I, entry: Entry) -> Handle
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().to_lowercase())
            .collect();

        let registration = match self.index.get(&patterns) {
            Some(&idx) => idx,
            None => {
                let idx = self.registrations.len();
                self.index.insert(patterns.clone(), idx);
                self.registrations.push(Registration {
                    patterns,
                    entries: Vec::new(),
                });
                idx
            }
        };

        let entries = &mut self.registrations[registration].entries;
        entries.push(entry);
        Handle {
            registration,
            position: entries.len() - 1,
        }
    }

    /// All registrations in registration order.
    pub fn all(&self) -> std::slice::Iter<'_, Registration> {
        self.registrations.iter()
    }

    /// Look up a registered callback.
    pub fn get(&self, handle: Handle) -> Option<&Entry> {
        self.registrations
            .get(handle.registration)?
            .entries
            .get(handle.position)
    }

    /// Number of distinct pattern tuples.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Number of registered callbacks across all tuples.
    pub fn callback_count(&self) -> usize {
        self.registrations.iter().map(|r| r.entries.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::{Selector, Supplier};

    fn noop(name: &str) -> Arc<dyn Callback> {
        Arc::new(FnCallback::new(name, |_: &mut dyn Client, _: &Invocation<'_>| Ok(())))
    }

    #[test]
    fn test_same_tuple_appends() {
        let mut registry = Registry::new();
        let first = registry.register(["linux"], noop("first"));
        let second = registry.register(["linux"], noop("second"));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.callback_count(), 2);
        assert_eq!(registry.get(first).map(Entry::name), Some("first"));
        assert_eq!(registry.get(second).map(Entry::name), Some("second"));
    }

    #[test]
    fn test_tuple_order_matters() {
        let mut registry = Registry::new();
        registry.register(["nano", "emacs"], noop("a"));
        registry.register(["emacs", "nano"], noop("b"));

        assert_eq!(registry.len(), 2);
        let patterns: Vec<&[String]> = registry.all().map(Registration::patterns).collect();
        assert_eq!(patterns[0], ["nano", "emacs"]);
        assert_eq!(patterns[1], ["emacs", "nano"]);
    }

    #[test]
    fn test_patterns_are_lowercased() {
        let mut registry = Registry::new();
        registry.register(["Linux"], noop("a"));
        registry.register(["linux"], noop("b"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_all_preserves_insertion_order() {
        let mut registry = Registry::new();
        registry.register(["c"], noop("c"));
        registry.register(["a"], noop("a"));
        registry.register(["b"], noop("b"));

        let order: Vec<&str> = registry
            .all()
            .map(|r| r.patterns()[0].as_str())
            .collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_marked_entry_keeps_marker() {
        let mut registry = Registry::new();
        let handle = registry.register_marked(
            ["gnu"],
            noop("guarded"),
            crate::marker::Marker::excluding(Selector::Room, Supplier::literal(["#safe"])),
        );
        assert!(registry.get(handle).and_then(Entry::marker).is_some());
    }

    #[test]
    fn test_registration_matches_in_tuple_order() {
        let mut registry = Registry::new();
        registry.register(["vim", "emacs", "nano"], noop("x"));
        let registration = registry.all().next().unwrap();

        assert_eq!(
            registration.matches("nano and vim and ed"),
            vec!["vim".to_string(), "nano".to_string()]
        );
        assert!(registration.matches("ed is the standard editor").is_empty());
    }
}
