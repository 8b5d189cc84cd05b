//! Ordered argument snapshots

use std::fmt;

use super::value::{self, CapturedValue, Reactive};

/// Parameter name to captured value, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    entries: Vec<(&'static str, Option<CapturedValue>)>,
}

/// Shared snapshot for functions without captured parameters
pub static EMPTY_ARGUMENTS: Arguments = Arguments::new();

impl Arguments {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Store an already captured value; `None` records an absent one
    pub fn push_captured(&mut self, name: &'static str, value: Option<CapturedValue>) {
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn push<T: fmt::Debug + ?Sized>(&mut self, name: &'static str, value: &T) {
        self.push_captured(name, Some(CapturedValue::capture(value)));
    }

    /// Capture the current value of a reactive wrapper
    pub fn push_reactive<R>(&mut self, name: &'static str, value: &R)
    where
        R: Reactive + ?Sized,
        R::Value: fmt::Debug,
    {
        self.push_captured(name, Some(CapturedValue::capture_reactive(value)));
    }

    pub fn push_optional<T: fmt::Debug + ?Sized>(&mut self, name: &'static str, value: Option<&T>) {
        self.push_captured(name, value.map(CapturedValue::capture));
    }

    pub fn push_absent(&mut self, name: &'static str) {
        self.push_captured(name, None);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| *key == name)
    }

    /// `None` when the name is not present, `Some(None)` for an absent value
    pub fn entry(&self, name: &str) -> Option<Option<&CapturedValue>> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_ref())
    }

    pub fn value(&self, name: &str) -> Option<&CapturedValue> {
        self.entry(name).flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&CapturedValue>)> + '_ {
        self.entries.iter().map(|(name, value)| (*name, value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the contents with a copy of `other`, reusing the allocation
    pub fn copy_from(&mut self, other: &Arguments) {
        self.entries.clear();
        self.entries.extend(other.entries.iter().cloned());
    }

    /// `name: value` pairs joined by commas, or `no arguments`
    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            return "no arguments".to_string();
        }
        self.iter()
            .map(|(name, value)| format!("{}: {}", name, value::render(value)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
