//! The mutable key-value bag shared by an action's forward and backward
//! operations.

use crate::Value;
use core::fmt::{self, Debug, Formatter};

/// Key the positional call arguments are seeded under.
pub const ARGS: &str = "__args__";
/// Key the keyword call arguments are seeded under.
pub const KWARGS: &str = "__kwargs__";

/// Transfer state for a single action.
///
/// An insertion-ordered map from string keys to [`Value`]s. When a
/// [`Command`](crate::Command) is called, a fresh transfer state is seeded
/// with the call's positional arguments under [`ARGS`] and its keyword
/// arguments under [`KWARGS`]. The forward operation records under further
/// keys whatever the backward operation needs to reverse it, and the
/// description template is formatted from the same map.
///
/// By convention the forward operation writes here and the backward operation
/// reads; a backward operation should only add data needed by nested undos.
#[derive(Clone, Default, PartialEq)]
pub struct TransferState {
    entries: Vec<(String, Value)>,
}

impl TransferState {
    /// Returns an empty transfer state.
    pub fn new() -> TransferState {
        TransferState::default()
    }

    /// Returns a transfer state seeded with the given call arguments.
    pub fn seeded(args: Vec<Value>, kwargs: Vec<(String, Value)>) -> TransferState {
        let mut state = TransferState::new();
        state.insert(ARGS, Value::List(args));
        state.insert(KWARGS, Value::Map(kwargs));
        state
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Stores `value` under `key`, replacing any previous value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, old)) => *old = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let i = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(i).1)
    }

    /// The positional arguments the action was called with.
    pub fn args(&self) -> &[Value] {
        match self.get(ARGS) {
            Some(Value::List(args)) => args,
            _ => &[],
        }
    }

    /// The positional argument at `i`, if present.
    pub fn arg(&self, i: usize) -> Option<&Value> {
        self.args().get(i)
    }

    /// The keyword argument named `key`, if present.
    pub fn kwarg(&self, key: &str) -> Option<&Value> {
        match self.get(KWARGS) {
            Some(Value::Map(pairs)) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Debug for TransferState {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
