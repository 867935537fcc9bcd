//! Process-wide variable store bridging simulation state and controller tags.
//!
//! One `VariableStore` is shared by the simulation graph (enable flags in,
//! counters and sensor states out), the controller sync passes, and any
//! inspection dialogs. All access goes through `&self` so the store can sit
//! behind a single `Arc`.
//!
//! Atomicity is per entry: a reader never sees a half-written value, but a
//! sync pass writing several related variables may interleave with a tick
//! that observes only some of them updated. That eventual consistency is a
//! property of the design, not a defect.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// A tagged variable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Who last wrote an entry. Used only for conflict diagnostics, never
/// enforcement: both sides may write any entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarWriter {
    /// The simulation graph's publish phase.
    Simulation,
    /// A controller sync read pass.
    Controller,
    /// UI dialogs and other external callers.
    External,
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    writer: VarWriter,
}

/// Concurrent name -> value table. Entries are created on first write and
/// never implicitly deleted.
#[derive(Debug, Default)]
pub struct VariableStore {
    inner: RwLock<HashMap<String, Entry>>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.get(name).map(|e| e.value.clone())
    }

    /// Write a value on behalf of an external caller (UI, tests).
    pub fn set(&self, name: &str, value: Value) {
        self.set_from(VarWriter::External, name, value);
    }

    /// Write a value, recording who wrote it. Returns whether the stored
    /// value actually changed; writing an identical value is a no-op, so a
    /// repeated controller read pass over unchanged memory leaves the store
    /// untouched.
    pub fn set_from(&self, writer: VarWriter, name: &str, value: Value) -> bool {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        match guard.get_mut(name) {
            Some(entry) => {
                if entry.value == value {
                    return false;
                }
                if entry.writer != writer {
                    log::debug!(
                        "variable '{name}' overwritten by {writer:?} (last writer {:?})",
                        entry.writer
                    );
                }
                entry.value = value;
                entry.writer = writer;
                true
            }
            None => {
                guard.insert(name.to_string(), Entry { value, writer });
                true
            }
        }
    }

    /// All variable names. No ordering guarantee.
    pub fn list_names(&self) -> Vec<String> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.keys().cloned().collect()
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            Value::Bool(b) => Some(b),
            Value::Int(i) => Some(i != 0),
            _ => None,
        }
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            Value::Int(i) => Some(i),
            Value::Bool(b) => Some(b as i64),
            _ => None,
        }
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            Value::Float(f) => Some(f),
            Value::Int(i) => Some(i as f64),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
