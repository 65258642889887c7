//! Where variable values come from.
//!
//! Resolution only ever asks a [`ReadEnv`] for values, so tests and the CLI
//! can validate an in-memory snapshot without touching the process
//! environment.

use std::collections::BTreeMap;
use std::env::{self, VarError};

/// Read access to a set of named string variables.
pub trait ReadEnv {
    /// The value of `key`, or `None` if it is unset.
    fn var(&self, key: &str) -> Option<String>;
}

/// The current process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        match env::var(key) {
            Ok(value) => Some(value),
            Err(VarError::NotPresent) => None,
            Err(VarError::NotUnicode(_)) => {
                tracing::warn!(variable = key, "ignoring non UTF-8 environment value");
                None
            }
        }
    }
}

/// An owned snapshot of variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }

    /// Snapshot the whole process environment, skipping non UTF-8 entries.
    pub fn from_system() -> Self {
        env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    /// Layer `other` on top of `self`; keys already present in `self` win.
    pub fn merge_missing(mut self, other: impl IntoIterator<Item = (String, String)>) -> Self {
        for (key, value) in other {
            self.vars.entry(key).or_insert(value);
        }
        self
    }
}

impl ReadEnv for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
