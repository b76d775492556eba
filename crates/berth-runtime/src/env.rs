use crate::RuntimeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One environment entry: `KEY=VALUE`, or a bare `KEY` when `value` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvEntry {
    pub key: String,
    pub value: Option<String>,
}

impl EnvEntry {
    /// Split on the first `=`. The value keeps everything after it, minus
    /// trailing whitespace.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('=') {
            Some((key, value)) => Self {
                key: key.to_owned(),
                value: Some(value.trim_end().to_owned()),
            },
            None => Self {
                key: raw.to_owned(),
                value: None,
            },
        }
    }
}

impl fmt::Display for EnvEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(ref v) => write!(f, "{}={v}", self.key),
            None => f.write_str(&self.key),
        }
    }
}

/// Ordered environment with unique keys.
///
/// Keys keep the position where they were first introduced; replacing a value
/// does not move its entry and new keys go at the end. A merge with no
/// overrides hands back the old entries as they were, duplicates included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentSet {
    entries: Vec<EnvEntry>,
}

impl EnvironmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from raw strings. A repeated key stays at its first
    /// position and takes the last value seen.
    pub fn from_entries<S: AsRef<str>>(raw: &[S]) -> Self {
        let mut set = Self::new();
        for entry in raw {
            set.insert(EnvEntry::parse(entry.as_ref()));
        }
        set
    }

    /// Keep `raw` exactly as given: no trimming, duplicates left in place.
    fn verbatim<S: AsRef<str>>(raw: &[S]) -> Self {
        let entries = raw
            .iter()
            .map(|r| match r.as_ref().split_once('=') {
                Some((key, value)) => EnvEntry {
                    key: key.to_owned(),
                    value: Some(value.to_owned()),
                },
                None => EnvEntry {
                    key: r.as_ref().to_owned(),
                    value: None,
                },
            })
            .collect();
        Self { entries }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }

    fn insert(&mut self, entry: EnvEntry) {
        match self.position(&entry.key) {
            Some(i) => self.entries[i] = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.insert(EnvEntry {
            key: key.to_owned(),
            value: Some(value.trim_end().to_owned()),
        });
    }

    /// Remove `key`, returning whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&EnvEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Value bound to `key`; bare keys and missing keys both yield `None`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|e| e.value.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnvEntry> {
        self.entries.iter()
    }

    /// Render back to `KEY=VALUE` / `KEY` strings in set order.
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

/// Check that every entry is `KEY=VALUE` or a bare `KEY` with a non-empty key.
pub fn validate_env<S: AsRef<str>>(entries: &[S]) -> Result<(), RuntimeError> {
    for raw in entries {
        let raw = raw.as_ref();
        let key = raw.split_once('=').map_or(raw, |(k, _)| k);
        if key.is_empty() {
            return Err(RuntimeError::InvalidEnvEntry(raw.to_owned()));
        }
    }
    Ok(())
}

/// Merge override directives in `new_env` into `old_env`.
///
/// `KEY=VALUE` updates a key in place or appends it; a bare `KEY` deletes it.
/// Every override is validated first, so an invalid entry yields an error and
/// nothing else. Sets are applied before deletes. With no overrides `old_env`
/// comes back untouched.
pub fn merge_env<N, O>(new_env: &[N], old_env: &[O]) -> Result<EnvironmentSet, RuntimeError>
where
    N: AsRef<str>,
    O: AsRef<str>,
{
    validate_env(new_env)?;

    if new_env.is_empty() {
        return Ok(EnvironmentSet::verbatim(old_env));
    }

    let mut merged = EnvironmentSet::from_entries(old_env);
    let overrides: Vec<EnvEntry> = new_env.iter().map(|r| EnvEntry::parse(r.as_ref())).collect();

    for entry in &overrides {
        if let Some(ref value) = entry.value {
            merged.set(&entry.key, value);
        }
    }
    for entry in overrides.iter().filter(|e| e.value.is_none()) {
        if merged.remove(&entry.key) {
            tracing::debug!("environment key '{}' removed by override", entry.key);
        }
    }

    Ok(merged)
}
