//! Trusted contract and collection identifiers.
//!
//! The list is read from a JSON array of strings on first use and cached
//! until [`Whitelist::invalidate`] or [`Whitelist::reload`]. A missing or
//! malformed file degrades to an empty list with a warning.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tracing::{debug, warn};

/// Default whitelist file, relative to the working directory.
pub const DEFAULT_WHITELIST_PATH: &str = "whitelists.json";

/// Lazily loaded, cached whitelist.
#[derive(Debug)]
pub struct Whitelist {
    path: Option<PathBuf>,
    cache: RwLock<Option<Arc<HashSet<String>>>>,
}

impl Whitelist {
    /// Whitelist backed by a file, loaded on first lookup.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            cache: RwLock::new(None),
        }
    }

    /// Whitelist with fixed entries and no backing file.
    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: HashSet<String> = entries.into_iter().map(Into::into).collect();
        Self {
            path: None,
            cache: RwLock::new(Some(Arc::new(set))),
        }
    }

    /// Backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether `id` is trusted. Loads the file on first call.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries().contains(id)
    }

    /// Current entries, loading them if needed.
    #[must_use]
    pub fn entries(&self) -> Arc<HashSet<String>> {
        if let Some(set) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Arc::clone(set);
        }

        let mut guard = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(set) = guard.as_ref() {
            return Arc::clone(set);
        }
        let set = Arc::new(self.load());
        *guard = Some(Arc::clone(&set));
        set
    }

    /// Drop the cached entries; the next lookup reads the file again.
    ///
    /// Whitelists built with [`Whitelist::from_entries`] become empty.
    pub fn invalidate(&self) {
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Re-read the file now and return the number of entries.
    pub fn reload(&self) -> usize {
        let set = Arc::new(self.load());
        let len = set.len();
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some(set);
        len
    }

    fn load(&self) -> HashSet<String> {
        let Some(path) = &self.path else {
            return HashSet::new();
        };

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "whitelist not readable, using empty list");
                return HashSet::new();
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(items)) => {
                let set: HashSet<String> = items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect();
                debug!(path = %path.display(), entries = set.len(), "loaded whitelist");
                set
            }
            Ok(_) => {
                warn!(path = %path.display(), "whitelist is not an array of strings, using empty list");
                HashSet::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "whitelist is not valid JSON, using empty list");
                HashSet::new()
            }
        }
    }
}

impl Default for Whitelist {
    fn default() -> Self {
        Self::from_path(DEFAULT_WHITELIST_PATH)
    }
}
