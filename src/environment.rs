//! Explicit environment maps
//!
//! The build never mutates the ambient process environment. `main` captures
//! it once, and everything downstream receives an [`Environment`] value that
//! is merged with "set if absent" semantics before being handed to a child
//! process.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::Path;
use tracing::{debug, warn};

/// An ordered set of environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
    /// Variables that are not valid unicode, passed to children untouched
    raw: BTreeMap<OsString, OsString>,
}

impl Environment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment
    pub fn capture() -> Self {
        Self::from_os_vars(std::env::vars_os())
    }

    /// Build from OS strings
    ///
    /// Variables that are not valid unicode cannot be read or merged, but
    /// they still reach child processes through [`Environment::iter_os`].
    pub fn from_os_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> Self {
        let mut env = Self::new();
        for (key, value) in vars {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => env.set(key, value),
                (key, value) => {
                    let key = key.map(OsString::from).unwrap_or_else(|k| k);
                    let value = value.map(OsString::from).unwrap_or_else(|v| v);
                    debug!("Passing through non-unicode variable {}", key.to_string_lossy());
                    env.raw.insert(key, value);
                }
            }
        }
        env
    }

    /// Get a variable
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Check whether a variable is present
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Set a variable, overriding any existing value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Set a variable only if it is not already present
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Builder-style variant of [`Environment::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Append a directory to a path-list variable such as `PATH`
    pub fn append_path(&mut self, key: &str, dir: &Path) {
        let mut entries: Vec<OsString> = self
            .get(key)
            .map(|v| std::env::split_paths(v).map(|p| p.into_os_string()).collect())
            .unwrap_or_default();
        entries.push(dir.as_os_str().to_os_string());

        match std::env::join_paths(entries) {
            Ok(joined) => self.set(key, joined.to_string_lossy().into_owned()),
            Err(e) => warn!("Leaving {} unchanged, cannot add {}: {}", key, dir.display(), e),
        }
    }

    /// Iterate over variables in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over every variable as OS strings, for a child process
    ///
    /// Non-unicode variables come first so a unicode variable of the same
    /// name wins.
    pub fn iter_os(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.raw
            .iter()
            .map(|(k, v)| (k.as_os_str(), v.as_os_str()))
            .chain(self.vars.iter().map(|(k, v)| (OsStr::new(k), OsStr::new(v))))
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.vars.len() + self.raw.len()
    }

    /// Whether the environment is empty
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty() && self.raw.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            raw: BTreeMap::new(),
        }
    }
}
