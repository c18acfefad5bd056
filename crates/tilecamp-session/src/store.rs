//! Key-value storage for values that must survive restarts.
//!
//! The client persists exactly one value (its session token), but the
//! store is a plain string map so a host can back it with whatever it
//! already has: browser-style local storage, a settings file, a keychain.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::SessionError;

/// A persistent string map.
pub trait TokenStore {
    /// Returns the value under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Implementation-specific; the value must not be considered persisted
    /// when this fails.
    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError>;
}

/// An in-memory [`TokenStore`]. Values live as long as the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    values: BTreeMap<String, String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A [`TokenStore`] backed by a JSON object file.
///
/// The whole map is rewritten on every `set`. It holds a handful of short
/// strings, so there is nothing to gain from anything smarter.
///
/// ```json
/// { "token": "4be0c6f1d2a9..." }
/// ```
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileTokenStore {
    /// Opens the store at `path`. A missing file is an empty store; the
    /// file (and its parent directories) are created on first `set`.
    ///
    /// # Errors
    /// [`SessionError::Io`] if the file exists but can't be read,
    /// [`SessionError::Json`] if it isn't a JSON object of strings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), entries = values.len(), "token store opened");
        Ok(Self { path, values })
    }

    /// Where this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut next = self.values.clone();
        next.insert(key.to_string(), value.to_string());

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(&next)?)?;

        // Only commit in memory once the write went through.
        self.values = next;
        Ok(())
    }
}
