//! Durable storage of the single session token.
//!
//! Storage failures are logged and otherwise ignored: callers always see the
//! operation as done, and a token that cannot be read is simply absent.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::warn;

/// Key under which the bearer token is persisted.
pub const TOKEN_KEY: &str = "authToken";

const STORAGE_FILE: &str = "storage.json";

pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str);
    fn clear(&self);
}

/// Process-local store; the token is gone when the process exits.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.inner.read().expect("rwlock poisoned").clone()
    }

    fn set(&self, token: &str) {
        *self.inner.write().expect("rwlock poisoned") = Some(token.to_owned());
    }

    fn clear(&self) {
        *self.inner.write().expect("rwlock poisoned") = None;
    }
}

/// Key-value document on disk, shared by every process pointed at the same
/// state directory. Last writer wins.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(STORAGE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> BTreeMap<String, String> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return BTreeMap::new(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Failed to read token storage");
                return BTreeMap::new();
            }
        };

        serde_json::from_slice(&raw).unwrap_or_else(|err| {
            warn!(path = %self.path.display(), error = %err, "Ignoring corrupt token storage");
            BTreeMap::new()
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) {
        if let Err(err) = self.try_write(entries) {
            warn!(path = %self.path.display(), error = %err, "Failed to write token storage");
        }
    }

    fn try_write(&self, entries: &BTreeMap<String, String>) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_vec_pretty(entries)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, body)?;
        fs::rename(&staging, &self.path)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        self.read_entries().remove(TOKEN_KEY)
    }

    fn set(&self, token: &str) {
        let mut entries = self.read_entries();
        entries.insert(TOKEN_KEY.to_owned(), token.to_owned());
        self.write_entries(&entries);
    }

    fn clear(&self) {
        let mut entries = self.read_entries();
        if entries.remove(TOKEN_KEY).is_some() {
            self.write_entries(&entries);
        }
    }
}
