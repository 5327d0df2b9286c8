//! Disk-backed key-value store, one JSON file per session.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::StoreError;

/// Maximum session id length.
const MAX_SESSION_LEN: usize = 64;

/// Distinguishes concurrent writers' temporary files.
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// A validated session identifier, safe to use as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Parse a session id: 1 to 64 ASCII alphanumerics, `-` or `_`.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        let valid_len = !s.is_empty() && s.len() <= MAX_SESSION_LEN;
        let valid_chars = s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

        if valid_len && valid_chars {
            Ok(Self(s.to_string()))
        } else {
            Err(StoreError::InvalidSession(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configuration for the coordinate store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the per-session files.
    pub dir: PathBuf,
}

impl StoreConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        // Default to a directory under the current working directory
        Self::new("sessions")
    }
}

/// Durable key-value store scoped by session.
///
/// IO is blocking; async callers should run it on a blocking thread.
#[derive(Debug, Clone)]
pub struct CoordinateStore {
    config: StoreConfig,
}

impl CoordinateStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Read and deserialize a value. `None` if the key is absent.
    pub fn get<T: DeserializeOwned>(
        &self,
        session: &SessionId,
        key: &str,
    ) -> Result<Option<T>, StoreError> {
        let map = self.load_map(session)?;
        map.get(key)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| StoreError::Data {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    /// Serialize and store a value, replacing any previous one.
    pub fn set<T: Serialize>(
        &self,
        session: &SessionId,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let value = serde_json::to_value(value).map_err(|e| StoreError::Data {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        let mut map = self.load_map(session)?;
        map.insert(key.to_string(), value);
        self.save_map(session, &map)
    }

    /// Remove a key. Removing an absent key is not an error.
    pub fn remove(&self, session: &SessionId, key: &str) -> Result<(), StoreError> {
        let mut map = self.load_map(session)?;
        if map.remove(key).is_some() {
            self.save_map(session, &map)?;
        }
        Ok(())
    }

    /// Delete everything stored for a session.
    pub fn clear(&self, session: &SessionId) -> Result<(), StoreError> {
        match std::fs::remove_file(self.session_path(session)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io {
                message: format!("failed to remove session file: {e}"),
            }),
        }
    }

    fn session_path(&self, session: &SessionId) -> PathBuf {
        self.config.dir.join(format!("{}.json", session.as_str()))
    }

    fn load_map(&self, session: &SessionId) -> Result<Map<String, Value>, StoreError> {
        let path = self.session_path(session);
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    message: format!("failed to read {path:?}: {e}"),
                });
            }
        };

        serde_json::from_str(&contents).map_err(|e| StoreError::Data {
            key: session.to_string(),
            message: format!("corrupt session file: {e}"),
        })
    }

    /// Replace a session file atomically: write a sibling temp file, then
    /// rename it over the old one.
    fn save_map(&self, session: &SessionId, map: &Map<String, Value>) -> Result<(), StoreError> {
        // Create the directory if needed
        let dir = &self.config.dir;
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| StoreError::Io {
                message: format!("failed to create store directory: {e}"),
            })?;
        }

        let json = serde_json::to_string_pretty(map).map_err(|e| StoreError::Data {
            key: session.to_string(),
            message: format!("failed to serialize session: {e}"),
        })?;

        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = dir.join(format!(
            "{}.json.{}-{seq}.tmp",
            session.as_str(),
            std::process::id()
        ));

        std::fs::write(&tmp, json).map_err(|e| StoreError::Io {
            message: format!("failed to write session file: {e}"),
        })?;

        std::fs::rename(&tmp, self.session_path(session)).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            StoreError::Io {
                message: format!("failed to replace session file: {e}"),
            }
        })
    }
}
