//! Durable store backed by a single JSON file.
//!
//! The whole map is held in memory and rewritten on every mutation. Writes go
//! to a sibling temp file which is then renamed over the store file, so a
//! crash mid-write leaves either the old or the new contents on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{KeyValueStore, StorageError};

/// A [`KeyValueStore`] persisted as a JSON object of string values.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, loading existing contents if the file exists.
    ///
    /// A missing file is an empty store; the file is created on first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str::<BTreeMap<String, String>>(&text).map_err(|e| {
                StorageError::Corrupt {
                    path: path.display().to_string(),
                    message: e.to_string(),
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(io_error(&path, e)),
        };
        tracing::debug!(path = %path.display(), entries = entries.len(), "opened file store");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| io_error(parent, e))?;
            }
        }
        let text = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Backend(format!("could not serialize store: {}", e)))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, text)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_error(&self.path, e))
    }
}

fn io_error(path: &Path, err: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_some() {
            self.flush(&entries).await?;
        }
        Ok(())
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        for key in keys {
            entries.remove(*key);
        }
        if entries.len() != before {
            self.flush(&entries).await?;
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}
