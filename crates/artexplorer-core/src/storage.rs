// SPDX-License-Identifier: AGPL-3.0
// ArtExplorer Core - Local persistent key-value store
//
// A small async string store used as the offline cache. The file-backed
// implementation keeps one file per key under the platform data directory.
// No cloud sync, no tracking, just simple local persistence.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::types::AppError;

/// Asynchronous string key-value store
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Read the value stored under `key`, `None` if the key was never written.
    async fn get_string(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Write `value` under `key`, replacing any previous value.
    async fn set_string(&self, key: &str, value: &str) -> Result<(), AppError>;
}

/// File-backed store, one `<key>.json` file per key
pub struct FileLocalStore {
    dir: PathBuf,
}

impl FileLocalStore {
    /// Create a store rooted at the platform data directory.
    pub fn new() -> Result<Self, AppError> {
        let data_dir = directories::ProjectDirs::from("com", "artexplorer", "artexplorer")
            .ok_or_else(|| AppError::FileIo("Could not determine data directory".to_string()))?
            .data_dir()
            .to_path_buf();

        Self::with_dir(data_dir)
    }

    /// Create a store rooted at an explicit directory.
    pub fn with_dir(dir: PathBuf) -> Result<Self, AppError> {
        std::fs::create_dir_all(&dir)
            .map_err(|e| AppError::FileIo(format!("Failed to create data dir: {}", e)))?;

        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl LocalStore for FileLocalStore {
    async fn get_string(&self, key: &str) -> Result<Option<String>, AppError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::FileIo(format!("Failed to read {}: {}", key, e))),
        }
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<(), AppError> {
        tokio::fs::write(self.path_for(key), value)
            .await
            .map_err(|e| AppError::FileIo(format!("Failed to write {}: {}", key, e)))
    }
}

/// In-memory store for tests and previews
#[derive(Default)]
pub struct MemoryLocalStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn get_string(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
