//! Document storage seam.
//!
//! [`LocalStore`] reads templates from and writes documents to the local
//! file system. [`MemoryStore`] keeps everything in memory for tests and
//! dry runs.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StorageError;

/// Byte-level storage used by the pipeline.
///
/// Each record writes a uniquely named file, so implementations do not need
/// to serialize writes across files.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError>;

    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError>;

    /// Create `path` and any missing parents. Succeeds if it already exists.
    async fn ensure_dir(&self, path: &Path) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// Local file system
// ---------------------------------------------------------------------------

/// [`DocumentStore`] backed by `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

#[async_trait]
impl DocumentStore for LocalStore {
    async fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        tokio::fs::read(path).await.map_err(|source| StorageError::Read {
            path: path.display().to_string(),
            source,
        })
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        tokio::fs::write(path, bytes)
            .await
            .map_err(|source| StorageError::Write {
                path: path.display().to_string(),
                source,
            })
    }

    async fn ensure_dir(&self, path: &Path) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: path.display().to_string(),
                source,
            })
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// [`DocumentStore`] holding files in a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    dirs: Mutex<HashSet<PathBuf>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file, e.g. a template.
    pub async fn insert(&self, path: impl Into<PathBuf>, bytes: Vec<u8>) {
        self.files.lock().await.insert(path.into(), bytes);
    }

    pub async fn get(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.lock().await.get(path).cloned()
    }

    /// All stored file paths, sorted.
    pub async fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.files.lock().await.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub async fn has_dir(&self, path: &Path) -> bool {
        self.dirs.lock().await.contains(path)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        self.get(path)
            .await
            .ok_or_else(|| StorageError::NotFound(path.display().to_string()))
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        self.files
            .lock()
            .await
            .insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    async fn ensure_dir(&self, path: &Path) -> Result<(), StorageError> {
        self.dirs.lock().await.insert(path.to_path_buf());
        Ok(())
    }
}
