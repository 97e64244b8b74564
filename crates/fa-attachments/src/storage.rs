//! Remote storage abstraction
//!
//! A unified interface over the remote file store. The production
//! backend speaks FTP ([`crate::ftp::FtpStorage`]); tests run against
//! the in-memory backend, which also records every call so tests can
//! assert that a skipped operation issued no remote traffic.

use std::collections::HashMap;
use std::io::{Seek, Write};
use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::partition::RemotePath;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Remote file not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("FTP protocol error: {0}")]
    Protocol(String),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Remote storage trait - one fresh session per call, no reuse.
#[async_trait]
pub trait RemoteStorage: Send + Sync {
    /// Download the remote file into a local temporary file. The caller
    /// owns the handle and its lifetime.
    async fn fetch(&self, path: &RemotePath) -> StorageResult<NamedTempFile>;

    /// Upload a local file to the remote path, creating missing parent
    /// directories best-effort first.
    async fn store(&self, local: &Path, path: &RemotePath) -> StorageResult<()>;

    /// Move a remote file.
    async fn rename(&self, from: &RemotePath, to: &RemotePath) -> StorageResult<()>;

    /// Delete a remote file. Backends report a missing file truthfully;
    /// the service layer decides whether that matters.
    async fn delete(&self, path: &RemotePath) -> StorageResult<()>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// In-memory storage for testing.
pub struct MemoryStorage {
    files: RwLock<HashMap<String, Bytes>>,
    calls: RwLock<Vec<String>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Seed a remote file.
    pub async fn insert(&self, path: &RemotePath, data: impl Into<Bytes>) {
        let mut files = self.files.write().await;
        files.insert(path.to_string(), data.into());
    }

    pub async fn contains(&self, path: &RemotePath) -> bool {
        let files = self.files.read().await;
        files.contains_key(&path.to_string())
    }

    /// Every operation issued against this backend, in order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    async fn record(&self, call: String) {
        self.calls.write().await.push(call);
    }
}

#[async_trait]
impl RemoteStorage for MemoryStorage {
    async fn fetch(&self, path: &RemotePath) -> StorageResult<NamedTempFile> {
        self.record(format!("fetch {}", path)).await;

        let files = self.files.read().await;
        let data = files
            .get(&path.to_string())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))?;

        let mut file = NamedTempFile::new()?;
        file.write_all(data)?;
        file.flush()?;
        file.rewind()?;
        Ok(file)
    }

    async fn store(&self, local: &Path, path: &RemotePath) -> StorageResult<()> {
        self.record(format!("store {}", path)).await;

        let data = tokio::fs::read(local).await?;
        let mut files = self.files.write().await;
        files.insert(path.to_string(), Bytes::from(data));
        Ok(())
    }

    async fn rename(&self, from: &RemotePath, to: &RemotePath) -> StorageResult<()> {
        self.record(format!("rename {} {}", from, to)).await;

        let mut files = self.files.write().await;
        let data = files
            .remove(&from.to_string())
            .ok_or_else(|| StorageError::NotFound(from.to_string()))?;
        files.insert(to.to_string(), data);
        Ok(())
    }

    async fn delete(&self, path: &RemotePath) -> StorageResult<()> {
        self.record(format!("delete {}", path)).await;

        let mut files = self.files.write().await;
        files
            .remove(&path.to_string())
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn path(s: &str) -> RemotePath {
        RemotePath::from_base(s)
    }

    #[tokio::test]
    async fn test_memory_store_fetch() {
        let storage = MemoryStorage::new();
        let local = NamedTempFile::new().unwrap();
        std::fs::write(local.path(), b"hello").unwrap();

        storage.store(local.path(), &path("/uploads/a.txt")).await.unwrap();
        assert!(storage.contains(&path("/uploads/a.txt")).await);

        let mut fetched = storage.fetch(&path("/uploads/a.txt")).await.unwrap();
        let mut buffer = Vec::new();
        fetched.read_to_end(&mut buffer).unwrap();
        assert_eq!(buffer, b"hello");
    }

    #[tokio::test]
    async fn test_memory_fetch_missing() {
        let storage = MemoryStorage::new();
        let result = storage.fetch(&path("/uploads/missing.txt")).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_memory_rename_moves_data() {
        let storage = MemoryStorage::new();
        storage.insert(&path("/uploads/old.txt"), &b"data"[..]).await;

        storage
            .rename(&path("/uploads/old.txt"), &path("/uploads/new.txt"))
            .await
            .unwrap();

        assert!(!storage.contains(&path("/uploads/old.txt")).await);
        assert!(storage.contains(&path("/uploads/new.txt")).await);
    }

    #[tokio::test]
    async fn test_memory_delete_missing_reports_not_found() {
        let storage = MemoryStorage::new();
        let result = storage.delete(&path("/uploads/missing.txt")).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_memory_records_calls() {
        let storage = MemoryStorage::new();
        storage.insert(&path("/uploads/a.txt"), &b"x"[..]).await;
        storage.delete(&path("/uploads/a.txt")).await.unwrap();

        assert_eq!(storage.calls().await, vec!["delete /uploads/a.txt"]);
    }
}
