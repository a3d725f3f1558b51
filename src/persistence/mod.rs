//! Snapshot persistence.
//!
//! The whole engine state (role table, proposal table, ballot table, phase,
//! price, administrators, event log) is written as one versioned CBOR
//! snapshot. File writes go to `<path>.tmp` first and are renamed over the
//! target, so readers only ever see a complete snapshot.
//!
//! Writers in different processes serialize on [`SnapshotStore::lock`]: an
//! exclusive advisory lock on `<path>.lock`, held from the load that a
//! mutation starts from until its save has landed.

use crate::governance::GovernanceEngine;
use crate::serialization::{from_cbor, to_cbor, SerializationError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

/// Current snapshot schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Persistence errors.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error("Unsupported snapshot schema version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Corrupt snapshot: {0}")]
    Corrupt(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// On-disk envelope. Envelopes written before versioning read as version 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub schema_version: u32,
    pub engine: GovernanceEngine,
}

impl Snapshot {
    pub fn new(engine: GovernanceEngine) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            engine,
        }
    }

    pub fn to_bytes(&self) -> PersistenceResult<Vec<u8>> {
        Ok(to_cbor(self)?)
    }

    /// Decode, then reject unknown versions and inconsistent state.
    pub fn from_bytes(bytes: &[u8]) -> PersistenceResult<Self> {
        let snapshot: Snapshot = from_cbor(bytes)?;
        if snapshot.schema_version > SCHEMA_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: snapshot.schema_version,
                supported: SCHEMA_VERSION,
            });
        }
        snapshot
            .engine
            .check_consistency()
            .map_err(PersistenceError::Corrupt)?;
        Ok(snapshot)
    }
}

/// Exclusive write access to a store. Released on drop.
#[derive(Debug)]
pub struct StoreLock {
    _held: Held,
}

// Held only for release on drop.
#[allow(dead_code)]
#[derive(Debug)]
enum Held {
    File(File),
    Memory(OwnedMutexGuard<()>),
}

/// Storage backend for engine snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the latest snapshot, `None` if nothing has been saved yet.
    async fn load(&self) -> PersistenceResult<Option<GovernanceEngine>>;

    /// Replace the stored snapshot. Callers mutating state hold [`Self::lock`].
    async fn save(&self, engine: &GovernanceEngine) -> PersistenceResult<()>;

    /// Wait for exclusive write access, across processes where the backend
    /// is shared between them.
    async fn lock(&self) -> PersistenceResult<StoreLock>;
}

/// Snapshot file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.sibling(".lock")
    }

    async fn create_parent(&self) -> PersistenceResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.io_error(e))?;
            }
        }
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self) -> PersistenceResult<Option<GovernanceEngine>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        let snapshot = Snapshot::from_bytes(&bytes)?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "snapshot loaded");
        Ok(Some(snapshot.engine))
    }

    async fn save(&self, engine: &GovernanceEngine) -> PersistenceResult<()> {
        let bytes = Snapshot::new(engine.clone()).to_bytes()?;
        self.create_parent().await?;

        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "snapshot saved");
        Ok(())
    }

    async fn lock(&self) -> PersistenceResult<StoreLock> {
        self.create_parent().await?;
        let lock_path = self.lock_path();

        let acquired = tokio::task::spawn_blocking(move || -> std::io::Result<File> {
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .read(true)
                .write(true)
                .open(&lock_path)?;
            FileExt::lock_exclusive(&file)?;
            Ok(file)
        })
        .await
        .map_err(|e| self.io_error(std::io::Error::other(e)))?;

        let file = acquired.map_err(|e| PersistenceError::Io {
            path: self.lock_path(),
            source: e,
        })?;
        debug!(path = %self.path.display(), "snapshot lock acquired");
        Ok(StoreLock {
            _held: Held::File(file),
        })
    }
}

/// In-memory store holding encoded snapshots, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    bytes: Mutex<Option<Vec<u8>>>,
    writer: Arc<tokio::sync::Mutex<()>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.lock().map(|b| b.is_none()).unwrap_or(true)
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> PersistenceResult<Option<GovernanceEngine>> {
        let guard = self
            .bytes
            .lock()
            .map_err(|_| PersistenceError::Corrupt("snapshot lock poisoned".to_string()))?;
        match guard.as_deref() {
            Some(bytes) => Ok(Some(Snapshot::from_bytes(bytes)?.engine)),
            None => Ok(None),
        }
    }

    async fn save(&self, engine: &GovernanceEngine) -> PersistenceResult<()> {
        let bytes = Snapshot::new(engine.clone()).to_bytes()?;
        let mut guard = self
            .bytes
            .lock()
            .map_err(|_| PersistenceError::Corrupt("snapshot lock poisoned".to_string()))?;
        *guard = Some(bytes);
        Ok(())
    }

    async fn lock(&self) -> PersistenceResult<StoreLock> {
        let guard = self.writer.clone().lock_owned().await;
        Ok(StoreLock {
            _held: Held::Memory(guard),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::AccountId;
    use tempfile::TempDir;

    fn engine() -> GovernanceEngine {
        let admin = AccountId::new("admin").unwrap();
        let mut engine = GovernanceEngine::new([admin.clone()], 100).unwrap();
        engine
            .add_member(&admin, AccountId::new("p1").unwrap(), true)
            .unwrap();
        engine
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("state.cbor"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("nested").join("state.cbor"));
        let engine = engine();

        store.save(&engine).await.unwrap();
        assert!(store.path().exists());
        assert!(!store.temp_path().exists());

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, engine);
    }

    #[tokio::test]
    async fn test_file_store_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.cbor");
        std::fs::write(&path, b"not cbor").unwrap();

        let store = FileSnapshotStore::new(&path);
        assert!(matches!(
            store.load().await,
            Err(PersistenceError::Serialization(_))
        ));
    }

    #[test]
    fn test_future_schema_rejected() {
        let snapshot = Snapshot {
            schema_version: SCHEMA_VERSION + 1,
            engine: engine(),
        };
        let bytes = snapshot.to_bytes().unwrap();
        assert!(matches!(
            Snapshot::from_bytes(&bytes),
            Err(PersistenceError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_unversioned_envelope_loads_as_version_zero() {
        #[derive(Serialize)]
        struct Unversioned {
            engine: GovernanceEngine,
        }

        let engine = engine();
        let bytes = to_cbor(&Unversioned {
            engine: engine.clone(),
        })
        .unwrap();

        let snapshot = Snapshot::from_bytes(&bytes).unwrap();
        assert_eq!(snapshot.schema_version, 0);
        assert_eq!(snapshot.engine, engine);
    }

    #[tokio::test]
    async fn test_file_lock_is_exclusive_across_handles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.cbor");
        let first = FileSnapshotStore::new(&path);
        let second = FileSnapshotStore::new(&path);

        let held = first.lock().await.unwrap();
        assert!(first.lock_path().exists());
        let blocked =
            tokio::time::timeout(std::time::Duration::from_millis(200), second.lock()).await;
        assert!(blocked.is_err());

        drop(held);
        let reacquired =
            tokio::time::timeout(std::time::Duration::from_secs(5), second.lock()).await;
        assert!(matches!(reacquired, Ok(Ok(_))));
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemorySnapshotStore::new();
        assert!(store.is_empty());
        assert!(store.load().await.unwrap().is_none());

        let engine = engine();
        store.save(&engine).await.unwrap();
        assert!(!store.is_empty());
        assert_eq!(store.load().await.unwrap().unwrap(), engine);
    }
}
