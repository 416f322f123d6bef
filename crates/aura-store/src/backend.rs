//! Persistence backends
//!
//! [`FileBackend`] keeps one JSON record per artifact id in a directory;
//! each record is written to a temp file and renamed into place, so a record
//! is either fully present or absent. [`MemoryBackend`] persists nothing.

use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use aura_artifact::{Artifact, ArtifactId};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

const RECORD_EXT: &str = "json";
const TEMP_EXT: &str = "json.tmp";

/// Artifact plus the insertion sequence used to break `created_at` ties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub seq: u64,
    pub artifact: Artifact,
}

impl StoredRecord {
    /// Ordering key: oldest first
    #[inline]
    #[must_use]
    pub fn order_key(&self) -> (u64, u64) {
        (self.artifact.created_at().value(), self.seq)
    }
}

/// Result of loading a backend
#[derive(Debug, Default)]
pub struct LoadReport {
    pub records: Vec<StoredRecord>,
    /// Files skipped because they could not be decoded
    pub skipped: Vec<StoreError>,
}

/// Keyed record storage behind the artifact store
#[async_trait::async_trait]
pub trait Backend: Send + Sync + Debug {
    /// Whether writes survive a process restart
    fn is_persistent(&self) -> bool;

    /// Read every stored record
    async fn load(&self) -> Result<LoadReport, StoreError>;

    /// Insert or overwrite records
    async fn write(&self, records: &[StoredRecord]) -> Result<(), StoreError>;

    /// Remove records; absent ids are ignored
    async fn remove(&self, ids: &[ArtifactId]) -> Result<(), StoreError>;

    /// Remove every record
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Non-persistent backend
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryBackend;

#[async_trait::async_trait]
impl Backend for MemoryBackend {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn load(&self) -> Result<LoadReport, StoreError> {
        Ok(LoadReport::default())
    }

    async fn write(&self, _records: &[StoredRecord]) -> Result<(), StoreError> {
        Ok(())
    }

    async fn remove(&self, _ids: &[ArtifactId]) -> Result<(), StoreError> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// One JSON file per artifact in a directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open (creating if needed) a record directory
    ///
    /// # Errors
    /// Returns `StoreError::Unavailable` if the directory cannot be created
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::unavailable(&dir, e))?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: ArtifactId) -> PathBuf {
        self.dir.join(format!("{id}.{RECORD_EXT}"))
    }

    async fn record_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| StoreError::unavailable(&self.dir, e))?;
        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::unavailable(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == RECORD_EXT) {
                files.push(path);
            }
        }
        Ok(files)
    }

    async fn read_record(path: &Path) -> Result<StoredRecord, StoreError> {
        let raw = tokio::fs::read(path)
            .await
            .map_err(|e| StoreError::unavailable(path, e))?;
        serde_json::from_slice(&raw).map_err(|e| StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl Backend for FileBackend {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn load(&self) -> Result<LoadReport, StoreError> {
        let mut report = LoadReport::default();
        for path in self.record_files().await? {
            match Self::read_record(&path).await {
                Ok(record) => report.records.push(record),
                Err(e) if !e.is_fatal() => report.skipped.push(e),
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    async fn write(&self, records: &[StoredRecord]) -> Result<(), StoreError> {
        for record in records {
            let path = self.record_path(record.artifact.id());
            let tmp = path.with_extension(TEMP_EXT);
            let encoded = serde_json::to_vec(record)?;
            tokio::fs::write(&tmp, encoded)
                .await
                .map_err(|e| StoreError::unavailable(&tmp, e))?;
            tokio::fs::rename(&tmp, &path)
                .await
                .map_err(|e| StoreError::unavailable(&path, e))?;
        }
        Ok(())
    }

    async fn remove(&self, ids: &[ArtifactId]) -> Result<(), StoreError> {
        for id in ids {
            let path = self.record_path(*id);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::unavailable(&path, e)),
            }
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        for path in self.record_files().await? {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::unavailable(&path, e)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_test_utils::fixtures;

    #[tokio::test]
    async fn file_roundtrip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path().join("records")).await.unwrap();
        let record = StoredRecord {
            seq: 3,
            artifact: fixtures::image_artifact(aura_artifact::Category::Avatar, 10),
        };

        backend.write(std::slice::from_ref(&record)).await.unwrap();
        let report = backend.load().await.unwrap();
        assert_eq!(report.records, vec![record.clone()]);

        backend.remove(&[record.artifact.id()]).await.unwrap();
        // removing twice is fine
        backend.remove(&[record.artifact.id()]).await.unwrap();
        assert!(backend.load().await.unwrap().records.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).await.unwrap();
        let good = StoredRecord {
            seq: 0,
            artifact: fixtures::image_artifact(aura_artifact::Category::Product, 1),
        };
        backend.write(std::slice::from_ref(&good)).await.unwrap();
        std::fs::write(dir.path().join("broken.json"), b"{not json").unwrap();
        // temp leftovers are ignored
        std::fs::write(dir.path().join("x.json.tmp"), b"partial").unwrap();

        let report = backend.load().await.unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.skipped.len(), 1);
    }

    #[tokio::test]
    async fn clear_removes_records() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).await.unwrap();
        let records: Vec<_> = (0..3)
            .map(|i| StoredRecord {
                seq: i,
                artifact: fixtures::image_artifact(aura_artifact::Category::Carousel, i),
            })
            .collect();
        backend.write(&records).await.unwrap();
        backend.clear().await.unwrap();
        assert!(backend.load().await.unwrap().records.is_empty());
    }
}
