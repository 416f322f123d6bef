//! Bounded artifact store
//!
//! Keyed by artifact id, ordered by `(created_at, insertion seq)`. Every
//! write path enforces the capacity before releasing the lock, so two
//! concurrent writers can never jointly overshoot it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use aura_artifact::{Artifact, ArtifactId, LogicalTimestamp};
use tokio::sync::Mutex;

use crate::backend::{Backend, FileBackend, MemoryBackend, StoredRecord};
use crate::error::StoreError;

/// Default capacity
pub const DEFAULT_CAPACITY: usize = 25;

/// What one write did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Ids removed by capacity eviction, oldest first
    pub evicted: Vec<ArtifactId>,
    /// Whether the write reached durable storage
    pub persisted: bool,
}

#[derive(Debug)]
struct StoreState {
    entries: HashMap<ArtifactId, StoredRecord>,
    next_seq: u64,
    backend: Arc<dyn Backend>,
    /// Durable backend replaced after a failure; its records may be stale
    abandoned: Option<Arc<dyn Backend>>,
}

impl StoreState {
    fn ordered_asc(&self) -> Vec<&StoredRecord> {
        let mut records: Vec<_> = self.entries.values().collect();
        records.sort_by_key(|r| r.order_key());
        records
    }

    /// Drop the oldest entries until `len <= capacity`
    fn evict_surplus(&mut self, capacity: usize) -> Vec<ArtifactId> {
        let surplus = self.entries.len().saturating_sub(capacity);
        if surplus == 0 {
            return Vec::new();
        }
        let victims: Vec<ArtifactId> = self
            .ordered_asc()
            .into_iter()
            .take(surplus)
            .map(|r| r.artifact.id())
            .collect();
        for id in &victims {
            self.entries.remove(id);
        }
        victims
    }

    fn degrade(&mut self, error: &StoreError) {
        if self.backend.is_persistent() {
            tracing::warn!(%error, "artifact persistence unavailable, keeping history in memory");
            let durable = std::mem::replace(&mut self.backend, Arc::new(MemoryBackend));
            self.abandoned = Some(durable);
        }
    }

    /// Best-effort removal from an abandoned backend so removed ids never reload
    ///
    /// Clears the whole backend when the targeted removal fails.
    async fn purge_abandoned(&self, ids: &[ArtifactId]) {
        let Some(stale) = &self.abandoned else {
            return;
        };
        if ids.is_empty() {
            return;
        }
        if let Err(error) = stale.remove(ids).await {
            tracing::warn!(%error, "cannot remove stale artifact records, clearing them");
            self.clear_abandoned().await;
        }
    }

    async fn clear_abandoned(&self) {
        if let Some(stale) = &self.abandoned {
            if let Err(error) = stale.clear().await {
                tracing::error!(%error, "stale artifact records could not be cleared");
            }
        }
    }
}

/// Bounded, ordered artifact collection
///
/// Cheap to clone; clones share state. Never returns persistence errors:
/// a failing backend is logged and replaced by the in-memory one.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    capacity: usize,
    state: Arc<Mutex<StoreState>>,
}

impl ArtifactStore {
    /// Create a non-persistent store
    ///
    /// A capacity of 0 is raised to 1.
    #[must_use]
    pub fn in_memory(capacity: usize) -> Self {
        Self::with_backend_state(capacity, Arc::new(MemoryBackend), HashMap::new(), 0)
    }

    /// Open a store backed by a record directory
    ///
    /// Falls back to memory if the directory cannot be opened or read.
    /// Records beyond capacity (e.g. after lowering it) are evicted on open.
    pub async fn open(dir: impl Into<PathBuf>, capacity: usize) -> Self {
        let dir = dir.into();
        match FileBackend::open(&dir).await {
            Ok(backend) => Self::open_with_backend(Arc::new(backend), capacity).await,
            Err(error) => {
                tracing::warn!(%error, "cannot open artifact store, keeping history in memory");
                Self::in_memory(capacity)
            }
        }
    }

    /// Open a store over an arbitrary backend
    pub async fn open_with_backend(backend: Arc<dyn Backend>, capacity: usize) -> Self {
        let report = match backend.load().await {
            Ok(report) => report,
            Err(error) => {
                tracing::warn!(%error, "cannot load artifact store, keeping history in memory");
                return Self::in_memory(capacity);
            }
        };
        for error in &report.skipped {
            tracing::warn!(%error, "skipping unreadable artifact record");
        }

        let next_seq = report
            .records
            .iter()
            .map(|r| r.seq + 1)
            .max()
            .unwrap_or(0);
        let entries = report
            .records
            .into_iter()
            .map(|r| (r.artifact.id(), r))
            .collect();
        tracing::debug!(next_seq, "artifact store loaded");

        let store = Self::with_backend_state(capacity, backend, entries, next_seq);
        {
            let mut state = store.state.lock().await;
            let evicted = state.evict_surplus(store.capacity);
            if !evicted.is_empty() {
                let result = state.backend.remove(&evicted).await;
                if let Err(error) = result {
                    state.degrade(&error);
                    state.purge_abandoned(&evicted).await;
                }
            }
        }
        store
    }

    fn with_backend_state(
        capacity: usize,
        backend: Arc<dyn Backend>,
        entries: HashMap<ArtifactId, StoredRecord>,
        next_seq: u64,
    ) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Arc::new(Mutex::new(StoreState {
                entries,
                next_seq,
                backend,
                abandoned: None,
            })),
        }
    }

    /// Insert or overwrite one artifact
    pub async fn put(&self, artifact: Artifact) -> WriteOutcome {
        self.put_many(vec![artifact]).await
    }

    /// Insert or overwrite artifacts, then enforce capacity, as one unit
    ///
    /// Overwriting an id counts as a fresh insertion for tie-breaking. An id
    /// repeated within one call is written once, with its last value.
    pub async fn put_many(&self, artifacts: Vec<Artifact>) -> WriteOutcome {
        if artifacts.is_empty() {
            let state = self.state.lock().await;
            return WriteOutcome {
                evicted: Vec::new(),
                persisted: state.backend.is_persistent(),
            };
        }

        let mut state = self.state.lock().await;
        let mut written = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let record = StoredRecord {
                seq: state.next_seq,
                artifact,
            };
            state.next_seq += 1;
            if !written.contains(&record.artifact.id()) {
                written.push(record.artifact.id());
            }
            state.entries.insert(record.artifact.id(), record);
        }

        let evicted = state.evict_surplus(self.capacity);
        let survivors: Vec<StoredRecord> = written
            .iter()
            .filter_map(|id| state.entries.get(id).cloned())
            .collect();

        let result = match state.backend.write(&survivors).await {
            Ok(()) => state.backend.remove(&evicted).await,
            Err(e) => Err(e),
        };
        if let Err(error) = &result {
            state.degrade(error);
        }
        state.purge_abandoned(&evicted).await;
        if !evicted.is_empty() {
            tracing::debug!(count = evicted.len(), "evicted oldest artifacts");
        }

        WriteOutcome {
            evicted,
            persisted: result.is_ok() && state.backend.is_persistent(),
        }
    }

    /// All artifacts, newest first
    pub async fn get_all_ordered_desc(&self) -> Vec<Artifact> {
        let state = self.state.lock().await;
        state
            .ordered_asc()
            .into_iter()
            .rev()
            .map(|r| r.artifact.clone())
            .collect()
    }

    /// Look up one artifact
    pub async fn get(&self, id: ArtifactId) -> Option<Artifact> {
        let state = self.state.lock().await;
        state.entries.get(&id).map(|r| r.artifact.clone())
    }

    /// Remove an artifact; returns whether it was present
    pub async fn delete_by_id(&self, id: ArtifactId) -> bool {
        let mut state = self.state.lock().await;
        let existed = state.entries.remove(&id).is_some();
        if existed {
            let result = state.backend.remove(&[id]).await;
            if let Err(error) = result {
                state.degrade(&error);
            }
            state.purge_abandoned(&[id]).await;
        }
        existed
    }

    /// Remove everything
    pub async fn clear_all(&self) {
        let mut state = self.state.lock().await;
        state.entries.clear();
        let result = state.backend.clear().await;
        if let Err(error) = result {
            state.degrade(&error);
        }
        state.clear_abandoned().await;
    }

    /// Number of stored artifacts
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Newest `created_at` held, if any
    pub async fn latest_created_at(&self) -> Option<LogicalTimestamp> {
        let state = self.state.lock().await;
        state.entries.values().map(|r| r.artifact.created_at()).max()
    }

    /// Whether writes currently reach durable storage
    pub async fn is_persistent(&self) -> bool {
        self.state.lock().await.backend.is_persistent()
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::in_memory(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_artifact::Category;
    use aura_test_utils::fixtures::image_artifact;

    #[derive(Debug)]
    struct BrokenBackend;

    #[async_trait::async_trait]
    impl Backend for BrokenBackend {
        fn is_persistent(&self) -> bool {
            true
        }
        async fn load(&self) -> Result<crate::backend::LoadReport, StoreError> {
            Ok(crate::backend::LoadReport::default())
        }
        async fn write(&self, _records: &[StoredRecord]) -> Result<(), StoreError> {
            Err(StoreError::unavailable(
                "/dev/null/records",
                std::io::Error::other("disk full"),
            ))
        }
        async fn remove(&self, _ids: &[ArtifactId]) -> Result<(), StoreError> {
            Ok(())
        }
        async fn clear(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    /// Records the ids of every write
    #[derive(Debug, Default)]
    struct RecordingBackend {
        written: parking_lot::Mutex<Vec<ArtifactId>>,
    }

    #[async_trait::async_trait]
    impl Backend for RecordingBackend {
        fn is_persistent(&self) -> bool {
            true
        }
        async fn load(&self) -> Result<crate::backend::LoadReport, StoreError> {
            Ok(crate::backend::LoadReport::default())
        }
        async fn write(&self, records: &[StoredRecord]) -> Result<(), StoreError> {
            self.written
                .lock()
                .extend(records.iter().map(|r| r.artifact.id()));
            Ok(())
        }
        async fn remove(&self, _ids: &[ArtifactId]) -> Result<(), StoreError> {
            Ok(())
        }
        async fn clear(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn repeated_id_in_one_call_written_once() {
        let backend = Arc::new(RecordingBackend::default());
        let store = ArtifactStore::open_with_backend(backend.clone(), 5).await;
        let a = image_artifact(Category::Avatar, 1);
        let mut a_later = a.clone();
        a_later.attach_video_narrative("second");
        let b = image_artifact(Category::Avatar, 2);

        let outcome = store.put_many(vec![a.clone(), b.clone(), a_later]).await;

        assert!(outcome.persisted);
        assert_eq!(*backend.written.lock(), vec![a.id(), b.id()]);
        assert_eq!(store.len().await, 2);
        assert_eq!(
            store.get(a.id()).await.unwrap().derived_video_narrative(),
            Some("second")
        );
    }

    #[tokio::test]
    async fn ties_broken_by_insertion_order() {
        let store = ArtifactStore::in_memory(10);
        let a = image_artifact(Category::Avatar, 5);
        let b = image_artifact(Category::Avatar, 5);
        store.put(a.clone()).await;
        store.put(b.clone()).await;

        let all = store.get_all_ordered_desc().await;
        assert_eq!(all[0].id(), b.id());
        assert_eq!(all[1].id(), a.id());
    }

    #[tokio::test]
    async fn overwrite_keeps_single_entry() {
        let store = ArtifactStore::in_memory(10);
        let mut a = image_artifact(Category::Avatar, 1);
        store.put(a.clone()).await;
        a.attach_video_narrative("slow glide");
        store.put(a.clone()).await;

        assert_eq!(store.len().await, 1);
        assert_eq!(
            store.get(a.id()).await.unwrap().derived_video_narrative(),
            Some("slow glide")
        );
    }

    #[tokio::test]
    async fn write_failure_degrades_to_memory() {
        let store = ArtifactStore::open_with_backend(Arc::new(BrokenBackend), 3).await;
        assert!(store.is_persistent().await);

        let outcome = store.put(image_artifact(Category::Product, 1)).await;
        assert!(!outcome.persisted);
        assert!(!store.is_persistent().await);
        // history is still served from memory
        assert_eq!(store.len().await, 1);

        let outcome = store.put(image_artifact(Category::Product, 2)).await;
        assert!(!outcome.persisted);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn zero_capacity_is_raised() {
        let store = ArtifactStore::in_memory(0);
        assert_eq!(store.capacity(), 1);
        store.put(image_artifact(Category::Avatar, 1)).await;
        store.put(image_artifact(Category::Avatar, 2)).await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn empty_put_is_noop() {
        let store = ArtifactStore::in_memory(2);
        let outcome = store.put_many(Vec::new()).await;
        assert!(outcome.evicted.is_empty());
        assert!(store.is_empty().await);
    }
}
