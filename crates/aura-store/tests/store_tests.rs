use aura_artifact::{ArtifactId, Category};
use aura_store::{ArtifactStore, Backend, FileBackend, LoadReport, StoreError, StoredRecord};
use aura_test_utils::fixtures::image_artifact;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn assert_desc(store_view: &[aura_artifact::Artifact]) {
    for pair in store_view.windows(2) {
        assert!(pair[0].created_at() >= pair[1].created_at());
    }
}

#[tokio::test]
async fn test_thirty_inserts_keep_newest_twenty_five() {
    let store = ArtifactStore::in_memory(25);
    let mut inserted = Vec::new();
    for ts in 1..=30 {
        let artifact = image_artifact(Category::Avatar, ts);
        inserted.push(artifact.id());
        let outcome = store.put(artifact).await;
        assert!(store.len().await <= 25);
        if ts > 25 {
            assert_eq!(outcome.evicted, vec![inserted[(ts - 26) as usize]]);
        }
    }

    let remaining: Vec<ArtifactId> = store
        .get_all_ordered_desc()
        .await
        .iter()
        .map(aura_artifact::Artifact::id)
        .collect();
    let expected: Vec<ArtifactId> = inserted[5..].iter().rev().copied().collect();
    assert_eq!(remaining, expected);
}

#[tokio::test]
async fn test_out_of_order_inserts_read_descending() {
    let store = ArtifactStore::in_memory(10);
    store
        .put_many(vec![
            image_artifact(Category::Product, 30),
            image_artifact(Category::Product, 10),
        ])
        .await;
    store.put(image_artifact(Category::Product, 20)).await;

    let all = store.get_all_ordered_desc().await;
    let stamps: Vec<u64> = all.iter().map(|a| a.created_at().value()).collect();
    assert_eq!(stamps, vec![30, 20, 10]);
}

#[tokio::test]
async fn test_late_old_artifact_is_evicted_first() {
    let store = ArtifactStore::in_memory(2);
    store.put(image_artifact(Category::Avatar, 50)).await;
    store.put(image_artifact(Category::Avatar, 60)).await;
    let old = image_artifact(Category::Avatar, 1);
    let outcome = store.put(old.clone()).await;
    assert_eq!(outcome.evicted, vec![old.id()]);
}

#[tokio::test]
async fn test_delete_and_clear() {
    let store = ArtifactStore::in_memory(5);
    let a = image_artifact(Category::Carousel, 1);
    let b = image_artifact(Category::Carousel, 2);
    store.put_many(vec![a.clone(), b.clone()]).await;

    assert!(store.delete_by_id(a.id()).await);
    assert!(!store.delete_by_id(a.id()).await);
    assert!(store.get_all_ordered_desc().await.iter().all(|x| x.id() != a.id()));
    assert!(store.get(b.id()).await.is_some());

    store.clear_all().await;
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_history_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let kept;
    {
        let store = ArtifactStore::open(dir.path(), 3).await;
        assert!(store.is_persistent().await);
        let artifacts: Vec<_> = (1..=4).map(|ts| image_artifact(Category::Avatar, ts)).collect();
        kept = artifacts[1..].iter().map(aura_artifact::Artifact::id).collect::<HashSet<_>>();
        let outcome = store.put_many(artifacts).await;
        assert!(outcome.persisted);
        assert_eq!(outcome.evicted.len(), 1);
    }

    let reopened = ArtifactStore::open(dir.path(), 3).await;
    let ids: HashSet<_> = reopened
        .get_all_ordered_desc()
        .await
        .iter()
        .map(aura_artifact::Artifact::id)
        .collect();
    assert_eq!(ids, kept);
    assert_eq!(reopened.latest_created_at().await.map(|t| t.value()), Some(4));
}

#[tokio::test]
async fn test_reopen_with_lower_capacity_evicts() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = ArtifactStore::open(dir.path(), 10).await;
        for ts in 1..=6 {
            store.put(image_artifact(Category::Product, ts)).await;
        }
    }
    let store = ArtifactStore::open(dir.path(), 4).await;
    assert_eq!(store.len().await, 4);

    let again = ArtifactStore::open(dir.path(), 10).await;
    assert_eq!(again.len().await, 4);
}

#[tokio::test]
async fn test_unopenable_dir_falls_back_to_memory() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("not-a-dir");
    std::fs::write(&file, b"x").unwrap();

    let store = ArtifactStore::open(file.join("history"), 5).await;
    assert!(!store.is_persistent().await);
    let outcome = store.put(image_artifact(Category::Avatar, 1)).await;
    assert!(!outcome.persisted);
    assert_eq!(store.len().await, 1);
}

/// File backend whose next write fails once when armed
#[derive(Debug)]
struct FlakyBackend {
    inner: FileBackend,
    fail_next_write: AtomicBool,
}

impl FlakyBackend {
    async fn open(dir: &Path) -> Arc<Self> {
        Arc::new(Self {
            inner: FileBackend::open(dir).await.unwrap(),
            fail_next_write: AtomicBool::new(false),
        })
    }

    fn arm(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl Backend for FlakyBackend {
    fn is_persistent(&self) -> bool {
        true
    }
    async fn load(&self) -> Result<LoadReport, StoreError> {
        self.inner.load().await
    }
    async fn write(&self, records: &[StoredRecord]) -> Result<(), StoreError> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                path: self.inner.dir().to_path_buf(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.inner.write(records).await
    }
    async fn remove(&self, ids: &[ArtifactId]) -> Result<(), StoreError> {
        self.inner.remove(ids).await
    }
    async fn clear(&self) -> Result<(), StoreError> {
        self.inner.clear().await
    }
}

#[tokio::test]
async fn test_delete_after_fallback_does_not_reload() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FlakyBackend::open(dir.path()).await;
    let store = ArtifactStore::open_with_backend(backend.clone(), 5).await;

    let a = image_artifact(Category::Avatar, 1);
    assert!(store.put(a.clone()).await.persisted);
    backend.arm();
    let b = image_artifact(Category::Avatar, 2);
    assert!(!store.put(b.clone()).await.persisted);
    assert!(!store.is_persistent().await);

    assert!(store.delete_by_id(a.id()).await);
    assert!(store.get(a.id()).await.is_none());
    drop(store);

    let reopened = ArtifactStore::open(dir.path(), 5).await;
    assert!(reopened.get(a.id()).await.is_none());
    assert!(reopened.get(b.id()).await.is_none());
}

#[tokio::test]
async fn test_clear_and_eviction_after_fallback_do_not_reload() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FlakyBackend::open(dir.path()).await;
    let store = ArtifactStore::open_with_backend(backend.clone(), 2).await;

    let a = image_artifact(Category::Product, 1);
    let b = image_artifact(Category::Product, 2);
    store.put_many(vec![a.clone(), b.clone()]).await;
    backend.arm();
    let outcome = store.put(image_artifact(Category::Product, 3)).await;
    assert_eq!(outcome.evicted, vec![a.id()]);
    assert!(!outcome.persisted);

    let reopened = ArtifactStore::open(dir.path(), 2).await;
    let ids: Vec<ArtifactId> = reopened
        .get_all_ordered_desc()
        .await
        .iter()
        .map(aura_artifact::Artifact::id)
        .collect();
    assert_eq!(ids, vec![b.id()]);
    drop(reopened);

    store.clear_all().await;
    assert!(ArtifactStore::open(dir.path(), 2).await.is_empty().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_never_overshoot() {
    let store = ArtifactStore::in_memory(25);
    let mut handles = Vec::new();
    for writer in 0..8u64 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..5u64 {
                let batch = (0..4)
                    .map(|j| image_artifact(Category::Avatar, writer * 100 + i * 10 + j))
                    .collect();
                store.put_many(batch).await;
                assert!(store.len().await <= 25);
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(store.len().await, 25);
    assert_desc(&store.get_all_ordered_desc().await);
}

#[derive(Debug, Clone)]
enum Op {
    Put(u64),
    PutMany(Vec<u64>),
    DeleteNewest,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u64..1_000).prop_map(Op::Put),
        proptest::collection::vec(0u64..1_000, 0..8).prop_map(Op::PutMany),
        Just(Op::DeleteNewest),
    ]
}

proptest! {
    #[test]
    fn prop_size_bound_and_descending_order(
        capacity in 1usize..12,
        ops in proptest::collection::vec(op_strategy(), 1..40),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        rt.block_on(async {
            let store = ArtifactStore::in_memory(capacity);
            for op in ops {
                match op {
                    Op::Put(ts) => {
                        store.put(image_artifact(Category::Avatar, ts)).await;
                    }
                    Op::PutMany(stamps) => {
                        let batch = stamps.into_iter().map(|ts| image_artifact(Category::Avatar, ts)).collect();
                        store.put_many(batch).await;
                    }
                    Op::DeleteNewest => {
                        if let Some(newest) = store.get_all_ordered_desc().await.first() {
                            let id = newest.id();
                            store.delete_by_id(id).await;
                            assert!(store.get_all_ordered_desc().await.iter().all(|a| a.id() != id));
                        }
                    }
                }
                assert!(store.len().await <= capacity);
                assert_desc(&store.get_all_ordered_desc().await);
            }
        });
    }

    #[test]
    fn prop_eviction_removes_strictly_oldest(
        stamps in proptest::collection::vec(0u64..50, 1..30),
        capacity in 1usize..10,
    ) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        rt.block_on(async {
            let store = ArtifactStore::in_memory(capacity);
            let batch: Vec<_> = stamps.iter().map(|ts| image_artifact(Category::Product, *ts)).collect();
            let stamp_of: HashMap<ArtifactId, u64> =
                batch.iter().map(|a| (a.id(), a.created_at().value())).collect();
            let outcome = store.put_many(batch).await;

            let kept = store.get_all_ordered_desc().await;
            assert_eq!(kept.len(), stamps.len().min(capacity));
            assert_eq!(outcome.evicted.len(), stamps.len() - kept.len());
            if let Some(oldest_kept) = kept.last() {
                for id in &outcome.evicted {
                    assert!(stamp_of[id] <= oldest_kept.created_at().value());
                }
            }
        });
    }
}
