//! Quota enforcement, eviction order and startup convergence of `BoundedStore`.

use bounded_file_store::{BoundedStore, BoundedStoreError, QuotaPolicy};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, size: usize) {
    std::fs::write(dir.join(name), vec![0u8; size]).unwrap();
}

/// Write a file and pin its modification time so startup ordering is deterministic.
fn write_file_aged(dir: &Path, name: &str, size: usize, age_rank: u64) {
    write_file(dir, name, size);
    let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000 + age_rank);
    std::fs::File::options()
        .write(true)
        .open(dir.join(name))
        .unwrap()
        .set_modified(mtime)
        .unwrap();
}

async fn add_file(store: &BoundedStore, name: &str, size: usize) {
    write_file(store.path(), name, size);
    store
        .add(name)
        .await
        .unwrap_or_else(|e| panic!("could not add {name}: {e}"));
}

async fn check_files(store: &BoundedStore, wanted: &[&str]) {
    let files = store.list().await;
    assert_eq!(files, wanted, "tracked files differ");

    // Tracked total must equal the sum of tracked sizes
    let tracked = store.tracked().await;
    let sum: u64 = tracked.iter().map(|f| f.size_bytes).sum();
    assert_eq!(store.stats().await.total_size_bytes, sum);
}

fn files_on_disk(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_count_and_size_limits_then_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let store = BoundedStore::open(temp_dir.path(), 5, 4).await.unwrap();
    check_files(&store, &[]).await;

    // Count limit
    for i in 0..5 {
        add_file(&store, &format!("{i}-1"), 1).await;
    }
    check_files(&store, &["1-1", "2-1", "3-1", "4-1"]).await;

    // Size limit
    add_file(&store, "5-2", 2).await;
    check_files(&store, &["2-1", "3-1", "4-1", "5-2"]).await;
    add_file(&store, "6-2", 2).await;
    check_files(&store, &["4-1", "5-2", "6-2"]).await;
    add_file(&store, "7-3", 3).await;
    check_files(&store, &["6-2", "7-3"]).await;
    add_file(&store, "8-4", 4).await;
    check_files(&store, &["8-4"]).await;
    add_file(&store, "9-5", 5).await;
    check_files(&store, &["9-5"]).await;

    // A single file larger than the quota does not survive
    add_file(&store, "10-6", 6).await;
    check_files(&store, &[]).await;
    assert!(files_on_disk(temp_dir.path()).is_empty());

    // Reopen over a directory that violates the quota
    write_file_aged(temp_dir.path(), "11-1", 1, 11);
    write_file_aged(temp_dir.path(), "12-1", 1, 12);
    write_file_aged(temp_dir.path(), "13-2", 2, 13);
    write_file_aged(temp_dir.path(), "14-1", 1, 14);
    write_file_aged(temp_dir.path(), "15-2", 2, 15);

    let reopened = BoundedStore::open(temp_dir.path(), 5, 4).await.unwrap();
    check_files(&reopened, &["13-2", "14-1", "15-2"]).await;
    assert_eq!(
        files_on_disk(temp_dir.path()),
        vec!["13-2".to_string(), "14-1".to_string(), "15-2".to_string()]
    );
}

#[tokio::test]
async fn test_fifo_eviction_order() {
    let temp_dir = TempDir::new().unwrap();
    let store = BoundedStore::open(temp_dir.path(), 1_000, 3).await.unwrap();

    for name in ["A", "B", "C", "D"] {
        add_file(&store, name, 10).await;
    }

    check_files(&store, &["B", "C", "D"]).await;
    assert!(!temp_dir.path().join("A").exists());
}

#[tokio::test]
async fn test_size_based_eviction() {
    let temp_dir = TempDir::new().unwrap();
    let store = BoundedStore::open(temp_dir.path(), 5, 100).await.unwrap();

    for name in ["a", "b", "c", "d", "e"] {
        add_file(&store, name, 1).await;
    }
    check_files(&store, &["a", "b", "c", "d", "e"]).await;
    assert_eq!(store.stats().await.total_size_bytes, 5);

    add_file(&store, "f", 1).await;
    check_files(&store, &["b", "c", "d", "e", "f"]).await;
    assert_eq!(store.stats().await.total_size_bytes, 5);
}

#[tokio::test]
async fn test_startup_orders_by_modification_time() {
    let temp_dir = TempDir::new().unwrap();
    // Names sort the other way round to prove mtime wins
    write_file_aged(temp_dir.path(), "c", 1, 1);
    write_file_aged(temp_dir.path(), "b", 1, 2);
    write_file_aged(temp_dir.path(), "a", 1, 3);

    let store = BoundedStore::open(temp_dir.path(), 100, 100).await.unwrap();

    check_files(&store, &["c", "b", "a"]).await;
}

#[tokio::test]
async fn test_startup_convergence_over_size() {
    let temp_dir = TempDir::new().unwrap();
    for i in 0..10u64 {
        write_file_aged(temp_dir.path(), &format!("f{i:02}"), 100, i);
    }

    let store = BoundedStore::open(temp_dir.path(), 350, 100).await.unwrap();

    let stats = store.stats().await;
    assert!(stats.total_size_bytes <= 350);
    check_files(&store, &["f07", "f08", "f09"]).await;
    assert_eq!(files_on_disk(temp_dir.path()), store.list().await);
}

#[tokio::test]
async fn test_externally_deleted_file_is_tolerated() {
    let temp_dir = TempDir::new().unwrap();
    let store = BoundedStore::open(temp_dir.path(), 1_000, 2).await.unwrap();

    add_file(&store, "old", 10).await;
    add_file(&store, "mid", 10).await;
    std::fs::remove_file(temp_dir.path().join("old")).unwrap();

    add_file(&store, "new", 10).await;

    check_files(&store, &["mid", "new"]).await;
    assert_eq!(store.stats().await.total_size_bytes, 20);
}

#[tokio::test]
async fn test_eviction_failure_is_surfaced() {
    let temp_dir = TempDir::new().unwrap();
    let store = BoundedStore::open(temp_dir.path(), 1_000, 2).await.unwrap();

    add_file(&store, "stuck", 1).await;
    add_file(&store, "second", 1).await;

    // Replace the oldest file by a directory: removing it as a file fails
    // with something other than "not found".
    std::fs::remove_file(temp_dir.path().join("stuck")).unwrap();
    std::fs::create_dir(temp_dir.path().join("stuck")).unwrap();

    write_file(temp_dir.path(), "third", 1);
    let result = store.add("third").await;

    match result {
        Err(BoundedStoreError::EvictionIo { name, .. }) => assert_eq!(name, "stuck"),
        other => panic!("expected eviction failure, got {other:?}"),
    }

    // The new file was registered, the failing entry stays at the head
    check_files(&store, &["stuck", "second", "third"]).await;
}

#[tokio::test]
async fn test_open_fails_when_directory_cannot_be_created() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("not-a-dir");
    write_file(temp_dir.path(), "not-a-dir", 1);

    let result = BoundedStore::open(&blocker, 10, 10).await;

    assert!(matches!(result, Err(BoundedStoreError::StorageInit { .. })));
}

#[tokio::test]
async fn test_builder_requires_base_directory() {
    let result = BoundedStore::builder()
        .quota(QuotaPolicy::unlimited())
        .build()
        .await;

    assert!(matches!(
        result,
        Err(BoundedStoreError::Configuration { .. })
    ));
}

#[tokio::test]
async fn test_list_is_a_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let store = BoundedStore::open(temp_dir.path(), 1_000, 10).await.unwrap();
    add_file(&store, "one", 1).await;

    let mut snapshot = store.list().await;
    snapshot.push("bogus".to_string());

    check_files(&store, &["one"]).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_keep_invariant() {
    const MAX_SIZE: u64 = 20;
    const MAX_COUNT: usize = 8;

    let temp_dir = TempDir::new().unwrap();
    let store = BoundedStore::open(temp_dir.path(), MAX_SIZE, MAX_COUNT)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..32usize {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let name = format!("{i:02}.png");
            std::fs::write(store.path().join(&name), vec![0u8; i % 3 + 1]).unwrap();
            store.add(&name).await.unwrap();

            let stats = store.stats().await;
            assert!(stats.total_files <= MAX_COUNT);
            assert!(stats.total_size_bytes <= MAX_SIZE);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let tracked = store.tracked().await;
    let sum: u64 = tracked.iter().map(|f| f.size_bytes).sum();
    let stats = store.stats().await;
    assert_eq!(stats.total_size_bytes, sum);
    assert!(stats.total_files <= MAX_COUNT);
    assert!(stats.total_size_bytes <= MAX_SIZE);

    let mut tracked_names = store.list().await;
    tracked_names.sort();
    assert_eq!(files_on_disk(temp_dir.path()), tracked_names);
}
