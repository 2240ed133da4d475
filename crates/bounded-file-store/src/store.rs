//! Core bounded store implementation.

use crate::{
    error::{BoundedStoreError, Result},
    policy::QuotaPolicy,
    security::{set_directory_permissions, validate_file_name},
};

use serde::{Deserialize, Serialize};
use std::{
    collections::VecDeque,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};
use tokio::{fs, sync::Mutex};

/// A file known to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedFile {
    pub name: String,
    pub size_bytes: u64,
}

/// Statistics about tracked files.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub total_files: usize,
    pub total_size_bytes: u64,
    pub max_size_bytes: u64,
    pub max_count: usize,
    pub base_directory: PathBuf,
}

/// Tracked files in age order (oldest first) and their running total.
///
/// `total_size_bytes` always equals the sum of `files[..].size_bytes`.
#[derive(Debug, Default)]
struct Registry {
    files: VecDeque<TrackedFile>,
    total_size_bytes: u64,
}

impl Registry {
    fn push(&mut self, file: TrackedFile) {
        self.total_size_bytes = self.total_size_bytes.saturating_add(file.size_bytes);
        self.files.push_back(file);
    }

    fn pop_oldest(&mut self) -> Option<TrackedFile> {
        let file = self.files.pop_front()?;
        self.total_size_bytes = self.total_size_bytes.saturating_sub(file.size_bytes);
        Some(file)
    }
}

/// Directory registry enforcing a [`QuotaPolicy`] with oldest-first eviction.
///
/// Cloning is cheap and every clone shares the same registry.
#[derive(Clone, Debug)]
pub struct BoundedStore {
    base_dir: PathBuf,
    quota: QuotaPolicy,
    registry: Arc<Mutex<Registry>>,
}

impl BoundedStore {
    /// Create a new builder for configuring the store.
    #[must_use]
    pub fn builder() -> BoundedStoreBuilder {
        BoundedStoreBuilder::new()
    }

    /// Open a store over `path`, keeping at most `max_size_bytes` bytes and
    /// `max_count` files.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The directory cannot be created or listed (`StorageInit`)
    /// - Evicting files to satisfy the quota fails (`EvictionIo`)
    pub async fn open<P: Into<PathBuf>>(
        path: P,
        max_size_bytes: u64,
        max_count: usize,
    ) -> Result<Self> {
        Self::builder()
            .base_directory(path)
            .quota(
                QuotaPolicy::new()
                    .max_size_bytes(max_size_bytes)
                    .max_count(max_count),
            )
            .build()
            .await
    }

    /// Register a file the caller has already fully written at
    /// `path()/name`, then evict the oldest files until the quota holds.
    ///
    /// The size is read from disk, not trusted from the caller. Adding a
    /// name that is already tracked counts as a new file.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The name is not a plain file name (`InvalidName`)
    /// - The file no longer exists (`FileNotFound`)
    /// - An evicted file cannot be deleted (`EvictionIo`). Entries evicted
    ///   before the failure stay evicted.
    pub async fn add(&self, name: &str) -> Result<()> {
        validate_file_name(name)?;

        let metadata = fs::metadata(self.base_dir.join(name))
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => BoundedStoreError::FileNotFound {
                    name: name.to_string(),
                    source: e,
                },
                _ => BoundedStoreError::Io(e),
            })?;

        let mut registry = self.registry.lock().await;
        registry.push(TrackedFile {
            name: name.to_string(),
            size_bytes: metadata.len(),
        });
        tracing::debug!(
            "Registered {} ({} bytes, {} files / {} bytes tracked)",
            name,
            metadata.len(),
            registry.files.len(),
            registry.total_size_bytes
        );

        self.shrink(&mut registry).await?;
        Ok(())
    }

    /// Tracked file names in eviction order (oldest first).
    pub async fn list(&self) -> Vec<String> {
        let registry = self.registry.lock().await;
        registry.files.iter().map(|f| f.name.clone()).collect()
    }

    /// Tracked entries in eviction order (oldest first).
    pub async fn tracked(&self) -> Vec<TrackedFile> {
        let registry = self.registry.lock().await;
        registry.files.iter().cloned().collect()
    }

    /// Whether `name` is currently tracked.
    pub async fn contains(&self, name: &str) -> bool {
        let registry = self.registry.lock().await;
        registry.files.iter().any(|f| f.name == name)
    }

    /// Get statistics about tracked files.
    pub async fn stats(&self) -> StoreStats {
        let registry = self.registry.lock().await;
        let total_files = registry.files.len();
        let total_size_bytes = registry.total_size_bytes;
        drop(registry);

        StoreStats {
            total_files,
            total_size_bytes,
            max_size_bytes: self.quota.max_size_bytes,
            max_count: self.quota.max_count,
            base_directory: self.base_dir.clone(),
        }
    }

    /// The managed directory.
    pub fn path(&self) -> &Path {
        &self.base_dir
    }

    /// The quota this store enforces.
    pub const fn quota(&self) -> QuotaPolicy {
        self.quota
    }

    /// Evict oldest entries while the quota is exceeded.
    ///
    /// A file that is already gone counts as evicted. Any other removal
    /// failure stops the loop and leaves the failing entry at the head.
    async fn shrink(&self, registry: &mut Registry) -> Result<usize> {
        let mut removed = 0;

        while self
            .quota
            .is_exceeded(registry.total_size_bytes, registry.files.len())
        {
            let Some(oldest) = registry.files.front() else {
                break;
            };

            tracing::info!("removing {}", oldest.name);
            match fs::remove_file(self.base_dir.join(&oldest.name)).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::warn!("Evicted file {} was already gone", oldest.name);
                }
                Err(e) => {
                    return Err(BoundedStoreError::EvictionIo {
                        name: oldest.name.clone(),
                        source: e,
                    });
                }
            }

            registry.pop_oldest();
            removed += 1;
        }

        Ok(removed)
    }

    /// Scan the directory and rebuild the registry from regular files,
    /// oldest modification time first.
    async fn load_existing_files(&self) -> std::io::Result<Registry> {
        let mut entries = fs::read_dir(&self.base_dir).await?;
        let mut found: Vec<(SystemTime, TrackedFile)> = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }

            let Ok(name) = entry.file_name().into_string() else {
                tracing::warn!("Skipping non UTF-8 file name {:?}", entry.file_name());
                continue;
            };

            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            found.push((
                modified,
                TrackedFile {
                    name,
                    size_bytes: metadata.len(),
                },
            ));
        }

        found.sort_by(|(ta, a), (tb, b)| ta.cmp(tb).then_with(|| a.name.cmp(&b.name)));

        let mut registry = Registry::default();
        for (_, file) in found {
            registry.push(file);
        }
        Ok(registry)
    }
}

/// Builder for configuring a `BoundedStore`.
pub struct BoundedStoreBuilder {
    base_directory: Option<PathBuf>,
    quota: QuotaPolicy,
}

impl BoundedStoreBuilder {
    fn new() -> Self {
        Self {
            base_directory: None,
            quota: QuotaPolicy::default(),
        }
    }

    /// Set the directory holding the files.
    #[must_use]
    pub fn base_directory<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.base_directory = Some(path.into());
        self
    }

    /// Set the quota policy.
    #[must_use]
    pub const fn quota(mut self, quota: QuotaPolicy) -> Self {
        self.quota = quota;
        self
    }

    /// Build the `BoundedStore`.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Base directory is not set
    /// - Base directory cannot be created or listed
    /// - Files exceeding the quota cannot be evicted
    pub async fn build(self) -> Result<BoundedStore> {
        let base_dir = self
            .base_directory
            .ok_or_else(|| BoundedStoreError::Configuration {
                message: "Base directory is required".to_string(),
            })?;

        let init_error = |source: std::io::Error| BoundedStoreError::StorageInit {
            path: base_dir.clone(),
            source,
        };

        let existed = fs::try_exists(&base_dir).await.map_err(init_error)?;
        if !existed {
            fs::create_dir_all(&base_dir).await.map_err(init_error)?;
            set_directory_permissions(&base_dir)
                .await
                .map_err(init_error)?;
        }

        let store = BoundedStore {
            base_dir: base_dir.clone(),
            quota: self.quota,
            registry: Arc::new(Mutex::new(Registry::default())),
        };

        let mut registry = store.load_existing_files().await.map_err(init_error)?;
        if !registry.files.is_empty() {
            tracing::info!(
                "Loaded {} existing files ({} bytes) from {:?}",
                registry.files.len(),
                registry.total_size_bytes,
                store.base_dir
            );
        }

        let removed = store.shrink(&mut registry).await?;
        if removed > 0 {
            tracing::info!("Evicted {} files to satisfy the quota", removed);
        }
        *store.registry.lock().await = registry;

        tracing::info!(
            "BoundedStore initialized - base_dir: {:?}, max_size_bytes: {}, max_count: {}",
            store.base_dir,
            store.quota.max_size_bytes,
            store.quota.max_count
        );

        Ok(store)
    }
}
