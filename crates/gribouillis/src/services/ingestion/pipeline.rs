use bounded_file_store::BoundedStore;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};

use super::canvas::{IMAGE_PADDING, normalize_png};
use super::gate::AdmissionGate;
use crate::errors::{AppError, AppResult};

/// Successful upload, serialized as the response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedImage {
    pub path: String,
}

/// 16 random bytes, hex encoded, with a `.png` suffix.
pub fn generate_image_name() -> String {
    let bytes: [u8; 16] = rand::random();
    format!("{}.png", hex::encode(bytes))
}

/// Deletes the candidate file when dropped unless it was committed.
struct PendingFile {
    path: PathBuf,
    committed: bool,
}

impl PendingFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // Drop cannot await, so this unlink is synchronous.
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed incomplete upload {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove incomplete upload {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestionPipeline {
    store: BoundedStore,
    gate: Arc<AdmissionGate>,
    public_base: String,
    max_input_bytes: u64,
    padding: u32,
}

impl IngestionPipeline {
    /// `public_base` is prepended verbatim to generated names, e.g. "/saved/".
    pub fn new(
        store: BoundedStore,
        gate: Arc<AdmissionGate>,
        public_base: impl Into<String>,
        max_input_bytes: u64,
    ) -> Self {
        Self {
            store,
            gate,
            public_base: public_base.into(),
            max_input_bytes,
            padding: IMAGE_PADDING,
        }
    }

    /// Pass the rate gate, then save. This is what the upload endpoint runs.
    pub async fn ingest<R>(&self, reader: R) -> AppResult<SavedImage>
    where
        R: AsyncRead + Unpin + Send,
    {
        self.gate.try_admit().await?;
        self.save(reader).await
    }

    /// Normalize the uploaded PNG, write it under a fresh name and register
    /// it with the store. On failure, or when the future is dropped, no new
    /// file is left behind unless the store already accounts for it.
    pub async fn save<R>(&self, reader: R) -> AppResult<SavedImage>
    where
        R: AsyncRead + Unpin + Send,
    {
        let name = generate_image_name();
        let path = self.store.path().join(&name);

        info!("writing {}", path.display());
        let pending = PendingFile::new(path.clone());
        let mut file = fs::File::create(&path).await?;

        let input = read_capped(reader, self.max_input_bytes).await?;
        let padding = self.padding;
        let encoded = tokio::task::spawn_blocking(move || normalize_png(&input, padding)).await??;

        file.write_all(&encoded).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        // Registration runs to completion even if the request is dropped,
        // so the file ends up either tracked or removed.
        let store = self.store.clone();
        let registration = tokio::spawn(async move {
            let result = store.add(&name).await;
            if result.is_ok() || store.contains(&name).await {
                pending.commit();
            }
            result.map(|()| name)
        });
        let name = registration.await??;

        Ok(SavedImage {
            path: format!("{}{}", self.public_base, name),
        })
    }
}

async fn read_capped<R>(reader: R, max_bytes: u64) -> AppResult<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut input = Vec::new();
    reader
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut input)
        .await?;
    if input.len() as u64 > max_bytes {
        return Err(AppError::InputTooLarge { max_bytes });
    }
    Ok(input)
}
