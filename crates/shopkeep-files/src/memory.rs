//! In-process file storage.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::{FileError, FileReader, FileStorage, FileToken, FileWriter};

type Blobs = Arc<Mutex<BTreeMap<FileToken, Vec<u8>>>>;

/// Keeps every file in a shared map. Clones share the same files.
#[derive(Debug, Clone, Default)]
pub struct MemoryFiles {
    blobs: Blobs,
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        lock(&self.blobs).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// A poisoned map is still a consistent map: every write is a single insert or append.
fn lock(blobs: &Blobs) -> MutexGuard<'_, BTreeMap<FileToken, Vec<u8>>> {
    blobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Appends straight into the shared map.
struct MemoryWriter {
    blobs: Blobs,
    token: FileToken,
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, std::io::Error>> {
        lock(&self.blobs)
            .entry(self.token.clone())
            .or_default()
            .extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), std::io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        Poll::Ready(Ok(()))
    }
}

#[async_trait]
impl FileStorage for MemoryFiles {
    async fn create(&self, token: &FileToken) -> Result<FileWriter, FileError> {
        lock(&self.blobs).insert(token.clone(), Vec::new());
        Ok(Box::pin(MemoryWriter {
            blobs: Arc::clone(&self.blobs),
            token: token.clone(),
        }))
    }

    async fn open(&self, token: &FileToken) -> Result<FileReader, FileError> {
        let bytes = lock(&self.blobs)
            .get(token)
            .cloned()
            .ok_or_else(|| FileError::NotFound(token.to_string()))?;
        Ok(Box::pin(Cursor::new(bytes)))
    }

    async fn exists(&self, token: &FileToken) -> Result<bool, FileError> {
        Ok(lock(&self.blobs).contains_key(token))
    }

    async fn delete(&self, token: &FileToken) -> Result<(), FileError> {
        lock(&self.blobs)
            .remove(token)
            .map(|_| ())
            .ok_or_else(|| FileError::NotFound(token.to_string()))
    }

    async fn delete_all(&self, prefix: &FileToken) -> Result<usize, FileError> {
        let mut blobs = lock(&self.blobs);
        let before = blobs.len();
        blobs.retain(|token, _| !token.starts_with(prefix));
        Ok(before - blobs.len())
    }
}
