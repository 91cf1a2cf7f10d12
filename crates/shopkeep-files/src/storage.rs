//! The file-storage port.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{FileError, FileToken};

/// Streaming reader over a stored file.
pub type FileReader = Pin<Box<dyn AsyncRead + Send>>;

/// Streaming writer into a stored file. Shut it down to finish the write.
pub type FileWriter = Pin<Box<dyn AsyncWrite + Send>>;

/// Token-addressed blob storage.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Create (or truncate) the file under `token`.
    async fn create(&self, token: &FileToken) -> Result<FileWriter, FileError>;

    /// Open the file under `token` for reading.
    async fn open(&self, token: &FileToken) -> Result<FileReader, FileError>;

    async fn exists(&self, token: &FileToken) -> Result<bool, FileError>;

    /// Delete one file. Missing files are `NotFound`.
    async fn delete(&self, token: &FileToken) -> Result<(), FileError>;

    /// Delete every file at or under `prefix`. Returns how many went away.
    async fn delete_all(&self, prefix: &FileToken) -> Result<usize, FileError>;

    /// Write a whole file in one go.
    async fn write(&self, token: &FileToken, bytes: &[u8]) -> Result<(), FileError> {
        let mut writer = self.create(token).await?;
        writer.write_all(bytes).await?;
        writer.shutdown().await?;
        Ok(())
    }

    /// Read a whole file in one go.
    async fn read(&self, token: &FileToken) -> Result<Vec<u8>, FileError> {
        let mut reader = self.open(token).await?;
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        Ok(bytes)
    }
}

/// Shared handle to a file store.
pub type SharedFiles = Arc<dyn FileStorage>;
