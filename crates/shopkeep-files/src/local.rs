//! File storage on the local filesystem.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::{FileError, FileReader, FileStorage, FileToken, FileWriter};

/// Stores each token as a file under a root directory.
#[derive(Debug, Clone)]
pub struct LocalFiles {
    root: PathBuf,
}

impl LocalFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, token: &FileToken) -> PathBuf {
        token
            .segments()
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

fn not_found_or_io(token: &FileToken, err: std::io::Error) -> FileError {
    if err.kind() == ErrorKind::NotFound {
        FileError::NotFound(token.to_string())
    } else {
        FileError::Io(err)
    }
}

/// Count regular files below `dir`.
async fn count_files(dir: &Path) -> Result<usize, std::io::Error> {
    let mut count = 0;
    let mut pending = vec![dir.to_path_buf()];
    while let Some(next) = pending.pop() {
        let mut entries = fs::read_dir(&next).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                pending.push(entry.path());
            } else {
                count += 1;
            }
        }
    }
    Ok(count)
}

#[async_trait]
impl FileStorage for LocalFiles {
    async fn create(&self, token: &FileToken) -> Result<FileWriter, FileError> {
        let path = self.path(token);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let file = fs::File::create(&path).await?;
        debug!(%token, path = %path.display(), "created file");
        Ok(Box::pin(file))
    }

    async fn open(&self, token: &FileToken) -> Result<FileReader, FileError> {
        let file = fs::File::open(self.path(token))
            .await
            .map_err(|e| not_found_or_io(token, e))?;
        Ok(Box::pin(file))
    }

    async fn exists(&self, token: &FileToken) -> Result<bool, FileError> {
        match fs::metadata(self.path(token)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FileError::Io(e)),
        }
    }

    async fn delete(&self, token: &FileToken) -> Result<(), FileError> {
        fs::remove_file(self.path(token))
            .await
            .map_err(|e| not_found_or_io(token, e))?;
        debug!(%token, "deleted file");
        Ok(())
    }

    async fn delete_all(&self, prefix: &FileToken) -> Result<usize, FileError> {
        let path = self.path(prefix);
        let meta = match fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(FileError::Io(e)),
        };

        let removed = if meta.is_dir() {
            let count = count_files(&path).await?;
            fs::remove_dir_all(&path).await?;
            count
        } else {
            fs::remove_file(&path).await?;
            1
        };
        debug!(%prefix, removed, "deleted files");
        Ok(removed)
    }
}
