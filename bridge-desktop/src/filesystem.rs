//! File System Access Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::FileSystemAccess,
};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Tokio-based file system implementation
///
/// Stores everything under a single application data directory
/// (`$XDG_DATA_HOME/watch-sync`, `%LOCALAPPDATA%\watch-sync`, ...).
pub struct TokioFileSystem {
    data_dir: PathBuf,
}

impl TokioFileSystem {
    /// Create a new file system accessor with the platform data directory
    pub fn new() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".local")
                    .join("share")
            })
            .join("watch-sync");

        Self { data_dir }
    }

    /// Create a new file system accessor rooted at a custom directory
    pub fn with_data_directory(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Convert std::io::Error to BridgeError
    fn map_io_error(e: std::io::Error) -> BridgeError {
        BridgeError::Io(e)
    }
}

impl Default for TokioFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn get_data_directory(&self) -> Result<PathBuf> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir)
                .await
                .map_err(Self::map_io_error)?;
            debug!(path = ?self.data_dir, "Created data directory");
        }
        Ok(self.data_dir.clone())
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        fs::try_exists(path).await.map_err(Self::map_io_error)
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, "Created directory");
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> Result<Bytes> {
        let data = fs::read(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, size = data.len(), "Read file");
        Ok(Bytes::from(data))
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent).await?;
        }

        fs::write(path, data.as_ref())
            .await
            .map_err(Self::map_io_error)?;
        debug!(path = ?path, size = data.len(), "Wrote file");
        Ok(())
    }

    async fn append_file(&self, path: &Path, data: Bytes) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent).await?;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(Self::map_io_error)?;

        file.write_all(data.as_ref())
            .await
            .map_err(Self::map_io_error)?;
        file.flush().await.map_err(Self::map_io_error)?;

        debug!(path = ?path, size = data.len(), "Appended to file");
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, "Deleted file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_data_directory_is_created() {
        let root = tempfile::tempdir().unwrap();
        let data = root.path().join("nested").join("watch-sync");
        let fs = TokioFileSystem::with_data_directory(data.clone());

        let dir = fs.get_data_directory().await.unwrap();
        assert_eq!(dir, data);
        assert!(fs.exists(&data).await.unwrap());
    }

    #[tokio::test]
    async fn test_write_truncates() {
        let root = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::with_data_directory(root.path().to_path_buf());
        let file = root.path().join("state.json");

        fs.write_file(&file, Bytes::from("a much longer first payload"))
            .await
            .unwrap();
        fs.write_file(&file, Bytes::from("short")).await.unwrap();

        assert_eq!(fs.read_file(&file).await.unwrap(), Bytes::from("short"));
    }

    #[tokio::test]
    async fn test_append_and_delete() {
        let root = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::with_data_directory(root.path().to_path_buf());
        let file = root.path().join("Log_20240315.jsonl");

        fs.append_file(&file, Bytes::from("one\n")).await.unwrap();
        fs.append_file(&file, Bytes::from("two\n")).await.unwrap();
        assert_eq!(fs.read_file(&file).await.unwrap(), Bytes::from("one\ntwo\n"));

        fs.delete_file(&file).await.unwrap();
        assert!(!fs.exists(&file).await.unwrap());
    }
}
