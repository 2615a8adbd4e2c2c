//! File System Abstraction
//!
//! Provides platform-agnostic file I/O for the snapshot cache and change log.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// File system access trait
///
/// Abstracts file I/O so the persistence layer can be exercised against a
/// temporary directory in tests and the platform data directory in
/// production.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn save(fs: &dyn FileSystemAccess, data: &[u8]) -> Result<()> {
///     let dir = fs.get_data_directory().await?;
///     fs.write_file(&dir.join("state.json"), data.to_vec().into()).await
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Get the application's data directory, creating it if needed
    ///
    /// This directory is suitable for persistent application data.
    async fn get_data_directory(&self) -> Result<PathBuf>;

    /// Check if a file or directory exists
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Create a directory and all parent directories if they don't exist
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Read entire file contents into memory
    async fn read_file(&self, path: &Path) -> Result<Bytes>;

    /// Truncate and rewrite a file, creating it if it doesn't exist
    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()>;

    /// Append data to an existing file or create it
    async fn append_file(&self, path: &Path, data: Bytes) -> Result<()>;

    /// Delete a file
    async fn delete_file(&self, path: &Path) -> Result<()>;
}
