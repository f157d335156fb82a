//! Artifact Storage
//!
//! The store collaborator publishes finished documents under a key. The
//! filesystem implementation never exposes a partially written file: content
//! goes to a temporary file in the same directory, is synced, and is then
//! linked into place under its final name without overwriting anything.

use crate::error::StorageError;
use async_trait::async_trait;
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

/// Publishes documents under unique keys.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Stores `content` under `key` and returns a reference to it.
    ///
    /// Implementations must fail with `StorageError::KeyExists` rather than
    /// replace an existing artifact.
    async fn put(&self, key: &str, content: &str) -> Result<String, StorageError>;
}

/// Stores artifacts as files in a single output directory.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Creates the store, creating `root` if it does not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Keys are plain file names: no separators, no traversal, no hidden files.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let invalid = key.is_empty()
        || key.starts_with('.')
        || key.contains(['/', '\\', '\0'])
        || key.contains("..");
    if invalid {
        return Err(StorageError::InvalidKey {
            key: key.to_string(),
        });
    }
    Ok(())
}

fn write_then_publish(dir: &Path, target: &Path, content: &str) -> io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    // On failure the temp file is dropped and removed with the error.
    tmp.persist_noclobber(target).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    #[instrument(skip(self, content), fields(bytes = content.len()))]
    async fn put(&self, key: &str, content: &str) -> Result<String, StorageError> {
        validate_key(key)?;
        let dir = self.root.clone();
        let target = self.root.join(key);
        let content = content.to_string();

        let publish_target = target.clone();
        let result = tokio::task::spawn_blocking(move || {
            write_then_publish(&dir, &publish_target, &content)
        })
        .await
        .unwrap_or_else(|join_err| Err(io::Error::other(join_err)));

        match result {
            Ok(()) => {
                debug!(path = %target.display(), "Artifact published");
                Ok(target.display().to_string())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(StorageError::KeyExists {
                key: key.to_string(),
            }),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}
