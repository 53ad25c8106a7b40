//! Artifact store capability and its directory-backed implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{SynthError, SynthResult};

/// Directory-like store the generated artifacts live in.
///
/// `exists` is a pure query with no side effects; the controller relies on
/// that when using it as the regeneration guard.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// All entry names in the store, generated or not.
    async fn list(&self) -> SynthResult<Vec<String>>;

    /// Whether an entry with this name exists.
    async fn exists(&self, name: &str) -> SynthResult<bool>;

    /// Write text under a name, returning the artifact's location.
    async fn write(&self, name: &str, text: &str) -> SynthResult<PathBuf>;

    /// Delete an entry by name.
    async fn delete(&self, name: &str) -> SynthResult<()>;
}

/// Store backed by a filesystem directory.
///
/// The directory is created on first write rather than at construction, so
/// building the store never touches the disk.
#[derive(Debug, Clone)]
pub struct DirArtifactStore {
    dir: PathBuf,
}

impl DirArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ArtifactStore for DirArtifactStore {
    async fn list(&self) -> SynthResult<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            // A store that was never written to lists as empty.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(SynthError::artifact_io(
                    format!("list {}", self.dir.display()),
                    e,
                ));
            }
        };

        let mut names = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    if let Some(name) = entry.file_name().to_str() {
                        names.push(name.to_string());
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    return Err(SynthError::artifact_io(
                        format!("list {}", self.dir.display()),
                        e,
                    ));
                }
            }
        }
        Ok(names)
    }

    async fn exists(&self, name: &str) -> SynthResult<bool> {
        let path = self.dir.join(name);
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| SynthError::artifact_io(format!("probe {}", path.display()), e))
    }

    async fn write(&self, name: &str, text: &str) -> SynthResult<PathBuf> {
        let path = self.dir.join(name);
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SynthError::artifact_io(format!("create {}", self.dir.display()), e))?;
        tokio::fs::write(&path, text)
            .await
            .map_err(|e| SynthError::artifact_io(format!("write {}", path.display()), e))?;
        Ok(path)
    }

    async fn delete(&self, name: &str) -> SynthResult<()> {
        let path = self.dir.join(name);
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| SynthError::artifact_io(format!("delete {}", path.display()), e))
    }
}
