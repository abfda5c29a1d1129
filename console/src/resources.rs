/// File-system bridge used by the view: every path is resolved against the
/// resource root before it is touched.
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub trait ResourceStore {
    /// Maps a root-relative path to an absolute one.
    fn resolve(&self, relative: &str) -> PathBuf;

    /// Reports whether `path` exists. Errors while checking count as "missing".
    async fn exists(&self, path: &Path) -> bool;

    async fn read_text(&self, path: &Path) -> Result<String>;

    /// Overwrites `path` with `content`.
    async fn write_text(&self, path: &Path, content: &str) -> Result<()>;
}

/// Resources that live on the local disk under `root`.
#[derive(Debug, Clone)]
pub struct DiskResources {
    root: PathBuf,
}

impl DiskResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceStore for DiskResources {
    fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn read_text(&self, path: &Path) -> Result<String> {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    async fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

#[cfg(test)]
pub use memory::MemoryResources;
