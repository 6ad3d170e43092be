//! Blob storage for page screenshots

use crate::Result;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Stores binary artifacts and returns a URL referencing them
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Writes `bytes` under the relative `path` and returns the blob URL
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<String>;
}

/// Blob storage rooted in a local directory; URLs use the `file://` scheme
pub struct FsBlobStorage {
    root: PathBuf,
}

impl FsBlobStorage {
    /// Creates a store rooted at `root`, resolved against the working directory
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()?.join(root)
        };
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins a relative blob path to the root, ignoring `..` and absolute parts
    fn resolve(&self, path: &str) -> PathBuf {
        let mut full = self.root.clone();
        for component in Path::new(path).components() {
            if let Component::Normal(part) = component {
                full.push(part);
            }
        }
        full
    }
}

#[async_trait]
impl BlobStorage for FsBlobStorage {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<String> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, bytes).await?;

        let url = Url::from_file_path(&full)
            .map(String::from)
            .unwrap_or_else(|_| format!("file://{}", full.display()));
        tracing::debug!("Stored blob {} ({} bytes)", url, bytes.len());
        Ok(url)
    }
}
