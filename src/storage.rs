use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    fn public_url(&self, key: &str) -> String;
}

/// Stores uploads as plain files in one directory served as static assets.
#[derive(Clone)]
pub struct DiskStorage {
    root: PathBuf,
    url_prefix: String,
}

impl DiskStorage {
    pub async fn new(root: impl AsRef<Path>, url_prefix: &str) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("create upload dir {}", root.display()))?;
        Ok(Self {
            root,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StorageClient for DiskStorage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        anyhow::ensure!(
            !key.is_empty()
                && !key.starts_with('.')
                && !key.contains(|c: char| c == '/' || c == '\\'),
            "invalid object key {key:?}"
        );
        // write under a temporary name so readers never see a half-written file
        let tmp = self.root.join(format!(".{}.part", Uuid::new_v4()));
        let dest = self.root.join(key);
        tokio::fs::write(&tmp, &body)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        if let Err(e) = tokio::fs::rename(&tmp, &dest).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e).with_context(|| format!("rename into {}", dest.display()));
        }
        tracing::debug!(key, content_type, bytes = body.len(), "object stored");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.url_prefix, key)
    }
}
