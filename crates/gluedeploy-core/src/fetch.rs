//! Download of scripts, libraries and public dataset objects

use crate::error::Result;
use crate::layout::AssetLocation;
use crate::storage::ObjectStore;
use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Download the full body at `url`
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

/// Fetch `url` and put the body at `target`
pub async fn copy_from_url(
    fetcher: &dyn AssetFetcher,
    store: &dyn ObjectStore,
    url: &str,
    target: &AssetLocation,
) -> Result<()> {
    let body = fetcher.fetch(url).await?;
    let size = body.len();
    store.put_object(&target.bucket, &target.key, body).await?;
    tracing::debug!(url, target = %target, size, "Copied asset");
    Ok(())
}
