//! Object storage verbs and the listing/deletion helpers built on them

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// S3 rejects DeleteObjects requests with more keys than this
pub const MAX_DELETE_BATCH: usize = 1000;

/// One page of a listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    /// Token for the next page; None once the listing is exhausted
    pub next_continuation_token: Option<String>,
}

/// Object storage verbs used by provisioning
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Succeeds only if the bucket exists and is accessible
    async fn head_bucket(&self, bucket: &str) -> Result<()>;

    /// A bucket already owned by the caller counts as created
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<()>;

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<()>;

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<String>,
    ) -> Result<ObjectPage>;

    async fn delete_objects(&self, bucket: &str, keys: Vec<String>) -> Result<()>;
}

/// List every key under `prefix`, following continuation tokens until exhausted
pub async fn list_all_keys(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: Option<&str>,
) -> Result<Vec<String>> {
    let mut keys = Vec::new();
    let mut token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = store.list_objects(bucket, prefix, token.take()).await?;
        pages += 1;
        keys.extend(page.keys);

        match page.next_continuation_token {
            Some(next) => {
                tracing::debug!(bucket, ?prefix, pages, "Listing truncated, fetching next page");
                token = Some(next);
            }
            None => break,
        }
    }

    tracing::debug!(bucket, ?prefix, pages, count = keys.len(), "Listing complete");
    Ok(keys)
}

/// Delete every object under `prefix` (or the whole bucket).
///
/// Returns the number of keys deleted. An empty listing issues no delete call.
pub async fn delete_all_objects(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: Option<&str>,
) -> Result<usize> {
    let keys = list_all_keys(store, bucket, prefix).await?;
    if keys.is_empty() {
        tracing::info!(bucket, ?prefix, "No objects to delete");
        return Ok(0);
    }

    let total = keys.len();
    for chunk in keys.chunks(MAX_DELETE_BATCH) {
        store.delete_objects(bucket, chunk.to_vec()).await?;
    }

    tracing::info!(bucket, ?prefix, deleted = total, "Deleted objects");
    Ok(total)
}
