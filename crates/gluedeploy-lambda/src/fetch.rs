// HTTPS downloads of scripts, libraries and public dataset objects

use async_trait::async_trait;
use bytes::Bytes;
use gluedeploy_core::{AssetFetcher, ProvisionError, Result};

pub(crate) struct HttpAssetFetcher {
    client: reqwest::Client,
}

impl HttpAssetFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| ProvisionError::fetch(url, e))?;

        response
            .bytes()
            .await
            .map_err(|e| ProvisionError::fetch(url, e))
    }
}
