// Response delivery to the pre-signed CloudFormation URL
//
// The URL is signed for an empty Content-Type, so the header is sent blank.

use async_trait::async_trait;
use gluedeploy_core::{CustomResourceResponse, ProvisionError, ResponseSink, Result};
use reqwest::header::CONTENT_TYPE;

pub(crate) struct HttpResponseSink {
    client: reqwest::Client,
}

impl HttpResponseSink {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn build_request(
        &self,
        response_url: &str,
        response: &CustomResourceResponse,
    ) -> Result<reqwest::Request> {
        let body = serde_json::to_vec(response).map_err(ProvisionError::callback)?;
        self.client
            .put(response_url)
            .header(CONTENT_TYPE, "")
            .body(body)
            .build()
            .map_err(ProvisionError::callback)
    }
}

#[async_trait]
impl ResponseSink for HttpResponseSink {
    async fn send(&self, response_url: &str, response: &CustomResourceResponse) -> Result<()> {
        let request = self.build_request(response_url, response)?;
        let reply = self
            .client
            .execute(request)
            .await
            .and_then(|reply| reply.error_for_status())
            .map_err(ProvisionError::callback)?;

        tracing::info!(status = %reply.status(), "Response delivered");
        Ok(())
    }
}
