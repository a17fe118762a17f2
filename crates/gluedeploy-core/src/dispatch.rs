//! Custom-resource event dispatch and the response sent back to CloudFormation

use crate::deprovision::Deprovisioner;
use crate::error::Result;
use crate::provision::Provisioner;
use crate::report::{InvocationResult, InvocationStatus};
use crate::{Collaborators, OptionalResources};
use async_trait::async_trait;
use gluedeploy_config::{CreateParameters, DeleteParameters, EnvSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// CloudFormation caps the whole response body at 4096 bytes
const MAX_REASON_LEN: usize = 1024;

/// Custom-resource request. Only `RequestType` is needed to decide what to
/// do; everything else is echoed back in the response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CustomResourceEvent {
    pub request_type: String,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    pub resource_type: String,
    pub logical_resource_id: String,
    pub physical_resource_id: Option<String>,
    pub resource_properties: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Create,
    Update,
    Delete,
    Unknown,
}

impl RequestType {
    pub fn parse(value: &str) -> Self {
        match value {
            "Create" => RequestType::Create,
            "Update" => RequestType::Update,
            "Delete" => RequestType::Delete,
            _ => RequestType::Unknown,
        }
    }
}

/// Invocation details from the Lambda runtime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationContext {
    pub log_stream_name: String,
}

/// Body PUT to the pre-signed `ResponseURL`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    pub status: InvocationStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    pub data: BTreeMap<String, String>,
}

impl CustomResourceResponse {
    pub fn new(
        event: &CustomResourceEvent,
        context: &InvocationContext,
        result: &InvocationResult,
    ) -> Self {
        let mut reason = format!(
            "See the details in CloudWatch Log Stream: {}",
            context.log_stream_name
        );
        if !result.failures.is_empty() {
            reason.push_str(". Failed: ");
            reason.push_str(&result.failures.join("; "));
        }

        Self {
            status: result.status,
            reason: truncate(reason, MAX_REASON_LEN),
            physical_resource_id: result.physical_resource_id.clone(),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: false,
            data: result.data.clone(),
        }
    }
}

fn truncate(mut value: String, max: usize) -> String {
    if value.len() > max {
        let mut end = max;
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        value.truncate(end);
    }
    value
}

/// Delivers the response for a request
#[async_trait]
pub trait ResponseSink: Send + Sync {
    async fn send(&self, response_url: &str, response: &CustomResourceResponse) -> Result<()>;
}

/// Routes Create to the Provisioner and Delete to the Deprovisioner.
/// Parameters are read from `env` on every invocation.
pub struct Dispatcher<E> {
    provisioner: Provisioner,
    deprovisioner: Deprovisioner,
    env: E,
    sink: Arc<dyn ResponseSink>,
}

impl<E: EnvSource + Send + Sync> Dispatcher<E> {
    pub fn new(
        collaborators: Collaborators,
        optional: OptionalResources,
        env: E,
        sink: Arc<dyn ResponseSink>,
    ) -> Self {
        Self {
            provisioner: Provisioner::new(collaborators.clone(), optional),
            deprovisioner: Deprovisioner::new(collaborators, optional),
            env,
            sink,
        }
    }

    /// Handle one event. Create and Delete always send exactly one response;
    /// any other request type is ignored and returns `Ok(None)`.
    pub async fn handle(
        &self,
        event: &CustomResourceEvent,
        context: &InvocationContext,
    ) -> Result<Option<InvocationResult>> {
        let result = match RequestType::parse(&event.request_type) {
            RequestType::Create => match CreateParameters::from_env(&self.env) {
                Ok(params) => self.provisioner.run(&params).await.into_result(),
                Err(err) => {
                    tracing::error!(error = %err, "Create aborted: invalid configuration");
                    InvocationResult::config_failure(err)
                }
            },
            RequestType::Delete => match DeleteParameters::from_env(&self.env) {
                Ok(params) => self.deprovisioner.run(&params).await.into_result(),
                Err(err) => {
                    tracing::error!(error = %err, "Delete aborted: invalid configuration");
                    InvocationResult::config_failure(err)
                }
            },
            RequestType::Update | RequestType::Unknown => {
                tracing::info!(
                    request_type = %event.request_type,
                    "Ignoring request type, no response sent"
                );
                return Ok(None);
            }
        };

        let response = CustomResourceResponse::new(event, context, &result);
        tracing::info!(
            request_type = %event.request_type,
            status = %response.status,
            physical_resource_id = %response.physical_resource_id,
            "Sending response"
        );
        self.sink.send(&event.response_url, &response).await?;
        Ok(Some(result))
    }
}
