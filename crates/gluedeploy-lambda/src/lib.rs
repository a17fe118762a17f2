// AWS Lambda runtime adapter
//
// Wires the SDK-backed collaborators into the core Dispatcher and serves
// CloudFormation custom-resource events.
//
// Philosophy: Use lambda_runtime's provided tokio
// Clients are built once at cold start and shared across invocations.

use anyhow::{Context as _, Result};
use aws_config::BehaviorVersion;
use gluedeploy_config::{DeployConfig, EnvSource, StdEnvSource};
use gluedeploy_core::{
    Collaborators, CustomResourceEvent, Dispatcher, InvocationContext, OptionalResources,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

mod fetch;
mod glue;
mod init;
mod response;
mod s3;

use fetch::HttpAssetFetcher;
use glue::GlueCatalog;
use response::HttpResponseSink;
use s3::S3ObjectStore;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Lambda handler for custom-resource events
async fn handle_request<E: EnvSource + Send + Sync>(
    event: LambdaEvent<CustomResourceEvent>,
    dispatcher: Arc<Dispatcher<E>>,
) -> std::result::Result<serde_json::Value, Error> {
    let (request, context) = event.into_parts();
    let invocation = InvocationContext {
        log_stream_name: context.env_config.log_stream.clone(),
    };
    let span = tracing::info_span!(
        "custom_resource",
        aws_request_id = %context.request_id,
        request_type = %request.request_type,
        logical_resource_id = %request.logical_resource_id,
    );

    match dispatcher.handle(&request, &invocation).instrument(span).await {
        Ok(Some(result)) => {
            tracing::info!(status = %result.status, "Invocation finished");
        }
        Ok(None) => {}
        Err(err) => {
            tracing::error!(code = err.code(), error = %err, "Invocation failed");
            return Err(Box::new(err));
        }
    }

    Ok(serde_json::json!({}))
}

/// Build the SDK-backed collaborators and the dispatcher
async fn build_dispatcher(optional: OptionalResources) -> Result<Dispatcher<StdEnvSource>> {
    // Credentials and region come from the execution environment
    let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let http = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")?;

    let collaborators = Collaborators {
        store: Arc::new(S3ObjectStore::new(aws_sdk_s3::Client::new(&sdk_config))),
        catalog: Arc::new(GlueCatalog::new(aws_sdk_glue::Client::new(&sdk_config))),
        fetcher: Arc::new(HttpAssetFetcher::new(http.clone())),
    };
    Ok(Dispatcher::new(
        collaborators,
        optional,
        StdEnvSource,
        Arc::new(HttpResponseSink::new(http)),
    ))
}

/// Lambda runtime entry point
pub async fn run() -> std::result::Result<(), Error> {
    let config = DeployConfig::load().context("Failed to load configuration")?;
    init::init_tracing(&config.logging);
    for warning in config.warnings() {
        tracing::warn!("{}", warning);
    }

    let optional = OptionalResources::from(&config);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        build_timestamp = env!("BUILD_TIMESTAMP"),
        crawler_enabled = optional.crawler,
        jobs_enabled = optional.jobs,
        "gluedeploy Lambda starting"
    );

    let dispatcher = Arc::new(build_dispatcher(optional).await?);

    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<CustomResourceEvent>| {
            let dispatcher = dispatcher.clone();
            async move { handle_request(event, dispatcher).await }
        },
    ))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use gluedeploy_config::MapEnvSource;
    use gluedeploy_core::memory::{
        InMemoryCatalog, InMemoryObjectStore, RecordingSink, StaticFetcher,
    };
    use lambda_runtime::{Config, Context};

    fn context(log_stream: &str) -> Context {
        let mut config = Config::default();
        config.log_stream = log_stream.to_string();
        let mut ctx = Context::default();
        ctx.request_id = "aws-request-1".to_string();
        ctx.env_config = Arc::new(config);
        ctx
    }

    fn dispatcher(sink: Arc<RecordingSink>) -> Arc<Dispatcher<MapEnvSource>> {
        let collaborators = Collaborators {
            store: Arc::new(InMemoryObjectStore::new()),
            catalog: Arc::new(InMemoryCatalog::new()),
            fetcher: Arc::new(StaticFetcher::new()),
        };
        Arc::new(Dispatcher::new(
            collaborators,
            OptionalResources::default(),
            MapEnvSource::default(),
            sink,
        ))
    }

    fn event(json: serde_json::Value, log_stream: &str) -> LambdaEvent<CustomResourceEvent> {
        let payload: CustomResourceEvent = serde_json::from_value(json).unwrap();
        LambdaEvent::new(payload, context(log_stream))
    }

    #[tokio::test]
    async fn test_update_returns_empty_object_without_response() {
        let sink = Arc::new(RecordingSink::new());
        let output = handle_request(
            event(serde_json::json!({"RequestType": "Update"}), "stream"),
            dispatcher(sink.clone()),
        )
        .await
        .unwrap();

        assert_eq!(output, serde_json::json!({}));
        assert!(sink.responses().is_empty());
    }

    #[tokio::test]
    async fn test_log_stream_reaches_the_response_reason() {
        let sink = Arc::new(RecordingSink::new());
        // Empty environment: Delete fails on configuration but still responds
        let output = handle_request(
            event(
                serde_json::json!({
                    "RequestType": "Delete",
                    "ResponseURL": "https://example.com/presigned",
                    "RequestId": "cfn-request",
                    "LogicalResourceId": "GlueResources"
                }),
                "2024/05/01/[$LATEST]abc",
            ),
            dispatcher(sink.clone()),
        )
        .await
        .unwrap();

        assert_eq!(output, serde_json::json!({}));
        let responses = sink.responses();
        assert_eq!(responses.len(), 1);
        assert!(responses[0]
            .1
            .reason
            .starts_with("See the details in CloudWatch Log Stream: 2024/05/01/[$LATEST]abc"));
        assert!(responses[0].1.reason.contains("src_bucket"));
    }

    #[tokio::test]
    async fn test_delivery_failure_fails_the_invocation() {
        let sink = Arc::new(RecordingSink::failing());
        let result = handle_request(
            event(serde_json::json!({"RequestType": "Create"}), "stream"),
            dispatcher(sink),
        )
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("E005"));
    }
}
