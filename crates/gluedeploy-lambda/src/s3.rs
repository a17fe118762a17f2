// S3-backed object store

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, Delete, ObjectIdentifier,
};
use aws_sdk_s3::Client;
use bytes::Bytes;
use gluedeploy_core::{ObjectPage, ObjectStore, ProvisionError, Result};

/// Buckets in us-east-1 are created without a location constraint
const DEFAULT_REGION: &str = "us-east-1";

pub(crate) struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn head_bucket(&self, bucket: &str) -> Result<()> {
        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| {
                ProvisionError::object_store("HeadBucket", bucket, DisplayErrorContext(&e))
            })?;
        Ok(())
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<()> {
        let mut request = self.client.create_bucket().bucket(bucket);
        if region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }
        match request.send().await {
            Ok(_) => Ok(()),
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|err| err.is_bucket_already_owned_by_you()) =>
            {
                tracing::info!(bucket, "Bucket already owned by this account");
                Ok(())
            }
            Err(e) => Err(ProvisionError::object_store(
                "CreateBucket",
                bucket,
                DisplayErrorContext(&e),
            )),
        }
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                ProvisionError::object_store(
                    "PutObject",
                    format!("{}/{}", bucket, key),
                    DisplayErrorContext(&e),
                )
            })?;
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<String>,
    ) -> Result<ObjectPage> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_prefix(prefix.map(str::to_string))
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|e| {
                ProvisionError::object_store("ListObjectsV2", bucket, DisplayErrorContext(&e))
            })?;

        let keys = output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_string))
            .collect();
        let next_continuation_token = if output.is_truncated().unwrap_or(false) {
            output.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ObjectPage {
            keys,
            next_continuation_token,
        })
    }

    async fn delete_objects(&self, bucket: &str, keys: Vec<String>) -> Result<()> {
        let requested = keys.len();
        let objects = keys
            .into_iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ProvisionError::object_store("DeleteObjects", bucket, e))?;
        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|e| ProvisionError::object_store("DeleteObjects", bucket, e))?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| {
                ProvisionError::object_store("DeleteObjects", bucket, DisplayErrorContext(&e))
            })?;

        // Per-key failures come back in a successful response
        if let Some(first) = output.errors().first() {
            return Err(ProvisionError::object_store(
                "DeleteObjects",
                bucket,
                format!(
                    "{} of {} keys not deleted, first '{}': {}",
                    output.errors().len(),
                    requested,
                    first.key().unwrap_or_default(),
                    first.message().or(first.code()).unwrap_or("unknown error"),
                ),
            ));
        }
        Ok(())
    }
}
