//! Resource parameters supplied by the deployment template
//!
//! Each operation reads only the keys it needs. Names are exactly the
//! environment variable names the template sets on the function.

use crate::env_overrides::EnvSource;
use crate::error::ConfigError;
use std::fmt;

/// Parsed `s3://bucket/key` location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Uri {
    pub bucket: String,
    pub key: String,
}

impl S3Uri {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse an `s3://` URI. The key may be empty (`s3://bucket` or `s3://bucket/`).
    pub fn parse(value: &str) -> Option<Self> {
        let rest = value.strip_prefix("s3://")?;
        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return None;
        }
        Some(Self::new(bucket, key))
    }
}

impl fmt::Display for S3Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Parameters for the Create request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateParameters {
    pub src_bucket: String,
    pub transformed_bucket: String,
    pub account_id: String,
    pub aws_region: String,
    pub bucket_prefix: String,
    /// Public dataset folder copied into the source bucket
    pub qa_data_path: S3Uri,
    pub glue_dq_script: String,
    pub glue_processqa_script: String,
    pub xml_lib_path: String,
    pub glue_dq_db_name: String,
    pub glue_crawler_name: String,
    pub glue_dq_job_name: String,
    pub glue_processing_job_name: String,
    pub glue_role_arn: String,
    pub glue_dq_fail_tbl_name: String,
    pub glue_processed_data_path_prefix: String,
}

impl CreateParameters {
    pub fn from_env<E: EnvSource + ?Sized>(env: &E) -> Result<Self, ConfigError> {
        let qa_data_path = required(env, "qa_data_path")?;
        let qa_data_path = S3Uri::parse(&qa_data_path).ok_or_else(|| ConfigError::InvalidS3Uri {
            key: "qa_data_path".to_string(),
            value: qa_data_path.clone(),
        })?;

        Ok(Self {
            src_bucket: required(env, "src_bucket")?,
            transformed_bucket: required(env, "transformed_bucket")?,
            account_id: required(env, "account_id")?,
            aws_region: required(env, "aws_region")?,
            bucket_prefix: required(env, "bucket_prefix")?,
            qa_data_path,
            glue_dq_script: required(env, "glue_dq_script")?,
            glue_processqa_script: required(env, "glue_processqa_script")?,
            xml_lib_path: required(env, "xml_lib_path")?,
            glue_dq_db_name: required(env, "glue_dq_db_name")?,
            glue_crawler_name: required(env, "glue_crawler_name")?,
            glue_dq_job_name: required(env, "glue_dq_job_name")?,
            glue_processing_job_name: required(env, "glue_processing_job_name")?,
            glue_role_arn: required(env, "glue_role_arn")?,
            glue_dq_fail_tbl_name: required(env, "glue_dq_fail_tbl_name")?,
            glue_processed_data_path_prefix: required(env, "glue_processed_data_path_prefix")?,
        })
    }
}

/// Parameters for the Delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteParameters {
    pub src_bucket: String,
    pub transformed_bucket: String,
    pub account_id: String,
    pub aws_region: String,
    pub glue_dq_db_name: String,
    pub glue_crawler_name: String,
    pub glue_dq_job_name: String,
    pub glue_processing_job_name: String,
}

impl DeleteParameters {
    pub fn from_env<E: EnvSource + ?Sized>(env: &E) -> Result<Self, ConfigError> {
        Ok(Self {
            src_bucket: required(env, "src_bucket")?,
            transformed_bucket: required(env, "transformed_bucket")?,
            account_id: required(env, "account_id")?,
            aws_region: required(env, "aws_region")?,
            glue_dq_db_name: required(env, "glue_dq_db_name")?,
            glue_crawler_name: required(env, "glue_crawler_name")?,
            glue_dq_job_name: required(env, "glue_dq_job_name")?,
            glue_processing_job_name: required(env, "glue_processing_job_name")?,
        })
    }
}

fn required<E: EnvSource + ?Sized>(env: &E, key: &str) -> Result<String, ConfigError> {
    match env.get_raw(key) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyParameter {
            key: key.to_string(),
        }),
        Some(value) => Ok(value),
        None => Err(ConfigError::MissingParameter {
            key: key.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MapEnvSource;

    fn delete_env() -> MapEnvSource {
        MapEnvSource::from_pairs([
            ("src_bucket", "srcbkt"),
            ("transformed_bucket", "xfbkt"),
            ("account_id", "123456789012"),
            ("aws_region", "us-east-1"),
            ("glue_dq_db_name", "dq_db"),
            ("glue_crawler_name", "dq_crawler"),
            ("glue_dq_job_name", "dq_job"),
            ("glue_processing_job_name", "qa_job"),
        ])
    }

    #[test]
    fn test_s3_uri_parse() {
        let uri = S3Uri::parse("s3://public/health_qa/SeniorHealth_QA/").unwrap();
        assert_eq!(uri.bucket, "public");
        assert_eq!(uri.key, "health_qa/SeniorHealth_QA/");
        assert_eq!(uri.to_string(), "s3://public/health_qa/SeniorHealth_QA/");

        let bare = S3Uri::parse("s3://public").unwrap();
        assert_eq!(bare.bucket, "public");
        assert_eq!(bare.key, "");

        assert!(S3Uri::parse("https://public.s3.amazonaws.com/x").is_none());
        assert!(S3Uri::parse("s3:///key").is_none());
    }

    #[test]
    fn test_delete_parameters_from_env() {
        let params = DeleteParameters::from_env(&delete_env()).unwrap();
        assert_eq!(params.src_bucket, "srcbkt");
        assert_eq!(params.glue_processing_job_name, "qa_job");
    }

    #[test]
    fn test_missing_parameter_names_key() {
        let mut env = delete_env();
        env.remove("glue_dq_db_name");
        let err = DeleteParameters::from_env(&env).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingParameter {
                key: "glue_dq_db_name".to_string()
            }
        );
        assert_eq!(err.key(), "glue_dq_db_name");
    }

    #[test]
    fn test_empty_parameter_is_rejected() {
        let mut env = delete_env();
        env.set("src_bucket", " ");
        let err = DeleteParameters::from_env(&env).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyParameter { .. }));
    }

    #[test]
    fn test_create_parameters_reject_non_s3_dataset_path() {
        let mut env = delete_env();
        for (key, value) in [
            ("bucket_prefix", "demo"),
            ("qa_data_path", "https://example.com/data/"),
            ("glue_dq_script", "https://example.com/dq.py"),
            ("glue_processqa_script", "https://example.com/qa.py"),
            ("xml_lib_path", "https://example.com/spark-xml.jar"),
            ("glue_role_arn", "arn:aws:iam::123456789012:role/glue"),
            ("glue_dq_fail_tbl_name", "dq_failed"),
            ("glue_processed_data_path_prefix", "processed"),
        ] {
            env.set(key, value);
        }
        let err = CreateParameters::from_env(&env).unwrap_err();
        assert_eq!(err.key(), "qa_data_path");

        env.set("qa_data_path", "s3://public/health_qa/SeniorHealth_QA/");
        let params = CreateParameters::from_env(&env).unwrap();
        assert_eq!(params.qa_data_path.bucket, "public");
    }
}
