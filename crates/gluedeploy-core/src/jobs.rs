//! Glue job and crawler definitions

use crate::layout::{
    folder_uri, AssetLayout, AssetLocation, DQ_FAIL_PREFIX, DQ_METRICS_PREFIX, DQ_PASS_PREFIX,
    DQ_TABLE_NAME,
};
use std::collections::BTreeMap;

pub const GLUE_VERSION: &str = "4.0";
pub const JOB_COMMAND: &str = "glueetl";
pub const PYTHON_VERSION: &str = "3";
pub const WORKER_TYPE: &str = "G.1X";
pub const NUMBER_OF_WORKERS: i32 = 2;
pub const MAX_RETRIES: i32 = 0;

/// Rules evaluated by the DQ job
pub const DQ_RULES: &str = r#"IsComplete "Answer",IsComplete "_pid""#;

pub const CRAWLER_UPDATE_BEHAVIOR: &str = "UPDATE_IN_DATABASE";
pub const CRAWLER_DELETE_BEHAVIOR: &str = "DEPRECATE_IN_DATABASE";

/// Job `DefaultArguments`, keyed by argument name (`--TempDir`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobDefaultArguments(BTreeMap<String, String>);

impl JobDefaultArguments {
    /// Arguments shared by every job: catalog, metrics, Spark UI, logs, spark-xml
    pub fn common(layout: &AssetLayout) -> Self {
        let mut args = Self::default();
        args.insert("--enable-glue-datacatalog", "true");
        args.insert("--job-bookmark-option", "job-bookmark-disable");
        args.insert("--TempDir", layout.tmp_dir());
        args.insert("--enable-metrics", "true");
        args.insert("--enable-spark-ui", "true");
        args.insert("--spark-event-logs-path", layout.spark_ui_logs());
        args.insert("--enable-job-insights", "true");
        args.insert("--enable-continuous-cloudwatch-log", "true");
        args.insert("--job-language", "python");
        args.insert("--extra-jars", layout.spark_xml_lib().uri());
        args
    }

    /// Common arguments plus the DQ job's input table, rules and output paths
    pub fn data_quality(layout: &AssetLayout, transformed_bucket: &str, database: &str) -> Self {
        let mut args = Self::common(layout);
        args.insert(
            "--DQFAIL_RECORDS_PATH",
            folder_uri(transformed_bucket, DQ_FAIL_PREFIX),
        );
        args.insert("--DB_NAME", database);
        args.insert("--TBL_NAME", DQ_TABLE_NAME);
        args.insert(
            "--DQMETRICS_OUTPUT_PATH",
            folder_uri(transformed_bucket, DQ_METRICS_PREFIX),
        );
        args.insert(
            "--DQ_PASS_RECORDS_PATH",
            folder_uri(transformed_bucket, DQ_PASS_PREFIX),
        );
        args.insert("--RULES", DQ_RULES);
        args
    }

    /// Common arguments plus the processing job's input (DQ passed records) and output
    pub fn processing(layout: &AssetLayout, transformed_bucket: &str, output_prefix: &str) -> Self {
        let mut args = Self::common(layout);
        args.insert(
            "--INPUT_RECORDS_PATH",
            folder_uri(transformed_bucket, DQ_PASS_PREFIX),
        );
        args.insert(
            "--OUTPUT_RECORDS_PATH",
            folder_uri(transformed_bucket, output_prefix),
        );
        args
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A Glue ETL job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDefinition {
    pub name: String,
    pub role: String,
    pub script_location: String,
    pub default_arguments: JobDefaultArguments,
    pub glue_version: &'static str,
    pub command: &'static str,
    pub python_version: &'static str,
    pub max_retries: i32,
    pub number_of_workers: i32,
    pub worker_type: &'static str,
}

impl JobDefinition {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        script: &AssetLocation,
        default_arguments: JobDefaultArguments,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            script_location: script.uri(),
            default_arguments,
            glue_version: GLUE_VERSION,
            command: JOB_COMMAND,
            python_version: PYTHON_VERSION,
            max_retries: MAX_RETRIES,
            number_of_workers: NUMBER_OF_WORKERS,
            worker_type: WORKER_TYPE,
        }
    }
}

/// A crawler over a single S3 path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlerDefinition {
    pub name: String,
    pub role: String,
    pub database: String,
    pub s3_target: String,
    pub update_behavior: &'static str,
    pub delete_behavior: &'static str,
}

impl CrawlerDefinition {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        database: impl Into<String>,
        s3_target: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            database: database.into(),
            s3_target: s3_target.into(),
            update_behavior: CRAWLER_UPDATE_BEHAVIOR,
            delete_behavior: CRAWLER_DELETE_BEHAVIOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> AssetLayout {
        AssetLayout::new("123456789012", "us-east-1")
    }

    #[test]
    fn test_common_arguments() {
        let args = JobDefaultArguments::common(&layout());
        assert_eq!(args.iter().count(), 10);
        assert_eq!(
            args.get("--TempDir"),
            Some("s3://aws-glue-assets-123456789012-us-east-1/workshop/glue/tmp/")
        );
        assert_eq!(
            args.get("--extra-jars"),
            Some("s3://aws-glue-assets-123456789012-us-east-1/workshop/glue/libs/spark-xml_2.12-0.16.0.jar")
        );
        assert_eq!(args.get("--job-bookmark-option"), Some("job-bookmark-disable"));
    }

    #[test]
    fn test_job_specific_arguments_do_not_leak() {
        let dq = JobDefaultArguments::data_quality(&layout(), "xfbkt", "dq_db");
        let processing = JobDefaultArguments::processing(&layout(), "xfbkt", "processed");

        assert_eq!(dq.get("--TBL_NAME"), Some("seniorhealth_qa"));
        assert_eq!(dq.get("--DB_NAME"), Some("dq_db"));
        assert_eq!(dq.get("--RULES"), Some(r#"IsComplete "Answer",IsComplete "_pid""#));
        assert_eq!(
            dq.get("--DQFAIL_RECORDS_PATH"),
            Some("s3://xfbkt/dqcheck/failed_records/")
        );

        assert_eq!(
            processing.get("--INPUT_RECORDS_PATH"),
            Some("s3://xfbkt/dqcheck/passed/")
        );
        assert_eq!(
            processing.get("--OUTPUT_RECORDS_PATH"),
            Some("s3://xfbkt/processed/")
        );
        assert_eq!(processing.get("--RULES"), None);
        assert_eq!(dq.get("--OUTPUT_RECORDS_PATH"), None);
    }

    #[test]
    fn test_job_definition_defaults() {
        let layout = layout();
        let job = JobDefinition::new(
            "dq_job",
            "arn:aws:iam::123456789012:role/glue",
            &layout.script("dq_job"),
            JobDefaultArguments::common(&layout),
        );
        assert_eq!(job.glue_version, "4.0");
        assert_eq!(job.command, "glueetl");
        assert_eq!(job.max_retries, 0);
        assert_eq!(job.number_of_workers, 2);
        assert_eq!(job.worker_type, "G.1X");
        assert!(job.script_location.ends_with("/workshop/glue/scripts/dq_job.py"));
    }
}
