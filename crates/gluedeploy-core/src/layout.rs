//! Bucket and key conventions.
//!
//! Pure string functions. Every location is recomputed from the parameters on
//! each invocation, so Create and Delete always agree on what exists.

use std::fmt;

/// Prefix of the per-account Glue assets bucket
pub const ASSETS_BUCKET_PREFIX: &str = "aws-glue-assets";

/// Everything this stack writes to the assets bucket lives under this prefix
pub const ASSET_PREFIX: &str = "workshop/glue";

/// Crawl target inside the source bucket
pub const CRAWL_PREFIX: &str = "health_qa/SeniorHealth_QA";

/// Sibling folder of the dataset holding simulated records
pub const FAKE_DATA_SUFFIX: &str = "_FakeData/";

pub const XML_EXTENSION: &str = ".xml";

pub const SPARK_XML_JAR: &str = "spark-xml_2.12-0.16.0.jar";

pub const DQ_FAIL_PREFIX: &str = "dqcheck/failed_records";
pub const DQ_METRICS_PREFIX: &str = "dqcheck/metrics";
pub const DQ_PASS_PREFIX: &str = "dqcheck/passed";

/// Table the DQ job evaluates
pub const DQ_TABLE_NAME: &str = "seniorhealth_qa";

/// A `(bucket, key)` pair
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct AssetLocation {
    pub bucket: String,
    pub key: String,
}

impl AssetLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn uri(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AssetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Layout of the Glue assets bucket for one account/region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLayout {
    assets_bucket: String,
}

impl AssetLayout {
    pub fn new(account_id: &str, region: &str) -> Self {
        Self {
            assets_bucket: format!("{}-{}-{}", ASSETS_BUCKET_PREFIX, account_id, region),
        }
    }

    pub fn assets_bucket(&self) -> &str {
        &self.assets_bucket
    }

    /// Job script location, named after the job
    pub fn script(&self, job_name: &str) -> AssetLocation {
        self.asset(&format!("scripts/{}.py", job_name))
    }

    pub fn spark_xml_lib(&self) -> AssetLocation {
        self.asset(&format!("libs/{}", SPARK_XML_JAR))
    }

    pub fn tmp_dir(&self) -> String {
        self.folder_uri("tmp")
    }

    pub fn spark_ui_logs(&self) -> String {
        self.folder_uri("sparkuilogs")
    }

    pub fn database_location(&self, database: &str) -> String {
        self.folder_uri(&format!("databases/{}", database))
    }

    fn asset(&self, relative: &str) -> AssetLocation {
        AssetLocation::new(
            self.assets_bucket.clone(),
            format!("{}/{}", ASSET_PREFIX, relative),
        )
    }

    fn folder_uri(&self, relative: &str) -> String {
        format!("s3://{}/{}/{}/", self.assets_bucket, ASSET_PREFIX, relative)
    }
}

/// `s3://<bucket>/<prefix>/`
pub fn folder_uri(bucket: &str, prefix: &str) -> String {
    format!("s3://{}/{}/", bucket, prefix)
}

pub fn crawl_target(src_bucket: &str) -> String {
    folder_uri(src_bucket, CRAWL_PREFIX)
}

/// Anonymous HTTPS URL of an object in a public bucket
pub fn public_object_url(bucket: &str, key: &str) -> String {
    format!("https://{}.s3.amazonaws.com/{}", bucket, key)
}

/// Drop the first path segment: `a/b/c.xml` -> `b/c.xml`, `a` -> ``
pub fn strip_first_segment(key: &str) -> &str {
    key.split_once('/').map(|(_, rest)| rest).unwrap_or("")
}

/// Folder with simulated data next to the dataset folder:
/// `x/SeniorHealth_QA/` -> `x/SeniorHealth_QA_FakeData/`
pub fn fake_data_prefix(dataset_prefix: &str) -> String {
    let base = dataset_prefix.strip_suffix('/').unwrap_or(dataset_prefix);
    format!("{}{}", base, FAKE_DATA_SUFFIX)
}

/// Destination key for a simulated data file, or None if it is not XML.
/// Files are flattened into the crawl prefix by file name.
pub fn flattened_crawl_key(source_key: &str) -> Option<String> {
    let filename = source_key.rsplit('/').next().unwrap_or(source_key);
    if filename.contains(XML_EXTENSION) {
        Some(format!("{}/{}", CRAWL_PREFIX, filename))
    } else {
        None
    }
}
