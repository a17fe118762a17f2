//! Shared fixture for provisioning tests
//!
//! Seeds an in-memory "public" bucket with a dataset and simulated data, and
//! registers the same bodies with the fetcher under their public URLs.

#![allow(dead_code)]

use bytes::Bytes;
use gluedeploy_config::{CreateParameters, DeleteParameters, MapEnvSource};
use gluedeploy_core::layout::public_object_url;
use gluedeploy_core::memory::{InMemoryCatalog, InMemoryObjectStore, StaticFetcher};
use gluedeploy_core::{Catalog, Collaborators};
use std::sync::Arc;

pub const PUBLIC_BUCKET: &str = "public-data";
pub const DATASET_PREFIX: &str = "demo/health_qa/SeniorHealth_QA/";
pub const FAKE_DATA_PREFIX: &str = "demo/health_qa/SeniorHealth_QA_FakeData/";
pub const SRC_BUCKET: &str = "srcbkt";
pub const TRANSFORMED_BUCKET: &str = "xfbkt";
pub const ASSETS_BUCKET: &str = "aws-glue-assets-123456789012-us-west-2";

pub const DQ_SCRIPT_URL: &str = "https://assets.example.com/glue/dq_check.py";
pub const PROCESSING_SCRIPT_URL: &str = "https://assets.example.com/glue/process_qa.py";
pub const XML_LIB_URL: &str = "https://repo.example.com/spark-xml_2.12-0.16.0.jar";

pub struct Fixture {
    pub store: Arc<InMemoryObjectStore>,
    pub catalog: Arc<InMemoryCatalog>,
    pub fetcher: Arc<StaticFetcher>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_page_size(1000)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        let fixture = Self {
            store: Arc::new(InMemoryObjectStore::with_page_size(page_size)),
            catalog: Arc::new(InMemoryCatalog::new()),
            fetcher: Arc::new(StaticFetcher::new()),
        };
        fixture.store.add_bucket(PUBLIC_BUCKET);
        fixture.store.add_bucket(SRC_BUCKET);
        fixture.store.add_bucket(TRANSFORMED_BUCKET);
        fixture
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            store: self.store.clone(),
            catalog: self.catalog.clone(),
            fetcher: self.fetcher.clone(),
        }
    }

    pub fn seed_public_object(&self, key: &str, body: impl Into<Bytes>) {
        let body: Bytes = body.into();
        self.store.insert(PUBLIC_BUCKET, key, body.clone());
        self.fetcher
            .insert(&public_object_url(PUBLIC_BUCKET, key), body);
    }

    /// `count` XML files under the dataset prefix
    pub fn seed_dataset(&self, count: usize) {
        for i in 0..count {
            let key = format!("{}{}_QA.xml", DATASET_PREFIX, i);
            self.seed_public_object(&key, format!("<Document id=\"{}\"/>", i));
        }
    }

    /// `xml_count` XML files plus one non-XML file under the simulated data prefix
    pub fn seed_fake_data(&self, xml_count: usize) {
        for i in 0..xml_count {
            let key = format!("{}fake_{}.xml", FAKE_DATA_PREFIX, i);
            self.seed_public_object(&key, format!("<Document fake=\"{}\"/>", i));
        }
        self.seed_public_object(&format!("{}README.txt", FAKE_DATA_PREFIX), "generated");
    }

    /// Database left behind by an earlier Create
    pub async fn seed_database(&self) {
        self.catalog
            .create_database("dq_db", "s3://assets/workshop/glue/databases/dq_db/")
            .await
            .expect("fresh catalog");
    }

    pub fn seed_job_assets(&self) {
        self.fetcher.insert(DQ_SCRIPT_URL, "print('dq')");
        self.fetcher.insert(PROCESSING_SCRIPT_URL, "print('process')");
        self.fetcher.insert(XML_LIB_URL, Bytes::from_static(b"PK\x03\x04"));
    }
}

pub fn delete_env() -> MapEnvSource {
    MapEnvSource::from_pairs([
        ("src_bucket", SRC_BUCKET),
        ("transformed_bucket", TRANSFORMED_BUCKET),
        ("account_id", "123456789012"),
        ("aws_region", "us-west-2"),
        ("glue_dq_db_name", "dq_db"),
        ("glue_crawler_name", "dq_crawler"),
        ("glue_dq_job_name", "dq_job"),
        ("glue_processing_job_name", "process_qa_job"),
    ])
}

pub fn create_env() -> MapEnvSource {
    let mut env = delete_env();
    let qa_data_path = format!("s3://{}/{}", PUBLIC_BUCKET, DATASET_PREFIX);
    for (key, value) in [
        ("bucket_prefix", "demo"),
        ("qa_data_path", qa_data_path.as_str()),
        ("glue_dq_script", DQ_SCRIPT_URL),
        ("glue_processqa_script", PROCESSING_SCRIPT_URL),
        ("xml_lib_path", XML_LIB_URL),
        ("glue_role_arn", "arn:aws:iam::123456789012:role/GlueRole"),
        ("glue_dq_fail_tbl_name", "dq_failed_records"),
        ("glue_processed_data_path_prefix", "processed/qa"),
    ] {
        env.set(key, value);
    }
    env
}

pub fn create_params() -> CreateParameters {
    CreateParameters::from_env(&create_env()).expect("complete create parameters")
}

pub fn delete_params() -> DeleteParameters {
    DeleteParameters::from_env(&delete_env()).expect("complete delete parameters")
}
