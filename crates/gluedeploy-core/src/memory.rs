//! In-memory collaborators
//!
//! Behave like the AWS services for the verbs this crate uses (missing bucket,
//! duplicate database, paginated listings) and record every call. Used by the
//! test suites and for local dry runs.

use crate::catalog::Catalog;
use crate::dispatch::{CustomResourceResponse, ResponseSink};
use crate::error::{ProvisionError, Result};
use crate::fetch::AssetFetcher;
use crate::jobs::{CrawlerDefinition, JobDefinition};
use crate::schema::TableDefinition;
use crate::storage::{ObjectPage, ObjectStore};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StoreOp {
    HeadBucket,
    CreateBucket,
    PutObject,
    ListObjects,
    DeleteObjects,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub op: StoreOp,
    pub bucket: String,
    /// Key for puts, prefix for listings, key count for deletes
    pub detail: Option<String>,
}

#[derive(Default)]
struct StoreState {
    buckets: BTreeMap<String, BTreeMap<String, Bytes>>,
    calls: Vec<StoreCall>,
    failures: BTreeSet<(StoreOp, String)>,
}

/// Buckets of objects kept in memory
pub struct InMemoryObjectStore {
    state: Mutex<StoreState>,
    page_size: usize,
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::with_page_size(1000)
    }

    /// Listings return at most `page_size` keys per call
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            page_size: page_size.max(1),
        }
    }

    pub fn add_bucket(&self, bucket: &str) {
        lock(&self.state)
            .buckets
            .entry(bucket.to_string())
            .or_default();
    }

    /// Insert an object, creating the bucket if needed
    pub fn insert(&self, bucket: &str, key: &str, body: impl Into<Bytes>) {
        lock(&self.state)
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), body.into());
    }

    pub fn has_bucket(&self, bucket: &str) -> bool {
        lock(&self.state).buckets.contains_key(bucket)
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        lock(&self.state)
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key).cloned())
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        lock(&self.state)
            .buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Make every `op` against `bucket` fail
    pub fn fail_on(&self, op: StoreOp, bucket: &str) {
        lock(&self.state).failures.insert((op, bucket.to_string()));
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        lock(&self.state).calls.clone()
    }

    pub fn calls_of(&self, op: StoreOp) -> Vec<StoreCall> {
        self.calls().into_iter().filter(|c| c.op == op).collect()
    }

    fn begin(
        &self,
        op: StoreOp,
        operation: &'static str,
        bucket: &str,
        detail: Option<String>,
    ) -> Result<MutexGuard<'_, StoreState>> {
        let mut state = lock(&self.state);
        state.calls.push(StoreCall {
            op,
            bucket: bucket.to_string(),
            detail,
        });
        if state.failures.contains(&(op, bucket.to_string())) {
            return Err(ProvisionError::object_store(
                operation,
                bucket,
                "injected failure",
            ));
        }
        Ok(state)
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn head_bucket(&self, bucket: &str) -> Result<()> {
        let state = self.begin(StoreOp::HeadBucket, "HeadBucket", bucket, None)?;
        if state.buckets.contains_key(bucket) {
            Ok(())
        } else {
            Err(ProvisionError::object_store("HeadBucket", bucket, "NotFound"))
        }
    }

    async fn create_bucket(&self, bucket: &str, _region: &str) -> Result<()> {
        let mut state = self.begin(StoreOp::CreateBucket, "CreateBucket", bucket, None)?;
        state.buckets.entry(bucket.to_string()).or_default();
        Ok(())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<()> {
        let mut state = self.begin(
            StoreOp::PutObject,
            "PutObject",
            bucket,
            Some(key.to_string()),
        )?;
        match state.buckets.get_mut(bucket) {
            Some(objects) => {
                objects.insert(key.to_string(), body);
                Ok(())
            }
            None => Err(ProvisionError::object_store(
                "PutObject",
                format!("{}/{}", bucket, key),
                "NoSuchBucket",
            )),
        }
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<String>,
    ) -> Result<ObjectPage> {
        let state = self.begin(
            StoreOp::ListObjects,
            "ListObjectsV2",
            bucket,
            prefix.map(str::to_string),
        )?;
        let objects = state
            .buckets
            .get(bucket)
            .ok_or_else(|| ProvisionError::object_store("ListObjectsV2", bucket, "NoSuchBucket"))?;

        // Keys are sorted; the token is the last key of the previous page
        let mut matching = objects
            .keys()
            .filter(|key| prefix.map_or(true, |p| key.starts_with(p)))
            .filter(|key| {
                continuation_token
                    .as_ref()
                    .map_or(true, |token| key.as_str() > token.as_str())
            });

        let keys: Vec<String> = matching.by_ref().take(self.page_size).cloned().collect();
        let next_continuation_token = if matching.next().is_some() {
            keys.last().cloned()
        } else {
            None
        };

        Ok(ObjectPage {
            keys,
            next_continuation_token,
        })
    }

    async fn delete_objects(&self, bucket: &str, keys: Vec<String>) -> Result<()> {
        let mut state = self.begin(
            StoreOp::DeleteObjects,
            "DeleteObjects",
            bucket,
            Some(keys.len().to_string()),
        )?;
        let objects = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| ProvisionError::object_store("DeleteObjects", bucket, "NoSuchBucket"))?;
        for key in &keys {
            objects.remove(key);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CatalogOp {
    CreateDatabase,
    DeleteDatabase,
    CreateTable,
    CreateCrawler,
    StartCrawler,
    DeleteCrawler,
    CreateJob,
    DeleteJob,
}

#[derive(Default)]
struct CatalogState {
    databases: BTreeMap<String, String>,
    tables: BTreeMap<(String, String), TableDefinition>,
    crawlers: BTreeMap<String, CrawlerDefinition>,
    started_crawlers: Vec<String>,
    jobs: BTreeMap<String, JobDefinition>,
    calls: Vec<(CatalogOp, String)>,
    failures: BTreeSet<CatalogOp>,
}

/// Catalog kept in memory; duplicate and missing entities fail like Glue does
#[derive(Default)]
pub struct InMemoryCatalog {
    state: Mutex<CatalogState>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, op: CatalogOp) {
        lock(&self.state).failures.insert(op);
    }

    pub fn database_location(&self, name: &str) -> Option<String> {
        lock(&self.state).databases.get(name).cloned()
    }

    pub fn table(&self, database: &str, name: &str) -> Option<TableDefinition> {
        lock(&self.state)
            .tables
            .get(&(database.to_string(), name.to_string()))
            .cloned()
    }

    pub fn crawler(&self, name: &str) -> Option<CrawlerDefinition> {
        lock(&self.state).crawlers.get(name).cloned()
    }

    pub fn started_crawlers(&self) -> Vec<String> {
        lock(&self.state).started_crawlers.clone()
    }

    pub fn job(&self, name: &str) -> Option<JobDefinition> {
        lock(&self.state).jobs.get(name).cloned()
    }

    pub fn calls(&self) -> Vec<(CatalogOp, String)> {
        lock(&self.state).calls.clone()
    }

    fn begin(
        &self,
        op: CatalogOp,
        operation: &'static str,
        target: &str,
    ) -> Result<MutexGuard<'_, CatalogState>> {
        let mut state = lock(&self.state);
        state.calls.push((op, target.to_string()));
        if state.failures.contains(&op) {
            return Err(ProvisionError::catalog(operation, target, "injected failure"));
        }
        Ok(state)
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn create_database(&self, name: &str, location_uri: &str) -> Result<()> {
        let mut state = self.begin(CatalogOp::CreateDatabase, "CreateDatabase", name)?;
        if state.databases.contains_key(name) {
            return Err(ProvisionError::catalog(
                "CreateDatabase",
                name,
                "AlreadyExistsException: Database already exists.",
            ));
        }
        state
            .databases
            .insert(name.to_string(), location_uri.to_string());
        Ok(())
    }

    async fn delete_database(&self, name: &str) -> Result<()> {
        let mut state = self.begin(CatalogOp::DeleteDatabase, "DeleteDatabase", name)?;
        if state.databases.remove(name).is_none() {
            return Err(ProvisionError::catalog(
                "DeleteDatabase",
                name,
                "EntityNotFoundException: Database not found.",
            ));
        }
        state.tables.retain(|(database, _), _| database != name);
        Ok(())
    }

    async fn create_table(&self, table: &TableDefinition) -> Result<()> {
        let mut state = self.begin(CatalogOp::CreateTable, "CreateTable", &table.name)?;
        if !state.databases.contains_key(&table.database) {
            return Err(ProvisionError::catalog(
                "CreateTable",
                &table.name,
                "EntityNotFoundException: Database not found.",
            ));
        }
        let key = (table.database.clone(), table.name.clone());
        if state.tables.contains_key(&key) {
            return Err(ProvisionError::catalog(
                "CreateTable",
                &table.name,
                "AlreadyExistsException: Table already exists.",
            ));
        }
        state.tables.insert(key, table.clone());
        Ok(())
    }

    async fn create_crawler(&self, crawler: &CrawlerDefinition) -> Result<()> {
        let mut state = self.begin(CatalogOp::CreateCrawler, "CreateCrawler", &crawler.name)?;
        if state.crawlers.contains_key(&crawler.name) {
            return Err(ProvisionError::catalog(
                "CreateCrawler",
                &crawler.name,
                "AlreadyExistsException",
            ));
        }
        state.crawlers.insert(crawler.name.clone(), crawler.clone());
        Ok(())
    }

    async fn start_crawler(&self, name: &str) -> Result<()> {
        let mut state = self.begin(CatalogOp::StartCrawler, "StartCrawler", name)?;
        if !state.crawlers.contains_key(name) {
            return Err(ProvisionError::catalog(
                "StartCrawler",
                name,
                "EntityNotFoundException",
            ));
        }
        state.started_crawlers.push(name.to_string());
        Ok(())
    }

    async fn delete_crawler(&self, name: &str) -> Result<()> {
        let mut state = self.begin(CatalogOp::DeleteCrawler, "DeleteCrawler", name)?;
        if state.crawlers.remove(name).is_none() {
            return Err(ProvisionError::catalog(
                "DeleteCrawler",
                name,
                "EntityNotFoundException",
            ));
        }
        Ok(())
    }

    async fn create_job(&self, job: &JobDefinition) -> Result<()> {
        let mut state = self.begin(CatalogOp::CreateJob, "CreateJob", &job.name)?;
        if state.jobs.contains_key(&job.name) {
            return Err(ProvisionError::catalog(
                "CreateJob",
                &job.name,
                "IdempotentParameterMismatchException",
            ));
        }
        state.jobs.insert(job.name.clone(), job.clone());
        Ok(())
    }

    async fn delete_job(&self, name: &str) -> Result<()> {
        // Glue's DeleteJob succeeds for unknown jobs
        let mut state = self.begin(CatalogOp::DeleteJob, "DeleteJob", name)?;
        state.jobs.remove(name);
        Ok(())
    }
}

/// Serves fixed bodies by URL
#[derive(Default)]
pub struct StaticFetcher {
    bodies: Mutex<BTreeMap<String, Bytes>>,
    fetched: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: &str, body: impl Into<Bytes>) {
        lock(&self.bodies).insert(url.to_string(), body.into());
    }

    pub fn fetched(&self) -> Vec<String> {
        lock(&self.fetched).clone()
    }
}

#[async_trait]
impl AssetFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        lock(&self.fetched).push(url.to_string());
        lock(&self.bodies)
            .get(url)
            .cloned()
            .ok_or_else(|| ProvisionError::fetch(url, "HTTP 404 Not Found"))
    }
}

/// Keeps every response instead of delivering it
#[derive(Default)]
pub struct RecordingSink {
    responses: Mutex<Vec<(String, CustomResourceResponse)>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the response, then reports a delivery failure
    pub fn failing() -> Self {
        Self {
            responses: Mutex::default(),
            fail: true,
        }
    }

    pub fn responses(&self) -> Vec<(String, CustomResourceResponse)> {
        lock(&self.responses).clone()
    }
}

#[async_trait]
impl ResponseSink for RecordingSink {
    async fn send(&self, response_url: &str, response: &CustomResourceResponse) -> Result<()> {
        lock(&self.responses).push((response_url.to_string(), response.clone()));
        if self.fail {
            return Err(ProvisionError::callback("connection refused"));
        }
        Ok(())
    }
}
