//! Catalog verbs (databases, tables, crawlers, jobs)

use crate::error::Result;
use crate::jobs::{CrawlerDefinition, JobDefinition};
use crate::schema::TableDefinition;
use async_trait::async_trait;

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn create_database(&self, name: &str, location_uri: &str) -> Result<()>;

    async fn delete_database(&self, name: &str) -> Result<()>;

    async fn create_table(&self, table: &TableDefinition) -> Result<()>;

    async fn create_crawler(&self, crawler: &CrawlerDefinition) -> Result<()>;

    async fn start_crawler(&self, name: &str) -> Result<()>;

    async fn delete_crawler(&self, name: &str) -> Result<()>;

    async fn create_job(&self, job: &JobDefinition) -> Result<()>;

    async fn delete_job(&self, name: &str) -> Result<()>;
}
