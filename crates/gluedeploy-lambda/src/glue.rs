// Glue Data Catalog and job service

use async_trait::async_trait;
use aws_sdk_glue::error::DisplayErrorContext;
use aws_sdk_glue::types::{
    Column, CrawlerTargets, DatabaseInput, DeleteBehavior, JobCommand, S3Target,
    SchemaChangePolicy, SerDeInfo, StorageDescriptor, TableInput, UpdateBehavior, WorkerType,
};
use aws_sdk_glue::Client;
use gluedeploy_core::jobs::{CrawlerDefinition, JobDefinition};
use gluedeploy_core::schema::TableDefinition;
use gluedeploy_core::{Catalog, ProvisionError, Result};
use std::collections::HashMap;

pub(crate) struct GlueCatalog {
    client: Client,
}

impl GlueCatalog {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn table_input(table: &TableDefinition) -> std::result::Result<TableInput, String> {
    let columns = table
        .columns
        .iter()
        .map(|column| {
            Column::builder()
                .name(&column.name)
                .r#type(&column.data_type)
                .build()
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    let serde_info = SerDeInfo::builder()
        .serialization_library(&table.serialization_library)
        .set_parameters(Some(to_hash_map(&table.serde_parameters)))
        .build();

    let storage = StorageDescriptor::builder()
        .set_columns(Some(columns))
        .location(&table.location)
        .input_format(&table.input_format)
        .output_format(&table.output_format)
        .compressed(table.compressed)
        .serde_info(serde_info)
        .set_bucket_columns(Some(Vec::new()))
        .set_sort_columns(Some(Vec::new()))
        .set_parameters(Some(to_hash_map(&table.parameters)))
        .stored_as_sub_directories(table.stored_as_sub_directories)
        .build();

    TableInput::builder()
        .name(&table.name)
        .storage_descriptor(storage)
        .build()
        .map_err(|e| e.to_string())
}

fn to_hash_map<'a>(
    entries: impl IntoIterator<Item = (&'a String, &'a String)>,
) -> HashMap<String, String> {
    entries
        .into_iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[async_trait]
impl Catalog for GlueCatalog {
    async fn create_database(&self, name: &str, location_uri: &str) -> Result<()> {
        let input = DatabaseInput::builder()
            .name(name)
            .location_uri(location_uri)
            .build()
            .map_err(|e| ProvisionError::catalog("CreateDatabase", name, e))?;

        self.client
            .create_database()
            .database_input(input)
            .send()
            .await
            .map_err(|e| ProvisionError::catalog("CreateDatabase", name, DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn delete_database(&self, name: &str) -> Result<()> {
        self.client
            .delete_database()
            .name(name)
            .send()
            .await
            .map_err(|e| ProvisionError::catalog("DeleteDatabase", name, DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn create_table(&self, table: &TableDefinition) -> Result<()> {
        let input =
            table_input(table).map_err(|e| ProvisionError::catalog("CreateTable", &table.name, e))?;

        self.client
            .create_table()
            .database_name(&table.database)
            .table_input(input)
            .send()
            .await
            .map_err(|e| {
                ProvisionError::catalog("CreateTable", &table.name, DisplayErrorContext(&e))
            })?;
        Ok(())
    }

    async fn create_crawler(&self, crawler: &CrawlerDefinition) -> Result<()> {
        let targets = CrawlerTargets::builder()
            .s3_targets(S3Target::builder().path(&crawler.s3_target).build())
            .build();
        let policy = SchemaChangePolicy::builder()
            .update_behavior(UpdateBehavior::from(crawler.update_behavior))
            .delete_behavior(DeleteBehavior::from(crawler.delete_behavior))
            .build();

        self.client
            .create_crawler()
            .name(&crawler.name)
            .role(&crawler.role)
            .database_name(&crawler.database)
            .targets(targets)
            .schema_change_policy(policy)
            .send()
            .await
            .map_err(|e| {
                ProvisionError::catalog("CreateCrawler", &crawler.name, DisplayErrorContext(&e))
            })?;
        Ok(())
    }

    async fn start_crawler(&self, name: &str) -> Result<()> {
        self.client
            .start_crawler()
            .name(name)
            .send()
            .await
            .map_err(|e| ProvisionError::catalog("StartCrawler", name, DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn delete_crawler(&self, name: &str) -> Result<()> {
        self.client
            .delete_crawler()
            .name(name)
            .send()
            .await
            .map_err(|e| ProvisionError::catalog("DeleteCrawler", name, DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn create_job(&self, job: &JobDefinition) -> Result<()> {
        let command = JobCommand::builder()
            .name(job.command)
            .script_location(&job.script_location)
            .python_version(job.python_version)
            .build();

        self.client
            .create_job()
            .name(&job.name)
            .role(&job.role)
            .command(command)
            .set_default_arguments(Some(
                job.default_arguments
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ))
            .glue_version(job.glue_version)
            .max_retries(job.max_retries)
            .number_of_workers(job.number_of_workers)
            .worker_type(WorkerType::from(job.worker_type))
            .send()
            .await
            .map_err(|e| ProvisionError::catalog("CreateJob", &job.name, DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn delete_job(&self, name: &str) -> Result<()> {
        self.client
            .delete_job()
            .job_name(name)
            .send()
            .await
            .map_err(|e| ProvisionError::catalog("DeleteJob", name, DisplayErrorContext(&e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dq_table_input() {
        let table = TableDefinition::dq_failed_records("dq_db", "dq_failed", "xfbkt");
        let input = table_input(&table).unwrap();
        assert_eq!(input.name(), "dq_failed");

        let storage = input.storage_descriptor().unwrap();
        assert_eq!(storage.location(), Some("s3://xfbkt/dqcheck/failed_records/"));
        assert_eq!(storage.columns().len(), table.columns.len());
        assert_eq!(
            storage.serde_info().and_then(|s| s.serialization_library()),
            Some("org.openx.data.jsonserde.JsonSerDe")
        );
        assert_eq!(
            storage.parameters().and_then(|p| p.get("classification")),
            Some(&"json".to_string())
        );
        assert!(storage.bucket_columns().is_empty());
    }
}
