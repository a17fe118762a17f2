//! Create: copy assets and datasets, register catalog entities
//!
//! Steps run in a fixed order and never abort the run. Each step returns its
//! own result; the run's status is FAILED if any step failed.

use crate::fetch::copy_from_url;
use crate::jobs::{CrawlerDefinition, JobDefaultArguments, JobDefinition};
use crate::layout::{
    crawl_target, fake_data_prefix, flattened_crawl_key, public_object_url, strip_first_segment,
    AssetLayout, AssetLocation,
};
use crate::report::{Operation, RunReport, StepError, StepOutcome, StepResult};
use crate::schema::TableDefinition;
use crate::storage::list_all_keys;
use crate::{Collaborators, OptionalResources};
use gluedeploy_config::CreateParameters;

pub struct Provisioner {
    collaborators: Collaborators,
    optional: OptionalResources,
}

impl Provisioner {
    pub fn new(collaborators: Collaborators, optional: OptionalResources) -> Self {
        Self {
            collaborators,
            optional,
        }
    }

    pub async fn run(&self, params: &CreateParameters) -> RunReport {
        let layout = AssetLayout::new(&params.account_id, &params.aws_region);
        tracing::info!(
            assets_bucket = layout.assets_bucket(),
            src_bucket = %params.src_bucket,
            transformed_bucket = %params.transformed_bucket,
            bucket_prefix = %params.bucket_prefix,
            crawler_enabled = self.optional.crawler,
            jobs_enabled = self.optional.jobs,
            "Provisioning Glue demo resources"
        );

        let mut report = RunReport::new(Operation::Create);
        report.record(
            "ensure_assets_bucket",
            self.ensure_assets_bucket(&layout, &params.aws_region).await,
        );
        report.record("copy_job_assets", self.copy_job_assets(params, &layout).await);
        report.record("copy_dataset", self.copy_dataset(params).await);
        report.record("copy_fake_data", self.copy_fake_data(params).await);
        report.record("create_database", self.create_database(params, &layout).await);
        report.record("create_dq_fail_table", self.create_dq_fail_table(params).await);
        report.record("register_crawler", self.register_crawler(params).await);
        report.record("register_jobs", self.register_jobs(params, &layout).await);
        report
    }

    async fn ensure_assets_bucket(&self, layout: &AssetLayout, region: &str) -> StepResult {
        let bucket = layout.assets_bucket();
        let store = self.collaborators.store.as_ref();

        match store.head_bucket(bucket).await {
            Ok(()) => {
                tracing::info!(bucket, "Bucket already exists, not creating");
            }
            Err(err) => {
                tracing::debug!(bucket, error = %err, "Bucket head failed, creating");
                store.create_bucket(bucket, region).await?;
                tracing::info!(bucket, region, "Bucket created");
            }
        }
        Ok(StepOutcome::Completed)
    }

    async fn copy_job_assets(&self, params: &CreateParameters, layout: &AssetLayout) -> StepResult {
        let copies = [
            (&params.glue_dq_script, layout.script(&params.glue_dq_job_name)),
            (
                &params.glue_processqa_script,
                layout.script(&params.glue_processing_job_name),
            ),
            (&params.xml_lib_path, layout.spark_xml_lib()),
        ];

        let mut errors = Vec::new();
        for (url, target) in &copies {
            match self.copy(url, target).await {
                Ok(()) => tracing::info!(url = %url, target = %target, "Copied job asset"),
                Err(err) => errors.push(err),
            }
        }
        finish(errors)
    }

    async fn copy_dataset(&self, params: &CreateParameters) -> StepResult {
        let source = &params.qa_data_path;
        let keys = list_all_keys(
            self.collaborators.store.as_ref(),
            &source.bucket,
            Some(&source.key),
        )
        .await?;

        let mut copied = 0usize;
        let mut errors = Vec::new();
        for key in &keys {
            let target_key = strip_first_segment(key);
            if target_key.is_empty() {
                tracing::debug!(key = %key, "Skipping top-level folder marker");
                continue;
            }
            let target = AssetLocation::new(params.src_bucket.clone(), target_key);
            match self
                .copy(&public_object_url(&source.bucket, key), &target)
                .await
            {
                Ok(()) => copied += 1,
                Err(err) => errors.push(err),
            }
        }

        tracing::info!(
            source = %source,
            listed = keys.len(),
            copied,
            failed = errors.len(),
            "Copied dataset"
        );
        finish(errors)
    }

    async fn copy_fake_data(&self, params: &CreateParameters) -> StepResult {
        let bucket = &params.qa_data_path.bucket;
        let prefix = fake_data_prefix(&params.qa_data_path.key);
        let keys = list_all_keys(self.collaborators.store.as_ref(), bucket, Some(&prefix)).await?;

        let mut copied = 0usize;
        let mut errors = Vec::new();
        for key in &keys {
            let Some(target_key) = flattened_crawl_key(key) else {
                continue;
            };
            let target = AssetLocation::new(params.src_bucket.clone(), target_key);
            match self.copy(&public_object_url(bucket, key), &target).await {
                Ok(()) => copied += 1,
                Err(err) => errors.push(err),
            }
        }

        tracing::info!(
            bucket = %bucket,
            prefix = %prefix,
            listed = keys.len(),
            copied,
            "Copied simulated data into crawl target"
        );
        finish(errors)
    }

    async fn create_database(&self, params: &CreateParameters, layout: &AssetLayout) -> StepResult {
        let location = layout.database_location(&params.glue_dq_db_name);
        self.collaborators
            .catalog
            .create_database(&params.glue_dq_db_name, &location)
            .await?;
        tracing::info!(database = %params.glue_dq_db_name, location = %location, "Database created");
        Ok(StepOutcome::Completed)
    }

    async fn create_dq_fail_table(&self, params: &CreateParameters) -> StepResult {
        let table = TableDefinition::dq_failed_records(
            &params.glue_dq_db_name,
            &params.glue_dq_fail_tbl_name,
            &params.transformed_bucket,
        );
        self.collaborators.catalog.create_table(&table).await?;
        tracing::info!(
            database = %table.database,
            table = %table.name,
            location = %table.location,
            "Table created"
        );
        Ok(StepOutcome::Completed)
    }

    async fn register_crawler(&self, params: &CreateParameters) -> StepResult {
        if !self.optional.crawler {
            return Ok(StepOutcome::Skipped);
        }

        let crawler = CrawlerDefinition::new(
            params.glue_crawler_name.clone(),
            params.glue_role_arn.clone(),
            params.glue_dq_db_name.clone(),
            crawl_target(&params.src_bucket),
        );
        let catalog = self.collaborators.catalog.as_ref();
        catalog.create_crawler(&crawler).await?;
        tracing::info!(crawler = %crawler.name, target = %crawler.s3_target, "Crawler created");
        catalog.start_crawler(&crawler.name).await?;
        tracing::info!(crawler = %crawler.name, "Crawler started");
        Ok(StepOutcome::Completed)
    }

    async fn register_jobs(&self, params: &CreateParameters, layout: &AssetLayout) -> StepResult {
        let jobs = [
            JobDefinition::new(
                params.glue_dq_job_name.clone(),
                params.glue_role_arn.clone(),
                &layout.script(&params.glue_dq_job_name),
                JobDefaultArguments::data_quality(
                    layout,
                    &params.transformed_bucket,
                    &params.glue_dq_db_name,
                ),
            ),
            JobDefinition::new(
                params.glue_processing_job_name.clone(),
                params.glue_role_arn.clone(),
                &layout.script(&params.glue_processing_job_name),
                JobDefaultArguments::processing(
                    layout,
                    &params.transformed_bucket,
                    &params.glue_processed_data_path_prefix,
                ),
            ),
        ];

        for job in &jobs {
            tracing::debug!(job = %job.name, arguments = ?job.default_arguments, "Job arguments");
        }

        if !self.optional.jobs {
            return Ok(StepOutcome::Skipped);
        }

        let mut errors = Vec::new();
        for job in &jobs {
            match self.collaborators.catalog.create_job(job).await {
                Ok(()) => tracing::info!(job = %job.name, "Job created"),
                Err(err) => errors.push(err),
            }
        }
        finish(errors)
    }

    async fn copy(&self, url: &str, target: &AssetLocation) -> crate::Result<()> {
        copy_from_url(
            self.collaborators.fetcher.as_ref(),
            self.collaborators.store.as_ref(),
            url,
            target,
        )
        .await
    }
}

pub(crate) fn finish(errors: Vec<crate::ProvisionError>) -> StepResult {
    match StepError::from_errors(errors) {
        Some(err) => Err(err),
        None => Ok(StepOutcome::Completed),
    }
}
