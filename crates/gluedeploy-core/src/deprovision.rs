//! Delete: remove copied objects and catalog entities, best-effort

use crate::layout::{AssetLayout, ASSET_PREFIX};
use crate::provision::finish;
use crate::report::{Operation, RunReport, StepOutcome, StepResult};
use crate::storage::delete_all_objects;
use crate::{Collaborators, OptionalResources};
use gluedeploy_config::DeleteParameters;

pub struct Deprovisioner {
    collaborators: Collaborators,
    optional: OptionalResources,
}

impl Deprovisioner {
    pub fn new(collaborators: Collaborators, optional: OptionalResources) -> Self {
        Self {
            collaborators,
            optional,
        }
    }

    pub async fn run(&self, params: &DeleteParameters) -> RunReport {
        let layout = AssetLayout::new(&params.account_id, &params.aws_region);
        tracing::info!(
            assets_bucket = layout.assets_bucket(),
            src_bucket = %params.src_bucket,
            transformed_bucket = %params.transformed_bucket,
            "Removing Glue demo resources"
        );

        let mut report = RunReport::new(Operation::Delete);
        report.record(
            "delete_assets",
            self.delete_objects(layout.assets_bucket(), Some(ASSET_PREFIX))
                .await,
        );
        report.record(
            "delete_source_objects",
            self.delete_objects(&params.src_bucket, None).await,
        );
        report.record(
            "delete_transformed_objects",
            self.delete_objects(&params.transformed_bucket, None).await,
        );
        report.record("delete_database", self.delete_database(params).await);
        report.record("delete_crawler", self.delete_crawler(params).await);
        report.record("delete_jobs", self.delete_jobs(params).await);
        report
    }

    async fn delete_objects(&self, bucket: &str, prefix: Option<&str>) -> StepResult {
        delete_all_objects(self.collaborators.store.as_ref(), bucket, prefix).await?;
        Ok(StepOutcome::Completed)
    }

    async fn delete_database(&self, params: &DeleteParameters) -> StepResult {
        self.collaborators
            .catalog
            .delete_database(&params.glue_dq_db_name)
            .await?;
        tracing::info!(database = %params.glue_dq_db_name, "Database deleted");
        Ok(StepOutcome::Completed)
    }

    async fn delete_crawler(&self, params: &DeleteParameters) -> StepResult {
        if !self.optional.crawler {
            return Ok(StepOutcome::Skipped);
        }
        self.collaborators
            .catalog
            .delete_crawler(&params.glue_crawler_name)
            .await?;
        tracing::info!(crawler = %params.glue_crawler_name, "Crawler deleted");
        Ok(StepOutcome::Completed)
    }

    async fn delete_jobs(&self, params: &DeleteParameters) -> StepResult {
        if !self.optional.jobs {
            return Ok(StepOutcome::Skipped);
        }

        let mut errors = Vec::new();
        for job in [&params.glue_dq_job_name, &params.glue_processing_job_name] {
            match self.collaborators.catalog.delete_job(job).await {
                Ok(()) => tracing::info!(job = %job, "Job deleted"),
                Err(err) => errors.push(err),
            }
        }
        finish(errors)
    }
}
