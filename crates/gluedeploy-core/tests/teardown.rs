// Integration tests for the Delete operation

mod harness;

use gluedeploy_core::memory::StoreOp;
use gluedeploy_core::{Deprovisioner, InvocationStatus, OptionalResources, Provisioner, StepOutcome};
use harness::*;

fn deprovisioner(fixture: &Fixture, optional: OptionalResources) -> Deprovisioner {
    Deprovisioner::new(fixture.collaborators(), optional)
}

#[tokio::test]
async fn delete_empties_buckets_and_drops_database() {
    let fixture = Fixture::new();
    fixture.seed_dataset(5);
    fixture.seed_fake_data(2);
    fixture.seed_job_assets();
    let optional = OptionalResources::default();

    let created = Provisioner::new(fixture.collaborators(), optional)
        .run(&create_params())
        .await;
    assert_eq!(created.status(), InvocationStatus::Success);
    fixture.store.insert(ASSETS_BUCKET, "other/keep.txt", "unrelated");

    let report = deprovisioner(&fixture, optional).run(&delete_params()).await;

    assert_eq!(report.status(), InvocationStatus::Success);
    assert!(fixture.store.keys(SRC_BUCKET).is_empty());
    assert_eq!(fixture.store.keys(ASSETS_BUCKET), ["other/keep.txt"]);
    assert!(fixture.catalog.database_location("dq_db").is_none());
    assert!(fixture.catalog.table("dq_db", "dq_failed_records").is_none());

    // Public data and the buckets themselves are untouched
    assert_eq!(fixture.store.keys(PUBLIC_BUCKET).len(), 8);
    assert!(fixture.store.has_bucket(SRC_BUCKET));
    assert!(fixture.store.has_bucket(ASSETS_BUCKET));

    let steps: Vec<&str> = report.steps().iter().map(|s| s.step).collect();
    assert_eq!(
        steps,
        [
            "delete_assets",
            "delete_source_objects",
            "delete_transformed_objects",
            "delete_database",
            "delete_crawler",
            "delete_jobs",
        ]
    );
}

#[tokio::test]
async fn empty_bucket_issues_no_delete_call() {
    let fixture = Fixture::new();
    fixture.store.add_bucket(ASSETS_BUCKET);
    fixture.seed_database().await;

    let report = deprovisioner(&fixture, OptionalResources::default())
        .run(&delete_params())
        .await;

    assert_eq!(report.status(), InvocationStatus::Success);
    assert!(fixture.store.calls_of(StoreOp::DeleteObjects).is_empty());
    assert!(matches!(
        report.step("delete_transformed_objects").unwrap().result,
        Ok(StepOutcome::Completed)
    ));
}

#[tokio::test]
async fn large_buckets_are_deleted_in_batches() {
    let fixture = Fixture::new();
    fixture.store.add_bucket(ASSETS_BUCKET);
    for i in 0..2500 {
        fixture
            .store
            .insert(TRANSFORMED_BUCKET, &format!("dqcheck/passed/part-{:05}.json", i), "{}");
    }
    fixture.seed_database().await;

    let report = deprovisioner(&fixture, OptionalResources::default())
        .run(&delete_params())
        .await;

    assert_eq!(report.status(), InvocationStatus::Success);
    assert!(fixture.store.keys(TRANSFORMED_BUCKET).is_empty());

    let batches: Vec<Option<String>> = fixture
        .store
        .calls_of(StoreOp::DeleteObjects)
        .into_iter()
        .map(|c| c.detail)
        .collect();
    assert_eq!(
        batches,
        [
            Some("1000".to_string()),
            Some("1000".to_string()),
            Some("500".to_string())
        ]
    );
}

#[tokio::test]
async fn missing_database_fails_but_objects_are_still_removed() {
    let fixture = Fixture::new();
    fixture.store.add_bucket(ASSETS_BUCKET);
    fixture.store.insert(SRC_BUCKET, "health_qa/SeniorHealth_QA/a.xml", "<a/>");

    let report = deprovisioner(&fixture, OptionalResources::default())
        .run(&delete_params())
        .await;

    assert_eq!(report.status(), InvocationStatus::Failed);
    assert!(report.step("delete_database").unwrap().failed());
    assert_eq!(report.failed_steps().count(), 1);
    assert!(fixture.store.keys(SRC_BUCKET).is_empty());
}

#[tokio::test]
async fn missing_assets_bucket_fails_only_that_step() {
    let fixture = Fixture::new();
    fixture.seed_database().await;

    let report = deprovisioner(&fixture, OptionalResources::default())
        .run(&delete_params())
        .await;

    assert_eq!(report.status(), InvocationStatus::Failed);
    assert!(report.step("delete_assets").unwrap().failed());
    assert!(!report.step("delete_source_objects").unwrap().failed());
    assert!(!report.step("delete_database").unwrap().failed());
}

#[tokio::test]
async fn enabled_crawler_and_jobs_are_deleted() {
    let fixture = Fixture::new();
    fixture.seed_job_assets();
    let optional = OptionalResources {
        crawler: true,
        jobs: true,
    };

    Provisioner::new(fixture.collaborators(), optional)
        .run(&create_params())
        .await;
    assert!(fixture.catalog.crawler("dq_crawler").is_some());

    let report = deprovisioner(&fixture, optional).run(&delete_params()).await;

    assert_eq!(report.status(), InvocationStatus::Success);
    assert!(fixture.catalog.crawler("dq_crawler").is_none());
    assert!(fixture.catalog.job("dq_job").is_none());
    assert!(fixture.catalog.job("process_qa_job").is_none());
}

#[tokio::test]
async fn disabled_crawler_and_jobs_are_left_alone() {
    let fixture = Fixture::new();
    fixture.seed_job_assets();
    let enabled = OptionalResources {
        crawler: true,
        jobs: true,
    };
    Provisioner::new(fixture.collaborators(), enabled)
        .run(&create_params())
        .await;

    let report = deprovisioner(&fixture, OptionalResources::default())
        .run(&delete_params())
        .await;

    assert_eq!(report.status(), InvocationStatus::Success);
    assert!(matches!(
        report.step("delete_crawler").unwrap().result,
        Ok(StepOutcome::Skipped)
    ));
    assert!(fixture.catalog.crawler("dq_crawler").is_some());
    assert!(fixture.catalog.job("dq_job").is_some());
}
