// gluedeploy-core - Provisioning and teardown of the Glue demo pipeline
//
// Platform-agnostic: every AWS call goes through the ObjectStore, Catalog,
// AssetFetcher and ResponseSink traits. The Lambda crate supplies SDK-backed
// implementations; `memory` supplies in-memory ones.

use gluedeploy_config::DeployConfig;
use std::sync::Arc;

pub mod catalog;
pub mod deprovision;
pub mod dispatch;
pub mod error;
pub mod fetch;
pub mod jobs;
pub mod layout;
pub mod memory;
pub mod provision;
pub mod report;
pub mod schema;
pub mod storage;

pub use catalog::Catalog;
pub use deprovision::Deprovisioner;
pub use dispatch::{
    CustomResourceEvent, CustomResourceResponse, Dispatcher, InvocationContext, RequestType,
    ResponseSink,
};
pub use error::{ErrorCode, ProvisionError, Result};
pub use fetch::AssetFetcher;
pub use layout::{AssetLayout, AssetLocation};
pub use provision::Provisioner;
pub use report::{InvocationResult, InvocationStatus, RunReport, StepOutcome};
pub use storage::{ObjectPage, ObjectStore};

/// Services shared by every step
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn ObjectStore>,
    pub catalog: Arc<dyn Catalog>,
    pub fetcher: Arc<dyn AssetFetcher>,
}

/// Optional resource types. Disabled types are neither created nor deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionalResources {
    pub crawler: bool,
    pub jobs: bool,
}

impl From<&DeployConfig> for OptionalResources {
    fn from(config: &DeployConfig) -> Self {
        Self {
            crawler: config.crawler.enabled,
            jobs: config.jobs.enabled,
        }
    }
}
