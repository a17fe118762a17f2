//! Step results and the aggregate outcome reported to CloudFormation

use crate::error::ProvisionError;
use gluedeploy_config::ConfigError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const PHYSICAL_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
pub const PHYSICAL_ID_LEN: usize = 7;

/// Random lowercase alphanumeric identifier like "k3x9a0q"
pub fn generate_physical_resource_id() -> String {
    let mut rng = rand::thread_rng();
    (0..PHYSICAL_ID_LEN)
        .map(|_| PHYSICAL_ID_ALPHABET[rng.gen_range(0..PHYSICAL_ID_ALPHABET.len())] as char)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// Successful step result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    /// Resource type disabled by configuration
    Skipped,
}

/// All failures of one step. Steps that touch many objects keep going after
/// an individual failure, so a step can fail more than once.
#[derive(Debug)]
pub struct StepError {
    errors: Vec<ProvisionError>,
}

impl StepError {
    /// None when `errors` is empty
    pub fn from_errors(errors: Vec<ProvisionError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub fn errors(&self) -> &[ProvisionError] {
        &self.errors
    }
}

impl From<ProvisionError> for StepError {
    fn from(error: ProvisionError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [only] => write!(f, "{}", only),
            [first, rest @ ..] => write!(f, "{} (and {} more)", first, rest.len()),
            [] => write!(f, "unknown failure"),
        }
    }
}

pub type StepResult = std::result::Result<StepOutcome, StepError>;

#[derive(Debug)]
pub struct StepReport {
    pub step: &'static str,
    pub result: StepResult,
}

impl StepReport {
    pub fn failed(&self) -> bool {
        self.result.is_err()
    }
}

/// Ordered results of every step of one run
#[derive(Debug)]
pub struct RunReport {
    operation: Operation,
    steps: Vec<StepReport>,
}

impl RunReport {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            steps: Vec::new(),
        }
    }

    /// Record and log a step result
    pub fn record(&mut self, step: &'static str, result: StepResult) {
        match &result {
            Ok(StepOutcome::Completed) => {
                tracing::info!(operation = %self.operation, step, "Step completed")
            }
            Ok(StepOutcome::Skipped) => {
                tracing::info!(operation = %self.operation, step, "Step skipped (disabled)")
            }
            Err(err) => {
                for error in err.errors() {
                    tracing::error!(
                        operation = %self.operation,
                        step,
                        code = error.code(),
                        error = %error,
                        "Step failed"
                    );
                }
            }
        }
        self.steps.push(StepReport { step, result });
    }

    pub fn steps(&self) -> &[StepReport] {
        &self.steps
    }

    pub fn step(&self, name: &str) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.step == name)
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| s.failed())
    }

    /// FAILED if any step failed
    pub fn status(&self) -> InvocationStatus {
        if self.steps.iter().any(StepReport::failed) {
            InvocationStatus::Failed
        } else {
            InvocationStatus::Success
        }
    }

    pub fn into_result(self) -> InvocationResult {
        let status = self.status();
        let failures = self
            .failed_steps()
            .filter_map(|s| s.result.as_ref().err().map(|e| format!("{}: {}", s.step, e)))
            .collect();
        InvocationResult::new(status, failures)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvocationStatus {
    Success,
    Failed,
}

impl fmt::Display for InvocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationStatus::Success => write!(f, "SUCCESS"),
            InvocationStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Outcome of one Create or Delete, reported exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub status: InvocationStatus,
    /// One line per failed step
    pub failures: Vec<String>,
    pub data: BTreeMap<String, String>,
    pub physical_resource_id: String,
}

impl InvocationResult {
    pub fn new(status: InvocationStatus, failures: Vec<String>) -> Self {
        Self {
            status,
            failures,
            data: BTreeMap::new(),
            physical_resource_id: generate_physical_resource_id(),
        }
    }

    /// Invocation aborted before any step ran
    pub fn config_failure(error: ConfigError) -> Self {
        let error = ProvisionError::from(error);
        Self::new(InvocationStatus::Failed, vec![error.to_string()])
    }
}
