use crate::objekt::Objekt;
use thiserror::Error;

/// Error raised by a job executor during a single attempt.
#[derive(Debug, Error)]
pub enum JobError {
    /// Generic execution failure, retryable under a matching policy.
    #[error("job execution failed: {0}")]
    ExecutionFailed(String),

    /// The job observed a shutdown request. Never retried.
    #[error("job was cancelled")]
    Cancelled,
}

impl JobError {
    pub fn class(&self) -> ErrorClass {
        match self {
            JobError::ExecutionFailed(_) => ErrorClass::Execution,
            JobError::Cancelled => ErrorClass::Cancelled,
        }
    }
}

/// Classes of job errors a retry policy can trigger on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Execution,
    Cancelled,
}

/// Failure-handling policy declared by a job type.
///
/// `max_attempts` counts the first invocation: a policy with
/// `max_attempts = 2` allows one retry after the initial failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Error classes that trigger a re-invocation.
    pub retry_on: &'static [ErrorClass],
}

impl RetryPolicy {
    /// Single attempt, any failure is terminal.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            retry_on: &[],
        }
    }

    /// Re-invoke on generic execution failures, up to `max_attempts` total
    /// attempts.
    pub fn on_failure(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            retry_on: &[ErrorClass::Execution],
        }
    }

    /// Whether the runner should re-invoke after `error` failed the given
    /// attempt (1-based).
    pub fn should_retry(&self, error: &JobError, attempt: u32) -> bool {
        attempt < self.max_attempts && self.retry_on.contains(&error.class())
    }
}

/// A named unit of deferred work.
///
/// Implementations are registered once at startup under their stable id and
/// invoked by the runner with the submitted objekt. The runner applies the
/// declared retry policy around `execute`.
pub trait BackgroundJob: Send + Sync {
    /// Stable job-type identifier submissions are matched against.
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Failure-handling policy the runner applies around `execute`.
    fn retry_policy(&self) -> RetryPolicy;

    /// Execute one attempt with the submitted record.
    fn execute(&self, objekt: &Objekt) -> Result<Objekt, JobError>;
}
