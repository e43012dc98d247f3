//! No-retry objekt job.
//!
//! Passes the submitted objekt through unchanged. Any failure raised during
//! execution is terminal for that submission; the runner never re-invokes
//! this job type.

use super::job_types;
use crate::background_jobs::job::{BackgroundJob, JobError, RetryPolicy};
use crate::objekt::Objekt;
use tracing::debug;

/// Background job that passes the objekt through without retrying.
pub struct ObjektNoRetryJob;

impl BackgroundJob for ObjektNoRetryJob {
    fn id(&self) -> &'static str {
        job_types::OBJEKT_NO_RETRY
    }

    fn name(&self) -> &'static str {
        "Objekt No Retry"
    }

    fn description(&self) -> &'static str {
        "Process a submitted objekt without retrying on failure"
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::none()
    }

    fn execute(&self, objekt: &Objekt) -> Result<Objekt, JobError> {
        debug!("Processing objekt {}", objekt.id);

        Ok(objekt.clone())
    }
}
