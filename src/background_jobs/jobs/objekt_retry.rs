//! Retry objekt job.
//!
//! Same pass-through body as the no-retry variant, but generic execution
//! failures are re-invoked by the runner up to two attempts in total (one
//! retry after the first failure).

use super::job_types;
use crate::background_jobs::job::{BackgroundJob, JobError, RetryPolicy};
use crate::objekt::Objekt;
use tracing::debug;

/// Total attempts allowed, counting the first invocation.
const MAX_ATTEMPTS: u32 = 2;

/// Background job that passes the objekt through, retrying once on failure.
pub struct ObjektRetryJob;

impl BackgroundJob for ObjektRetryJob {
    fn id(&self) -> &'static str {
        job_types::OBJEKT_RETRY
    }

    fn name(&self) -> &'static str {
        "Objekt Retry"
    }

    fn description(&self) -> &'static str {
        "Process a submitted objekt, retrying once on generic failures"
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::on_failure(MAX_ATTEMPTS)
    }

    fn execute(&self, objekt: &Objekt) -> Result<Objekt, JobError> {
        debug!("Processing objekt {}", objekt.id);

        Ok(objekt.clone())
    }
}
