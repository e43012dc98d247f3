//! Job dispatch methods on the objekt record.
//!
//! Each method submits the whole record as payload to a named job type
//! through the queue's `Enqueuer`. Submission is fire-and-forget; the
//! underlying row is untouched and no reference is kept afterwards.

use super::model::Objekt;
use crate::background_jobs::jobs::job_types;
use crate::background_jobs::{Enqueuer, SubmissionHandle, SubmitError};

impl Objekt {
    /// Submit this objekt to the no-retry job type.
    pub fn queue_no_retry_job(
        &self,
        queue: &dyn Enqueuer,
    ) -> Result<SubmissionHandle, SubmitError> {
        queue.submit(job_types::OBJEKT_NO_RETRY, self.clone())
    }

    /// Submit this objekt to the retry job type.
    pub fn queue_retry_job(&self, queue: &dyn Enqueuer) -> Result<SubmissionHandle, SubmitError> {
        queue.submit(job_types::OBJEKT_RETRY, self.clone())
    }

    /// Submit this objekt to the standard-error job type.
    ///
    /// The executor for this job type is deployed separately; only its
    /// identifier is stable here.
    pub fn queue_standard_error_job(
        &self,
        queue: &dyn Enqueuer,
    ) -> Result<SubmissionHandle, SubmitError> {
        queue.submit(job_types::OBJEKT_STANDARD_ERROR, self.clone())
    }
}
