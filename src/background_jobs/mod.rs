//! Background job dispatch and execution system.
//!
//! This module provides the job abstraction (`BackgroundJob` + `RetryPolicy`),
//! the startup-populated `JobRegistry` and the in-process queue runtime that
//! executes submitted jobs with their declared retry semantics.

mod audit_logger;
mod job;
pub mod jobs;
mod queue;
mod registry;

pub use audit_logger::JobAuditLogger;
pub use job::{BackgroundJob, ErrorClass, JobError, RetryPolicy};
pub use queue::{
    create_queue, Enqueuer, JobRunner, QueueHandle, Submission, SubmissionHandle, SubmitError,
};
pub use registry::JobRegistry;
