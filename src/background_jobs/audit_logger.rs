//! Job audit logging utilities.
//!
//! Provides a convenient interface for the job runner to log audit events
//! for a single submission.

use crate::server_store::{JobAuditEventType, ServerStore};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Helper for logging audit events of one job submission.
///
/// Writes are best-effort: a failing audit write never fails the job itself.
pub struct JobAuditLogger {
    server_store: Arc<dyn ServerStore>,
    job_id: String,
    submission_id: Uuid,
    start_time: Instant,
}

impl JobAuditLogger {
    /// Create a new audit logger for a submission.
    pub fn new(server_store: Arc<dyn ServerStore>, job_id: &str, submission_id: Uuid) -> Self {
        Self {
            server_store,
            job_id: job_id.to_string(),
            submission_id,
            start_time: Instant::now(),
        }
    }

    /// Log that execution of the submission has started.
    pub fn log_started(&self, details: Option<serde_json::Value>) {
        let _ = self.server_store.log_job_audit(
            &self.job_id,
            self.submission_id,
            JobAuditEventType::Started,
            None,
            None,
            details.as_ref(),
            None,
        );
    }

    /// Log that an attempt failed and the runner will re-invoke.
    pub fn log_retrying(&self, error: &str, attempt: u32) {
        let _ = self.server_store.log_job_audit(
            &self.job_id,
            self.submission_id,
            JobAuditEventType::Retrying,
            Some(attempt),
            None,
            None,
            Some(error),
        );
    }

    /// Log that the submission completed successfully.
    pub fn log_completed(&self, attempt: u32, details: Option<serde_json::Value>) {
        let duration_ms = self.start_time.elapsed().as_millis() as i64;
        let _ = self.server_store.log_job_audit(
            &self.job_id,
            self.submission_id,
            JobAuditEventType::Completed,
            Some(attempt),
            Some(duration_ms),
            details.as_ref(),
            None,
        );
    }

    /// Log that the submission failed terminally.
    pub fn log_failed(&self, error: &str, attempt: Option<u32>) {
        let duration_ms = self.start_time.elapsed().as_millis() as i64;
        let _ = self.server_store.log_job_audit(
            &self.job_id,
            self.submission_id,
            JobAuditEventType::Failed,
            attempt,
            Some(duration_ms),
            None,
            Some(error),
        );
    }

    /// Get the elapsed time since execution started.
    pub fn elapsed_ms(&self) -> i64 {
        self.start_time.elapsed().as_millis() as i64
    }
}
