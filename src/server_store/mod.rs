//! Server-side state: the background job audit log.

mod sqlite_server_store;

pub use sqlite_server_store::SqliteServerStore;

use anyhow::Result;
use uuid::Uuid;

/// Kind of audit event recorded for a job submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAuditEventType {
    Started,
    Retrying,
    Completed,
    Failed,
}

impl JobAuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobAuditEventType::Started => "started",
            JobAuditEventType::Retrying => "retrying",
            JobAuditEventType::Completed => "completed",
            JobAuditEventType::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "started" => Some(JobAuditEventType::Started),
            "retrying" => Some(JobAuditEventType::Retrying),
            "completed" => Some(JobAuditEventType::Completed),
            "failed" => Some(JobAuditEventType::Failed),
            _ => None,
        }
    }
}

/// A recorded audit event for a job submission.
#[derive(Debug, Clone)]
pub struct JobAuditEvent {
    pub id: i64,
    pub job_id: String,
    pub submission_id: String,
    pub event_type: JobAuditEventType,
    pub attempt: Option<u32>,
    pub duration_ms: Option<i64>,
    pub details: Option<serde_json::Value>,
    pub error: Option<String>,
    /// Unix timestamp (seconds).
    pub created: i64,
}

/// Trait for server state storage backends.
pub trait ServerStore: Send + Sync {
    /// Record an audit event for a job submission.
    #[allow(clippy::too_many_arguments)]
    fn log_job_audit(
        &self,
        job_id: &str,
        submission_id: Uuid,
        event_type: JobAuditEventType,
        attempt: Option<u32>,
        duration_ms: Option<i64>,
        details: Option<&serde_json::Value>,
        error: Option<&str>,
    ) -> Result<()>;

    /// Get audit events for a job type, oldest first.
    fn get_job_audit_events(&self, job_id: &str, limit: usize) -> Result<Vec<JobAuditEvent>>;

    /// Get audit events for a single submission, oldest first.
    fn get_submission_audit_events(&self, submission_id: Uuid) -> Result<Vec<JobAuditEvent>>;
}
