//! Submission queue and job runner.
//!
//! `create_queue` wires a bounded channel between the enqueue side
//! (`QueueHandle`) and the execution side (`JobRunner`). Submissions are
//! fire-and-forget: `submit` returns once the submission is handed to the
//! channel, before the executor runs. Ordering between submissions is not
//! guaranteed to callers.

use super::audit_logger::JobAuditLogger;
use super::registry::JobRegistry;
use crate::objekt::Objekt;
use crate::server_store::ServerStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

/// The submission could not be handed off to the queue runtime.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The runner is gone; no submission can be accepted.
    #[error("job queue is not available")]
    QueueUnavailable,

    /// The queue is at capacity; the submission was rejected.
    #[error("job queue is full")]
    QueueFull,
}

/// A pending request to execute a job type with an objekt payload.
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: Uuid,
    pub job_type: String,
    pub objekt: Objekt,
    pub submitted_at: DateTime<Utc>,
}

/// Receipt returned by a successful enqueue.
#[derive(Debug, Clone)]
pub struct SubmissionHandle {
    pub id: Uuid,
    pub job_type: String,
}

/// Enqueue side of the queue runtime.
pub trait Enqueuer: Send + Sync {
    /// Hand a job type and payload to the queue. Returns before the job
    /// body runs.
    fn submit(&self, job_type: &str, objekt: Objekt) -> Result<SubmissionHandle, SubmitError>;
}

/// Cloneable sender half of the queue.
#[derive(Clone)]
pub struct QueueHandle {
    tx: mpsc::Sender<Submission>,
}

impl Enqueuer for QueueHandle {
    fn submit(&self, job_type: &str, objekt: Objekt) -> Result<SubmissionHandle, SubmitError> {
        let submission = Submission {
            id: Uuid::new_v4(),
            job_type: job_type.to_string(),
            objekt,
            submitted_at: Utc::now(),
        };
        let handle = SubmissionHandle {
            id: submission.id,
            job_type: submission.job_type.clone(),
        };

        match self.tx.try_send(submission) {
            Ok(()) => Ok(handle),
            Err(mpsc::error::TrySendError::Full(_)) => Err(SubmitError::QueueFull),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(SubmitError::QueueUnavailable),
        }
    }
}

/// Final outcome of a processed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SubmissionOutcome {
    Completed { attempts: u32 },
    Failed { attempts: u32 },
    NoExecutor,
}

/// Execution side of the queue runtime.
///
/// Dequeues submissions, looks up the executor in the registry and runs the
/// attempt loop according to the job's retry policy, auditing every step.
pub struct JobRunner {
    rx: mpsc::Receiver<Submission>,
    registry: JobRegistry,
    server_store: Arc<dyn ServerStore>,
    shutdown_token: CancellationToken,
}

/// Create a queue runtime with the given registry and capacity.
///
/// Returns the runner (to be driven by the caller) and the handle used to
/// submit against it.
pub fn create_queue(
    registry: JobRegistry,
    server_store: Arc<dyn ServerStore>,
    shutdown_token: CancellationToken,
    capacity: usize,
) -> (JobRunner, QueueHandle) {
    let (tx, rx) = mpsc::channel(capacity);
    let runner = JobRunner {
        rx,
        registry,
        server_store,
        shutdown_token,
    };

    (runner, QueueHandle { tx })
}

impl JobRunner {
    pub fn job_count(&self) -> usize {
        self.registry.job_count()
    }

    /// Process submissions until every `QueueHandle` is dropped and the
    /// queue drains, or until shutdown is requested.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                maybe_submission = self.rx.recv() => {
                    match maybe_submission {
                        Some(submission) => {
                            self.process(submission);
                        }
                        None => {
                            info!("Job queue drained, runner stopping");
                            break;
                        }
                    }
                }
                _ = self.shutdown_token.cancelled() => {
                    info!("Shutdown requested, runner stopping");
                    break;
                }
            }
        }
    }

    fn process(&self, submission: Submission) -> SubmissionOutcome {
        let Submission {
            id,
            job_type,
            objekt,
            ..
        } = submission;

        let Some(job) = self.registry.get(&job_type) else {
            // Submissions are accepted against job types whose executor is
            // deployed elsewhere (e.g. objekt_standard_error). Without a
            // local executor the submission fails terminally.
            let audit = JobAuditLogger::new(Arc::clone(&self.server_store), &job_type, id);
            let error_msg = format!("No executor registered for job type '{}'", job_type);
            error!("{}", error_msg);
            audit.log_failed(&error_msg, None);
            return SubmissionOutcome::NoExecutor;
        };

        let job = Arc::clone(job);
        let policy = job.retry_policy();
        let audit = JobAuditLogger::new(Arc::clone(&self.server_store), job.id(), id);
        audit.log_started(Some(serde_json::json!({
            "objekt_id": objekt.id,
            "max_attempts": policy.max_attempts,
        })));

        let mut attempt = 1u32;
        loop {
            match job.execute(&objekt) {
                Ok(_) => {
                    info!(
                        "Job '{}' completed for objekt {} after {} attempt(s)",
                        job.id(),
                        objekt.id,
                        attempt
                    );
                    audit.log_completed(attempt, None);
                    return SubmissionOutcome::Completed { attempts: attempt };
                }
                Err(e) if policy.should_retry(&e, attempt) => {
                    warn!(
                        "Job '{}' attempt {} failed, retrying: {}",
                        job.id(),
                        attempt,
                        e
                    );
                    audit.log_retrying(&e.to_string(), attempt);
                    attempt += 1;
                }
                Err(e) => {
                    error!(
                        "Job '{}' failed terminally after {} attempt(s): {}",
                        job.id(),
                        attempt,
                        e
                    );
                    audit.log_failed(&e.to_string(), Some(attempt));
                    return SubmissionOutcome::Failed { attempts: attempt };
                }
            }
        }
    }
}
