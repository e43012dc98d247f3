//! End-to-end tests for objekt job dispatch and execution.
//!
//! Each test wires a registry and a queue runtime against a temporary
//! server store, submits through the objekt dispatch methods, drains the
//! runner and asserts invocation counts and the recorded audit trail.

use objekt_server::background_jobs::jobs::{job_types, ObjektNoRetryJob, ObjektRetryJob};
use objekt_server::background_jobs::{
    create_queue, BackgroundJob, Enqueuer, JobError, JobRegistry, JobRunner, QueueHandle,
    RetryPolicy, SubmitError,
};
use objekt_server::objekt::Objekt;
use objekt_server::server_store::{JobAuditEventType, ServerStore, SqliteServerStore};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn test_objekt(id: i64) -> Objekt {
    Objekt {
        id,
        created: 1700000000,
    }
}

/// Job whose executor fails a scripted number of times before succeeding.
struct FailsNTimes {
    id: &'static str,
    policy: RetryPolicy,
    failures: u32,
    invocations: Arc<AtomicU32>,
}

impl FailsNTimes {
    fn new(id: &'static str, policy: RetryPolicy, failures: u32) -> (Self, Arc<AtomicU32>) {
        let invocations = Arc::new(AtomicU32::new(0));
        let job = Self {
            id,
            policy,
            failures,
            invocations: Arc::clone(&invocations),
        };
        (job, invocations)
    }
}

impl BackgroundJob for FailsNTimes {
    fn id(&self) -> &'static str {
        self.id
    }

    fn name(&self) -> &'static str {
        "Fails N Times"
    }

    fn description(&self) -> &'static str {
        "Fails a scripted number of times before succeeding"
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.policy.clone()
    }

    fn execute(&self, objekt: &Objekt) -> Result<Objekt, JobError> {
        let n = self.invocations.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            Err(JobError::ExecutionFailed("scripted failure".to_string()))
        } else {
            Ok(objekt.clone())
        }
    }
}

/// Job whose executor reports cancellation on every attempt.
struct AlwaysCancelled {
    invocations: Arc<AtomicU32>,
}

impl BackgroundJob for AlwaysCancelled {
    fn id(&self) -> &'static str {
        "always_cancelled"
    }

    fn name(&self) -> &'static str {
        "Always Cancelled"
    }

    fn description(&self) -> &'static str {
        "Reports cancellation on every attempt"
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::on_failure(2)
    }

    fn execute(&self, _objekt: &Objekt) -> Result<Objekt, JobError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Err(JobError::Cancelled)
    }
}

struct TestQueue {
    _tmp: TempDir,
    store: Arc<SqliteServerStore>,
    runner: JobRunner,
    handle: QueueHandle,
}

fn test_queue(registry: JobRegistry) -> TestQueue {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(SqliteServerStore::new(tmp.path().join("server.db")).unwrap());
    let (runner, handle) = create_queue(
        registry,
        store.clone(),
        CancellationToken::new(),
        16,
    );
    TestQueue {
        _tmp: tmp,
        store,
        runner,
        handle,
    }
}

fn event_types(store: &dyn ServerStore, job_id: &str) -> Vec<JobAuditEventType> {
    store
        .get_job_audit_events(job_id, 100)
        .unwrap()
        .iter()
        .map(|e| e.event_type)
        .collect()
}

#[tokio::test]
async fn test_retry_job_retries_once_then_succeeds() {
    let (job, invocations) = FailsNTimes::new(
        job_types::OBJEKT_RETRY,
        ObjektRetryJob.retry_policy(),
        1,
    );
    let mut registry = JobRegistry::new();
    registry.register(Arc::new(job)).unwrap();
    let queue = test_queue(registry);

    test_objekt(42).queue_retry_job(&queue.handle).unwrap();
    drop(queue.handle);
    queue.runner.run().await;

    assert_eq!(invocations.load(Ordering::SeqCst), 2);
    assert_eq!(
        event_types(queue.store.as_ref(), job_types::OBJEKT_RETRY),
        vec![
            JobAuditEventType::Started,
            JobAuditEventType::Retrying,
            JobAuditEventType::Completed,
        ]
    );
}

#[tokio::test]
async fn test_retry_job_exhausts_attempts_and_fails_terminally() {
    let (job, invocations) = FailsNTimes::new(
        job_types::OBJEKT_RETRY,
        ObjektRetryJob.retry_policy(),
        u32::MAX,
    );
    let mut registry = JobRegistry::new();
    registry.register(Arc::new(job)).unwrap();
    let queue = test_queue(registry);

    test_objekt(42).queue_retry_job(&queue.handle).unwrap();
    drop(queue.handle);
    queue.runner.run().await;

    assert_eq!(invocations.load(Ordering::SeqCst), 2);
    let events = queue
        .store
        .get_job_audit_events(job_types::OBJEKT_RETRY, 100)
        .unwrap();
    let last = events.last().unwrap();
    assert_eq!(last.event_type, JobAuditEventType::Failed);
    assert_eq!(last.attempt, Some(2));
}

#[tokio::test]
async fn test_no_retry_job_fails_terminally_after_one_attempt() {
    let (job, invocations) = FailsNTimes::new(
        job_types::OBJEKT_NO_RETRY,
        ObjektNoRetryJob.retry_policy(),
        u32::MAX,
    );
    let mut registry = JobRegistry::new();
    registry.register(Arc::new(job)).unwrap();
    let queue = test_queue(registry);

    test_objekt(42).queue_no_retry_job(&queue.handle).unwrap();
    drop(queue.handle);
    queue.runner.run().await;

    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    assert_eq!(
        event_types(queue.store.as_ref(), job_types::OBJEKT_NO_RETRY),
        vec![JobAuditEventType::Started, JobAuditEventType::Failed]
    );
}

#[tokio::test]
async fn test_each_dispatch_method_produces_one_submission() {
    let mut registry = JobRegistry::new();
    registry.register(Arc::new(ObjektNoRetryJob)).unwrap();
    registry.register(Arc::new(ObjektRetryJob)).unwrap();
    let queue = test_queue(registry);

    let objekt = test_objekt(42);
    let no_retry = objekt.queue_no_retry_job(&queue.handle).unwrap();
    let retry = objekt.queue_retry_job(&queue.handle).unwrap();
    let standard_error = objekt.queue_standard_error_job(&queue.handle).unwrap();

    assert_eq!(no_retry.job_type, job_types::OBJEKT_NO_RETRY);
    assert_eq!(retry.job_type, job_types::OBJEKT_RETRY);
    assert_eq!(standard_error.job_type, job_types::OBJEKT_STANDARD_ERROR);

    drop(queue.handle);
    queue.runner.run().await;

    for handle in [&no_retry, &retry] {
        let events = queue.store.get_submission_audit_events(handle.id).unwrap();
        assert_eq!(
            events.last().unwrap().event_type,
            JobAuditEventType::Completed,
            "submission {} should have completed",
            handle.job_type
        );
    }
}

#[tokio::test]
async fn test_standard_error_submission_without_executor_is_terminal() {
    let mut registry = JobRegistry::new();
    registry.register(Arc::new(ObjektNoRetryJob)).unwrap();
    registry.register(Arc::new(ObjektRetryJob)).unwrap();
    let queue = test_queue(registry);

    let handle = test_objekt(42)
        .queue_standard_error_job(&queue.handle)
        .unwrap();
    drop(queue.handle);
    queue.runner.run().await;

    let events = queue.store.get_submission_audit_events(handle.id).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, JobAuditEventType::Failed);
    assert!(events[0]
        .error
        .as_deref()
        .unwrap()
        .contains("No executor registered"));
}

#[tokio::test]
async fn test_cancelled_error_is_not_retried() {
    let invocations = Arc::new(AtomicU32::new(0));
    let mut registry = JobRegistry::new();
    registry
        .register(Arc::new(AlwaysCancelled {
            invocations: Arc::clone(&invocations),
        }))
        .unwrap();
    let queue = test_queue(registry);

    queue
        .handle
        .submit("always_cancelled", test_objekt(42))
        .unwrap();
    drop(queue.handle);
    queue.runner.run().await;

    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    assert_eq!(
        event_types(queue.store.as_ref(), "always_cancelled"),
        vec![JobAuditEventType::Started, JobAuditEventType::Failed]
    );
}

#[tokio::test]
async fn test_submit_after_runner_dropped_surfaces_error() {
    let queue = test_queue(JobRegistry::new());
    drop(queue.runner);

    let result = test_objekt(42).queue_retry_job(&queue.handle);
    assert!(matches!(result, Err(SubmitError::QueueUnavailable)));
}

#[tokio::test]
async fn test_shutdown_stops_runner_with_pending_submissions() {
    let mut registry = JobRegistry::new();
    registry.register(Arc::new(ObjektNoRetryJob)).unwrap();

    let tmp = TempDir::new().unwrap();
    let store = Arc::new(SqliteServerStore::new(tmp.path().join("server.db")).unwrap());
    let shutdown_token = CancellationToken::new();
    let (runner, handle) = create_queue(registry, store, shutdown_token.clone(), 16);

    for id in 0..4 {
        test_objekt(id).queue_no_retry_job(&handle).unwrap();
    }
    shutdown_token.cancel();

    // Keep the handle alive: the runner must stop on cancellation, not drain.
    let result = tokio::time::timeout(Duration::from_secs(5), runner.run()).await;
    assert!(result.is_ok(), "runner should stop after cancellation");
    drop(handle);
}

#[tokio::test]
async fn test_retry_job_declares_two_total_attempts() {
    let policy = ObjektRetryJob.retry_policy();

    assert_eq!(policy.max_attempts, 2);
    assert_eq!(ObjektNoRetryJob.retry_policy().max_attempts, 1);
}
