//! Process-wide job registry.

use super::job::BackgroundJob;
use anyhow::{bail, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Maps job-type identifiers to their executors.
///
/// Populated at startup and frozen by moving it into the runner; there is no
/// mutation after that point.
#[derive(Default)]
pub struct JobRegistry {
    jobs: HashMap<&'static str, Arc<dyn BackgroundJob>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            jobs: HashMap::new(),
        }
    }

    /// Register a job under its id. Registering the same id twice is an
    /// error.
    pub fn register(&mut self, job: Arc<dyn BackgroundJob>) -> Result<()> {
        let id = job.id();
        if self.jobs.insert(id, job).is_some() {
            bail!("Job '{}' is already registered", id);
        }

        Ok(())
    }

    pub fn get(&self, job_type: &str) -> Option<&Arc<dyn BackgroundJob>> {
        self.jobs.get(job_type)
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    pub fn job_ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.jobs.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
