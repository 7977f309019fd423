//! In-memory collaborators for tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::auth::SecretStore;
use crate::dispatcher::{JobQueue, JobSubmission};
use crate::error::ServiceError;

/// Secret store returning a fixed value and counting lookups.
pub struct StaticSecretStore {
    value: String,
    calls: AtomicUsize,
    failures: AtomicUsize,
}

impl StaticSecretStore {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            calls: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        }
    }

    pub fn failing_once(value: &str) -> Self {
        let store = Self::new(value);
        store.failures.store(1, Ordering::SeqCst);
        store
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn secret_string(&self, _secret_id: &str) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Yield so concurrent callers overlap with the lookup.
        tokio::task::yield_now().await;
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ServiceError::new(
                "GetSecretValue",
                "InternalServiceError",
                "secret store unavailable",
            ));
        }
        Ok(self.value.clone())
    }
}

/// Job queue that records submissions and can start failing after a number of jobs.
#[derive(Default)]
pub struct RecordingJobQueue {
    submitted: Mutex<Vec<JobSubmission>>,
    attempts: AtomicUsize,
    fail_after: Option<usize>,
}

impl RecordingJobQueue {
    pub fn failing_after(accepted: usize) -> Self {
        Self {
            fail_after: Some(accepted),
            ..Default::default()
        }
    }

    pub fn submitted(&self) -> Vec<JobSubmission> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobQueue for RecordingJobQueue {
    async fn submit(&self, job: &JobSubmission) -> Result<String, ServiceError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|accepted| attempt >= accepted) {
            return Err(ServiceError::new(
                "SubmitJob",
                "ClientException",
                "Job queue is disabled",
            ));
        }

        self.submitted.lock().unwrap().push(job.clone());
        Ok(format!("job-{}", attempt))
    }
}
