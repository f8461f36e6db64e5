//! In-memory job store.
//!
//! Reference implementation of the [`JobStore`] contract; also the test
//! double for the runner.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use autopub_models::{Job, JobId, UserId};

use crate::error::{StoreError, StoreResult};
use crate::store::JobStore;

#[derive(Default)]
struct Inner {
    jobs: HashMap<JobId, Job>,
    contacts: HashMap<UserId, String>,
}

/// In-memory job table behind an async RwLock.
#[derive(Default)]
pub struct InMemoryJobStore {
    inner: RwLock<Inner>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly submitted job (submission-layer side of the
    /// contract).
    pub async fn insert(&self, job: Job) {
        let mut inner = self.inner.write().await;
        inner.jobs.insert(job.id.clone(), job);
    }

    /// Register a notification address for a user.
    pub async fn register_contact(&self, user: UserId, address: impl Into<String>) {
        let mut inner = self.inner.write().await;
        inner.contacts.insert(user, address.into());
    }

    /// Fetch one job by id (test/introspection helper).
    pub async fn get(&self, id: &JobId) -> Option<Job> {
        self.inner.read().await.jobs.get(id).cloned()
    }

    /// Number of stored jobs.
    pub async fn len(&self) -> usize {
        self.inner.read().await.jobs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.jobs.is_empty()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn fetch_next_eligible(&self) -> StoreResult<Option<Job>> {
        let inner = self.inner.read().await;
        let next = inner
            .jobs
            .values()
            .filter(|j| j.status.is_eligible())
            // Tie-break on id so equal timestamps stay deterministic
            .min_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.as_str().cmp(b.id.as_str()))
            })
            .cloned();
        Ok(next)
    }

    async fn commit(&self, job: &Job) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.jobs.contains_key(&job.id) {
            return Err(StoreError::NotFound(job.id.clone()));
        }
        debug!(job_id = %job.id, status = %job.status, "Committing job");
        inner.jobs.insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn reset_for_retry(&self, id: &JobId) -> StoreResult<Job> {
        let mut inner = self.inner.write().await;
        let job = inner
            .jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        job.reset_for_retry()?;
        Ok(job.clone())
    }

    async fn contact_for(&self, user: &UserId) -> StoreResult<Option<String>> {
        Ok(self.inner.read().await.contacts.get(user).cloned())
    }
}
