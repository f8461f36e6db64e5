//! The job store contract consumed by the runner.

use async_trait::async_trait;

use autopub_models::{Job, JobId, UserId};

use crate::error::StoreResult;

/// Durable table of job records; the only shared mutable state.
///
/// Single-worker model: once `fetch_next_eligible` hands a job to the
/// runner, the runner immediately commits it as `Rendering`, so no
/// second fetch in the same process can observe it eligible. Cross-
/// process claims are out of the supported model.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Return the single oldest job (by `created_at` ascending) whose
    /// status is eligible (`READY` or `RETRY`), or `None`.
    async fn fetch_next_eligible(&self) -> StoreResult<Option<Job>>;

    /// Atomically persist the full current state of one job record.
    async fn commit(&self, job: &Job) -> StoreResult<()>;

    /// External retry trigger: flip a `FAILED` job back to `RETRY`,
    /// clearing its derived artifacts. Errors on unknown jobs and on
    /// jobs that are not failed.
    async fn reset_for_retry(&self, id: &JobId) -> StoreResult<Job>;

    /// Recipient address for the notification sink, if the user has one.
    async fn contact_for(&self, user: &UserId) -> StoreResult<Option<String>>;
}
