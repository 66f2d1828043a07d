//! The job service seam.

use async_trait::async_trait;
use shotscope_models::{DeleteJobResponse, HistoryItem, JobHandle, JobRequest, JobSnapshot};

use crate::error::ClientResult;

/// Operations offered by the analysis job service.
///
/// `HttpJobClient` is the production implementation; tests and the session
/// controller depend only on this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Create a job. Fails with `ClientError::Validation` before any request
    /// is made if the descriptor is malformed.
    async fn submit(&self, request: &JobRequest) -> ClientResult<JobHandle>;

    /// Single status check.
    async fn poll(&self, job_id: &str) -> ClientResult<JobSnapshot>;

    /// Past jobs, newest first.
    async fn history(&self, limit: u32) -> ClientResult<Vec<HistoryItem>>;

    /// Delete a job and its artifacts.
    async fn delete(&self, job_id: &str) -> ClientResult<DeleteJobResponse>;
}
