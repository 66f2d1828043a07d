//! Session error types.

use thiserror::Error;

use shotscope_client::ClientError;
use shotscope_models::JobStatus;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Job {0} is still being analyzed")]
    JobInFlight(String),

    #[error("Job {job_id} cannot be replayed (status: {status})")]
    NotReplayable { job_id: String, status: JobStatus },

    #[error("No analysis result to export")]
    NothingToExport,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    /// Message for the session status line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
