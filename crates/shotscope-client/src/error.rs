//! Job client error types.

use shotscope_models::RequestError;
use thiserror::Error;

/// Result type for job client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while creating or tracking a job.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Malformed or missing submission input; no job was created.
    #[error("Invalid job request: {0}")]
    Validation(#[from] RequestError),

    /// The backend rejected job creation.
    #[error("Job submission rejected ({status}): {body}")]
    Submission { status: u16, body: String },

    /// The backend reported the job as failed.
    #[error("Analysis failed: {0}")]
    Analysis(String),

    /// The attempt ceiling was reached; the job may still be running server-side.
    #[error("Analysis timed out after {attempts} status checks")]
    Timeout { attempts: u32 },

    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Request failed ({status}): {body}")]
    Http { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn analysis(msg: impl Into<String>) -> Self {
        Self::Analysis(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Map a non-success HTTP status on a read/delete request.
    pub fn from_http_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            404 => Self::NotFound(body),
            _ => Self::Http { status, body },
        }
    }

    /// HTTP status code carried by the error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Submission { status, .. } | Self::Http { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True for errors that end an analysis session rather than a single request.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, Self::Analysis(_) | Self::Timeout { .. })
    }

    /// True if the job was never created.
    pub fn is_submission_failure(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Submission { .. })
    }

    /// Short message suitable for the status line of a view.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Submission { status, .. } => {
                format!("Failed to create analysis job (HTTP {})", status)
            }
            Self::Analysis(msg) => format!("Analysis failed: {}", msg),
            Self::Timeout { .. } => "Analysis timed out".to_string(),
            Self::NotFound(_) => "Job not found".to_string(),
            other => other.to_string(),
        }
    }
}
