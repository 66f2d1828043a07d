//! The analysis session owned by the controller.

use uuid::Uuid;

use shotscope_models::{AnalysisResult, JobHandle, JobRequest};
use shotscope_timeline::TimelineModel;

use crate::state::{SessionOrigin, ViewState};

/// One analysis session: at most one job, its timeline and its view state.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub origin: SessionOrigin,
    /// Request that started a fresh run
    pub request: Option<JobRequest>,
    pub job: Option<JobHandle>,
    pub model: Option<TimelineModel>,
    /// Last payload applied to the model, partial or final
    pub result: Option<AnalysisResult>,
    pub last_error: Option<String>,
    pub view: ViewState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Start an empty session.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            origin: SessionOrigin::Fresh,
            request: None,
            job: None,
            model: None,
            result: None,
            last_error: None,
            view: ViewState::Idle,
        }
    }

    /// Start a session for a freshly submitted job.
    pub fn fresh(request: JobRequest, job: JobHandle) -> Self {
        Self {
            request: Some(request),
            job: Some(job),
            view: ViewState::Loading { progress: None },
            ..Self::new()
        }
    }

    /// Start a session replaying a finished job.
    pub fn replay(job: JobHandle, result: AnalysisResult) -> Self {
        Self {
            origin: SessionOrigin::Replay,
            job: Some(job),
            model: Some(TimelineModel::build(&result, false)),
            result: Some(result),
            view: ViewState::Timeline,
            ..Self::new()
        }
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job.as_ref().map(|j| j.id.as_str())
    }

    pub fn has_job(&self) -> bool {
        self.job.is_some()
    }

    pub fn is_replay(&self) -> bool {
        self.origin == SessionOrigin::Replay
    }

    pub fn is_streaming(&self) -> bool {
        self.model.as_ref().is_some_and(|m| m.streaming)
    }
}
