//! Job status snapshots and the client-side job handle.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::result::AnalysisResult;

/// Job processing status as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is queued waiting for the executor
    #[default]
    Queued,
    /// Job is actively being processed
    Running,
    /// Job completed successfully
    Succeeded,
    /// Job failed with an error
    Failed,
}

impl JobStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            JobStatus::Queued => 0,
            JobStatus::Running => 1,
            JobStatus::Succeeded | JobStatus::Failed => 2,
        }
    }

    /// Whether moving from `self` to `next` is a forward transition.
    ///
    /// Staying in the same state is allowed; terminal states never change.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        if *self == next {
            return true;
        }
        !self.is_terminal() && next.rank() > self.rank()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress reported while a job is running.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct JobProgress {
    /// Pipeline stage (e.g. "scene_detection")
    #[serde(default, deserialize_with = "null_as_default")]
    #[schemars(with = "String")]
    pub stage: String,
    /// Progress percentage (0-100)
    #[serde(default)]
    pub percent: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    #[schemars(with = "String")]
    pub message: String,
}

fn null_as_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl JobProgress {
    /// Percent clamped into `[0, 100]`.
    pub fn clamped_percent(&self) -> f64 {
        if self.percent.is_finite() {
            self.percent.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    /// Short status line, e.g. `"scene_detection 25%"`.
    pub fn label(&self) -> String {
        let percent = self.clamped_percent().round() as u32;
        if self.stage.is_empty() {
            format!("{}%", percent)
        } else {
            format!("{} {}%", self.stage, percent)
        }
    }
}

/// Error reported by the backend for a failed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JobErrorInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Where the backend found a job's video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoSourceInfo {
    pub source_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
}

/// One status check response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JobSnapshot {
    pub job_id: String,

    pub status: JobStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<JobProgress>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_result: Option<AnalysisResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JobErrorInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_video: Option<VideoSourceInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_video: Option<VideoSourceInfo>,
}

impl JobSnapshot {
    /// Create a bare snapshot with only an id and status.
    pub fn new(job_id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            job_id: job_id.into(),
            status,
            mode: None,
            progress: None,
            partial_result: None,
            result: None,
            error: None,
            target_video: None,
            user_video: None,
        }
    }

    pub fn with_progress(mut self, stage: &str, percent: f64, message: &str) -> Self {
        self.progress = Some(JobProgress {
            stage: stage.to_string(),
            percent,
            message: message.to_string(),
        });
        self
    }

    pub fn with_partial_result(mut self, result: AnalysisResult) -> Self {
        self.partial_result = Some(result);
        self
    }

    pub fn with_result(mut self, result: AnalysisResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(JobErrorInfo {
            code: None,
            message: message.into(),
            details: None,
        });
        self
    }

    /// Partial result, only while the job is running.
    pub fn partial_result(&self) -> Option<&AnalysisResult> {
        match self.status {
            JobStatus::Running => self.partial_result.as_ref(),
            _ => None,
        }
    }

    /// Final result, only once the job has succeeded.
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self.status {
            JobStatus::Succeeded => self.result.as_ref(),
            _ => None,
        }
    }

    /// Backend failure message, only once the job has failed.
    pub fn error_message(&self) -> Option<String> {
        match self.status {
            JobStatus::Failed => Some(
                self.error
                    .as_ref()
                    .map(|e| e.message.clone())
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "unknown error".to_string()),
            ),
            _ => None,
        }
    }
}

/// Client-side view of a submitted job.
///
/// Status only moves forward (`queued -> running -> succeeded|failed`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_progress: Option<JobProgress>,
}

impl JobHandle {
    /// Create a handle for a freshly submitted job.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Queued,
            last_progress: None,
        }
    }

    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply a polled snapshot.
    ///
    /// Returns `false` (and leaves the handle untouched) when the snapshot
    /// would move the status backwards.
    pub fn advance(&mut self, snapshot: &JobSnapshot) -> bool {
        if !self.status.can_transition_to(snapshot.status) {
            return false;
        }
        self.status = snapshot.status;
        if let Some(progress) = &snapshot.progress {
            self.last_progress = Some(progress.clone());
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{FeatureCategory, Segment};

    #[test]
    fn test_job_status_is_terminal() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_job_status_forward_only() {
        assert!(JobStatus::Queued.can_transition_to(JobStatus::Running));
        assert!(JobStatus::Queued.can_transition_to(JobStatus::Succeeded));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Failed));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Running));
        assert!(!JobStatus::Running.can_transition_to(JobStatus::Queued));
        assert!(!JobStatus::Succeeded.can_transition_to(JobStatus::Failed));
        assert!(!JobStatus::Failed.can_transition_to(JobStatus::Running));
    }

    #[test]
    fn test_handle_ignores_backward_transition() {
        let mut handle = JobHandle::new("job_1");
        assert!(handle.advance(&JobSnapshot::new("job_1", JobStatus::Running).with_progress(
            "ingest",
            10.0,
            "downloading"
        )));
        assert_eq!(handle.status, JobStatus::Running);
        assert_eq!(handle.last_progress.as_ref().unwrap().stage, "ingest");

        assert!(!handle.advance(&JobSnapshot::new("job_1", JobStatus::Queued)));
        assert_eq!(handle.status, JobStatus::Running);

        assert!(handle.advance(&JobSnapshot::new("job_1", JobStatus::Succeeded)));
        assert!(handle.is_terminal());
    }

    #[test]
    fn test_snapshot_accessors_respect_status() {
        let partial = AnalysisResult::from_segments(vec![Segment::placeholder("s1", 0.0, 2000.0)]);

        let running = JobSnapshot::new("j", JobStatus::Running).with_partial_result(partial.clone());
        assert!(running.partial_result().is_some());
        assert!(running.result().is_none());
        assert!(running.error_message().is_none());

        // A stray partial result on a finished job is ignored
        let done = JobSnapshot::new("j", JobStatus::Succeeded)
            .with_partial_result(partial.clone())
            .with_result(partial);
        assert!(done.partial_result().is_none());
        assert!(done.result().is_some());
    }

    #[test]
    fn test_error_message_fallback() {
        let failed = JobSnapshot::new("j", JobStatus::Failed);
        assert_eq!(failed.error_message().as_deref(), Some("unknown error"));

        let failed = failed.with_error("ffmpeg exited with 1");
        assert_eq!(failed.error_message().as_deref(), Some("ffmpeg exited with 1"));
    }

    #[test]
    fn test_snapshot_parses_backend_payload() {
        let json = r#"{
            "job_id": "job_abc",
            "mode": "learn",
            "status": "running",
            "progress": {"stage": "scene_detection", "percent": 25.0, "message": null},
            "partial_result": {"target": {"segments": [], "analyzing": true}},
            "created_at": "2025-01-01T00:00:00"
        }"#;
        let snapshot: JobSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.status, JobStatus::Running);
        let progress = snapshot.progress.as_ref().unwrap();
        assert_eq!(progress.label(), "scene_detection 25%");
        assert!(progress.message.is_empty());
        assert!(snapshot.partial_result().unwrap().is_analyzing());
    }

    #[test]
    fn test_snapshot_tolerates_unknown_feature_category() {
        let json = r#"{
            "job_id": "job_abc",
            "status": "running",
            "partial_result": {"target": {"analyzing": true, "segments": [{
                "segment_id": "s1",
                "start_ms": 0,
                "end_ms": 2000,
                "features": [
                    {"category": "unknown", "type": "unknown", "value": "", "confidence": 0.0},
                    {"category": "camera_motion", "type": "pan", "value": "pan", "confidence": 0.9}
                ]
            }]}}
        }"#;
        let snapshot: JobSnapshot = serde_json::from_str(json).unwrap();
        let segment = &snapshot.partial_result().unwrap().target.segments[0];
        assert_eq!(segment.features.len(), 2);
        assert_eq!(segment.features[0].category, FeatureCategory::Unknown);
        assert_eq!(segment.features[1].category, FeatureCategory::CameraMotion);
    }
}
