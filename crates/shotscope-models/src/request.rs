//! Job submission request.
//!
//! Mirrors the backend's `POST /v1/video-analysis/jobs` body. Validation
//! happens client-side so malformed input never creates a job.

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::segment::FeatureCategory;

/// Analysis mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Analyze a single reference video
    #[default]
    Learn,
    /// Compare the user's video against the reference
    Compare,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Learn => "learn",
            AnalysisMode::Compare => "compare",
        }
    }
}

/// Kind of video source descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Uploaded file or absolute path visible to the backend
    #[default]
    File,
    /// Remote URL the backend downloads
    Url,
}

/// Video source descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoSource {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub path: String,
}

impl VideoSource {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::File,
            path: path.into(),
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Url,
            path: url.into(),
        }
    }

    /// Validate the descriptor.
    pub fn validate(&self, role: &'static str) -> Result<(), RequestError> {
        let path = self.path.trim();
        if path.is_empty() {
            return Err(RequestError::EmptySource(role));
        }

        match self.kind {
            SourceKind::File => {
                if !Path::new(path).is_absolute() {
                    return Err(RequestError::RelativePath(role, path.to_string()));
                }
            }
            SourceKind::Url => {
                let parsed = url::Url::parse(path)
                    .map_err(|e| RequestError::InvalidUrl(role, e.to_string()))?;
                if parsed.cannot_be_a_base() {
                    return Err(RequestError::InvalidUrl(
                        role,
                        format!("{} is not an absolute URL", path),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Video input wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoInput {
    pub source: VideoSource,
}

impl VideoInput {
    pub fn new(source: VideoSource) -> Self {
        Self { source }
    }
}

/// Frame sampling options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
pub struct FrameExtractOptions {
    /// Frames sampled per second of video
    #[validate(range(min = 0.1, max = 10.0))]
    pub fps: f64,

    /// Upper bound on sampled frames
    #[validate(range(min = 10, max = 1000))]
    pub max_frames: u32,
}

impl Default for FrameExtractOptions {
    fn default() -> Self {
        Self {
            fps: 2.0,
            max_frames: 240,
        }
    }
}

/// Shot boundary detection options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SceneDetectionOptions {
    /// Use computer-vision detection (emits partial results early)
    #[serde(default = "default_use_cv")]
    pub use_cv: bool,

    /// Content-change threshold
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_use_cv() -> bool {
    true
}

fn default_threshold() -> f64 {
    27.0
}

impl Default for SceneDetectionOptions {
    fn default() -> Self {
        Self {
            use_cv: default_use_cv(),
            threshold: default_threshold(),
        }
    }
}

/// Multimodal model options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LlmOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Which feature categories to run
    #[serde(default = "default_modules")]
    pub enabled_modules: Vec<FeatureCategory>,
}

fn default_modules() -> Vec<FeatureCategory> {
    FeatureCategory::ALL.to_vec()
}

impl Default for LlmOptions {
    fn default() -> Self {
        Self {
            provider: None,
            enabled_modules: default_modules(),
        }
    }
}

/// Analysis options.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct JobOptions {
    #[serde(default)]
    pub frame_extract: FrameExtractOptions,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_detection: Option<SceneDetectionOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmOptions>,
}

/// Request to create an analysis job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JobRequest {
    pub mode: AnalysisMode,

    pub target_video: VideoInput,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_video: Option<VideoInput>,

    #[serde(default)]
    pub options: JobOptions,
}

impl JobRequest {
    /// Create a learn-mode request for a single video.
    pub fn learn(source: VideoSource) -> Self {
        Self {
            mode: AnalysisMode::Learn,
            target_video: VideoInput::new(source),
            user_video: None,
            options: JobOptions::default(),
        }
    }

    /// Create a compare-mode request.
    pub fn compare(target: VideoSource, user: VideoSource) -> Self {
        Self {
            mode: AnalysisMode::Compare,
            target_video: VideoInput::new(target),
            user_video: Some(VideoInput::new(user)),
            options: JobOptions::default(),
        }
    }

    /// Set frame sampling rate and ceiling.
    pub fn with_frames(mut self, fps: f64, max_frames: u32) -> Self {
        self.options.frame_extract = FrameExtractOptions { fps, max_frames };
        self
    }

    /// Restrict the feature categories to run.
    pub fn with_modules(mut self, modules: Vec<FeatureCategory>) -> Self {
        let llm = self.options.llm.get_or_insert_with(LlmOptions::default);
        llm.enabled_modules = modules.into_iter().filter(|m| m.is_known()).collect();
        self
    }

    pub fn with_scene_detection(mut self, options: SceneDetectionOptions) -> Self {
        self.options.scene_detection = Some(options);
        self
    }

    /// Validate the request.
    pub fn validate(&self) -> Result<(), RequestError> {
        self.target_video.source.validate("target_video")?;

        match (&self.mode, &self.user_video) {
            (AnalysisMode::Compare, None) => return Err(RequestError::MissingUserVideo),
            (_, Some(user)) => user.source.validate("user_video")?,
            (AnalysisMode::Learn, None) => {}
        }

        self.options
            .frame_extract
            .validate()
            .map_err(|e| RequestError::InvalidOptions(e.to_string()))?;

        if let Some(llm) = &self.options.llm {
            if llm.enabled_modules.is_empty() {
                return Err(RequestError::NoModules);
            }
        }

        Ok(())
    }
}

/// Response from creating a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CreateJobResponse {
    pub job_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_url: Option<String>,
}

/// Submission input rejected before reaching the backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("{0} source descriptor is empty")]
    EmptySource(&'static str),

    #[error("{0} path must be absolute: {1}")]
    RelativePath(&'static str, String),

    #[error("{0} is not a valid URL: {1}")]
    InvalidUrl(&'static str, String),

    #[error("compare mode requires user_video")]
    MissingUserVideo,

    #[error("at least one analysis module must be enabled")]
    NoModules,

    #[error("invalid analysis options: {0}")]
    InvalidOptions(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_learn_request_serializes_wire_shape() {
        let req = JobRequest::learn(VideoSource::file("/videos/a.mp4")).with_frames(2.0, 60);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["mode"], "learn");
        assert_eq!(json["target_video"]["source"]["type"], "file");
        assert_eq!(json["target_video"]["source"]["path"], "/videos/a.mp4");
        assert_eq!(json["options"]["frame_extract"]["fps"], 2.0);
        assert_eq!(json["options"]["frame_extract"]["max_frames"], 60);
        assert!(json.get("user_video").is_none());
    }

    #[test]
    fn test_empty_source_rejected() {
        let req = JobRequest::learn(VideoSource::file("   "));
        assert_eq!(req.validate(), Err(RequestError::EmptySource("target_video")));
    }

    #[test]
    fn test_relative_path_rejected() {
        let req = JobRequest::learn(VideoSource::file("videos/a.mp4"));
        assert!(matches!(req.validate(), Err(RequestError::RelativePath(..))));
    }

    #[test]
    fn test_url_source() {
        let ok = JobRequest::learn(VideoSource::url("https://example.com/v.mp4"));
        assert!(ok.validate().is_ok());

        let bad = JobRequest::learn(VideoSource::url("not a url"));
        assert!(matches!(bad.validate(), Err(RequestError::InvalidUrl(..))));
    }

    #[test]
    fn test_compare_requires_user_video() {
        let mut req = JobRequest::compare(
            VideoSource::file("/videos/ref.mp4"),
            VideoSource::file("/videos/mine.mp4"),
        );
        assert!(req.validate().is_ok());

        req.user_video = None;
        assert_eq!(req.validate(), Err(RequestError::MissingUserVideo));
    }

    #[test]
    fn test_frame_options_range() {
        let req = JobRequest::learn(VideoSource::file("/v.mp4")).with_frames(20.0, 60);
        assert!(matches!(req.validate(), Err(RequestError::InvalidOptions(_))));

        let req = JobRequest::learn(VideoSource::file("/v.mp4")).with_frames(2.0, 5);
        assert!(matches!(req.validate(), Err(RequestError::InvalidOptions(_))));
    }

    #[test]
    fn test_modules() {
        let req = JobRequest::learn(VideoSource::file("/v.mp4"))
            .with_modules(vec![FeatureCategory::Lighting]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["options"]["llm"]["enabled_modules"][0], "lighting");

        let req = req.with_modules(vec![FeatureCategory::Unknown, FeatureCategory::CameraMotion]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["options"]["llm"]["enabled_modules"], serde_json::json!(["camera_motion"]));

        let req = req.with_modules(vec![]);
        assert_eq!(req.validate(), Err(RequestError::NoModules));
    }
}
