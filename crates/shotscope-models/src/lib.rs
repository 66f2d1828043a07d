//! Shared data models for ShotScope.
//!
//! This crate provides Serde-serializable types for:
//! - Shot segments and their categorized features
//! - Analysis results (full and partial)
//! - Job status snapshots and the client-side job handle
//! - Job submission requests and their validation
//! - History listing and deletion payloads

pub mod history;
pub mod job;
pub mod request;
pub mod result;
pub mod segment;
pub mod timecode;

// Re-export common types
pub use history::{DeleteJobResponse, HistoryItem};
pub use job::{JobErrorInfo, JobHandle, JobProgress, JobSnapshot, JobStatus, VideoSourceInfo};
pub use request::{
    AnalysisMode, CreateJobResponse, FrameExtractOptions, JobOptions, JobRequest, LlmOptions,
    RequestError, SceneDetectionOptions, SourceKind, VideoInput, VideoSource,
};
pub use result::{AnalysisResult, TargetResult};
pub use segment::{DetailedDescription, Feature, FeatureCategory, Segment};
pub use timecode::{format_ms, format_secs_short};
