//! Analysis result payloads.
//!
//! The same shape is used for the final `result` and for the cumulative
//! `partial_result` emitted while a job is still running.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::segment::Segment;

/// Analysis of the target video.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct TargetResult {
    #[serde(default)]
    pub segments: Vec<Segment>,

    /// Set while the backend is still refining the segment list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzing: Option<bool>,

    /// How the shot boundaries were found ("cv" or "llm")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_method: Option<String>,
}

impl TargetResult {
    /// Whether this payload is still being refined.
    ///
    /// The explicit payload flag wins; without it, any placeholder segment
    /// marks the payload as in progress.
    pub fn is_analyzing(&self) -> bool {
        self.analyzing
            .unwrap_or_else(|| self.segments.iter().any(|s| s.analyzing))
    }
}

/// Full or partial analysis result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    /// Analysis mode echoed by the backend ("learn" or "compare")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default)]
    pub target: TargetResult,
}

impl AnalysisResult {
    /// Build a result from a list of segments.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self {
            mode: None,
            target: TargetResult {
                segments,
                analyzing: None,
                detection_method: None,
            },
        }
    }

    /// Mark the payload as partial (or final).
    pub fn with_analyzing(mut self, analyzing: bool) -> Self {
        self.target.analyzing = Some(analyzing);
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.target.segments
    }

    pub fn is_analyzing(&self) -> bool {
        self.target.is_analyzing()
    }
}
