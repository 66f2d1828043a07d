//! Normalized timeline model.
//!
//! A model is built from one analysis payload and, while its job is still
//! streaming, replaced by later payloads. Partial payloads are cumulative,
//! so a merge swaps the whole segment list rather than patching segments.

use serde::Serialize;
use tracing::debug;

use shotscope_models::{format_secs_short, AnalysisResult, Segment};

/// Segments of one analysis laid end to end on a single time axis.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TimelineModel {
    pub segments: Vec<Segment>,
    /// End of the last segment, or 0 for an empty timeline
    pub total_duration_ms: f64,
    /// True while the owning job may still replace the segment list
    pub streaming: bool,
}

impl TimelineModel {
    /// Build a model from a result payload.
    ///
    /// Segments are normalized so `end_ms == start_ms + duration_ms`. Order
    /// is kept as received.
    pub fn build(payload: &AnalysisResult, streaming: bool) -> Self {
        let segments: Vec<Segment> = payload.segments().iter().map(Segment::normalized).collect();
        let total_duration_ms = segments.last().map(|s| s.end_ms).unwrap_or(0.0);

        Self {
            segments,
            total_duration_ms,
            streaming,
        }
    }

    /// Replace the segment list with a newer payload.
    ///
    /// The streaming flag is taken from the payload itself. A finalized
    /// model is immutable and is returned unchanged.
    pub fn merge(&self, payload: &AnalysisResult) -> Self {
        if !self.streaming {
            debug!(
                segments = self.segments.len(),
                "Ignoring merge into a finalized timeline"
            );
            return self.clone();
        }

        Self::build(payload, payload.is_analyzing())
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn segment(&self, id: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// Segment under `time_ms`, if any.
    pub fn segment_at(&self, time_ms: f64) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|s| time_ms >= s.start_ms && time_ms < s.end_ms)
    }

    /// Number of segments still waiting for features.
    pub fn analyzing_count(&self) -> usize {
        self.segments.iter().filter(|s| s.analyzing).count()
    }

    /// One-line summary, e.g. `"2 shots · 7.0s"`.
    pub fn summary(&self) -> String {
        format!(
            "{} shots · {}",
            self.segments.len(),
            format_secs_short(self.total_duration_ms)
        )
    }
}

/// Build a timeline model from a result payload.
pub fn build_model(payload: &AnalysisResult, streaming: bool) -> TimelineModel {
    TimelineModel::build(payload, streaming)
}

/// Merge a newer payload into a streaming model.
pub fn merge_model(previous: &TimelineModel, payload: &AnalysisResult) -> TimelineModel {
    previous.merge(payload)
}
