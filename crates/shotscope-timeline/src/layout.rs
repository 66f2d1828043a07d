//! Proportional layout of a timeline model.
//!
//! Every element is placed as a percentage of the total duration, so the
//! same layout serves any pixel width. The layout is derived on demand and
//! never written back into the model.

use serde::Serialize;

use shotscope_models::{format_secs_short, FeatureCategory, Segment};

use crate::model::TimelineModel;
use crate::ruler::{ruler_ticks, RulerTick, DEFAULT_RULER_INTERVALS};

/// Label shown on placeholder elements.
pub const PLACEHOLDER_LABEL: &str = "Analyzing";

/// Horizontal placement within the track band, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SegmentLayout {
    pub left_percent: f64,
    pub width_percent: f64,
}

impl SegmentLayout {
    pub const ZERO: SegmentLayout = SegmentLayout {
        left_percent: 0.0,
        width_percent: 0.0,
    };

    pub fn right_percent(&self) -> f64 {
        self.left_percent + self.width_percent
    }
}

/// Place a segment relative to `total_duration_ms`.
///
/// A zero (or non-finite) total yields a zero-width layout at 0%.
pub fn layout_segment(segment: &Segment, total_duration_ms: f64) -> SegmentLayout {
    if !total_duration_ms.is_finite() || total_duration_ms <= 0.0 {
        return SegmentLayout::ZERO;
    }

    let left_percent = 100.0 * segment.start_ms / total_duration_ms;
    let width_percent = 100.0 * segment.duration_ms / total_duration_ms;
    if !left_percent.is_finite() || !width_percent.is_finite() {
        return SegmentLayout::ZERO;
    }

    SegmentLayout {
        left_percent,
        width_percent,
    }
}

/// What a laid-out element stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ElementKind {
    /// The shot itself, on the video track
    Segment,
    /// Index into the segment's feature list
    Feature(usize),
    /// Stand-in for a category the segment has no features for yet
    Placeholder(FeatureCategory),
}

/// Stable reference from a laid-out element back to the model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ElementRef {
    pub segment_id: String,
    pub kind: ElementKind,
}

impl ElementRef {
    pub fn segment(segment_id: impl Into<String>) -> Self {
        Self {
            segment_id: segment_id.into(),
            kind: ElementKind::Segment,
        }
    }

    pub fn feature(segment_id: impl Into<String>, index: usize) -> Self {
        Self {
            segment_id: segment_id.into(),
            kind: ElementKind::Feature(index),
        }
    }
}

/// One positioned element of a track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackElement {
    pub element: ElementRef,
    pub layout: SegmentLayout,
    /// Seek target when the element is selected
    pub start_ms: f64,
    pub label: String,
    pub value: String,
    /// Confidence in whole percent; absent when the score is zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_percent: Option<u32>,
    pub placeholder: bool,
}

/// Track identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Video,
    Feature(FeatureCategory),
}

impl TrackKind {
    pub fn title(&self) -> &'static str {
        match self {
            TrackKind::Video => "Video",
            TrackKind::Feature(category) => category.display_name(),
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            TrackKind::Video => "video",
            TrackKind::Feature(category) => category.css_class(),
        }
    }
}

/// A horizontal band of elements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub kind: TrackKind,
    pub elements: Vec<TrackElement>,
}

impl Track {
    pub fn title(&self) -> &'static str {
        self.kind.title()
    }
}

/// The laid-out timeline: the video track followed by one track per
/// feature category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineLayout {
    pub total_duration_ms: f64,
    pub streaming: bool,
    pub tracks: Vec<Track>,
}

impl TimelineLayout {
    /// Lay out every segment and feature of `model`.
    pub fn compute(model: &TimelineModel) -> Self {
        let total = model.total_duration_ms;

        let mut tracks = Vec::with_capacity(1 + FeatureCategory::ALL.len());
        tracks.push(Track {
            kind: TrackKind::Video,
            elements: model
                .segments
                .iter()
                .map(|segment| video_element(segment, total))
                .collect(),
        });

        for category in FeatureCategory::ALL {
            let elements = model
                .segments
                .iter()
                .flat_map(|segment| category_elements(segment, category, total))
                .collect();
            tracks.push(Track {
                kind: TrackKind::Feature(category),
                elements,
            });
        }

        Self {
            total_duration_ms: total,
            streaming: model.streaming,
            tracks,
        }
    }

    pub fn video_track(&self) -> Option<&Track> {
        self.track(TrackKind::Video)
    }

    pub fn track(&self, kind: TrackKind) -> Option<&Track> {
        self.tracks.iter().find(|t| t.kind == kind)
    }

    /// Look up a laid-out element by reference.
    pub fn element(&self, element: &ElementRef) -> Option<&TrackElement> {
        self.tracks
            .iter()
            .flat_map(|t| t.elements.iter())
            .find(|e| &e.element == element)
    }

    /// Ruler ticks at the default spacing.
    pub fn ruler(&self) -> Vec<RulerTick> {
        ruler_ticks(self.total_duration_ms, DEFAULT_RULER_INTERVALS)
    }

    pub fn element_count(&self) -> usize {
        self.tracks.iter().map(|t| t.elements.len()).sum()
    }
}

fn video_element(segment: &Segment, total: f64) -> TrackElement {
    TrackElement {
        element: ElementRef::segment(segment.id.clone()),
        layout: layout_segment(segment, total),
        start_ms: segment.start_ms,
        label: segment.id.clone(),
        value: format_secs_short(segment.duration_ms),
        confidence_percent: None,
        placeholder: segment.analyzing,
    }
}

fn category_elements(
    segment: &Segment,
    category: FeatureCategory,
    total: f64,
) -> Vec<TrackElement> {
    let layout = layout_segment(segment, total);

    let elements: Vec<TrackElement> = segment
        .features
        .iter()
        .enumerate()
        .filter(|(_, f)| f.category == category)
        .map(|(index, feature)| TrackElement {
            element: ElementRef::feature(segment.id.clone(), index),
            layout,
            start_ms: segment.start_ms,
            label: feature.feature_type.clone(),
            value: feature.value.clone(),
            confidence_percent: confidence_percent(feature.clamped_confidence()),
            placeholder: false,
        })
        .collect();

    if elements.is_empty() && segment.analyzing {
        return vec![TrackElement {
            element: ElementRef {
                segment_id: segment.id.clone(),
                kind: ElementKind::Placeholder(category),
            },
            layout,
            start_ms: segment.start_ms,
            label: PLACEHOLDER_LABEL.to_string(),
            value: String::new(),
            confidence_percent: None,
            placeholder: true,
        }];
    }

    elements
}

/// Omitted only when there is no confidence at all; a tiny score shows as 0%.
fn confidence_percent(confidence: f64) -> Option<u32> {
    (confidence > 0.0).then(|| (confidence * 100.0).round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::build_model;
    use shotscope_models::{AnalysisResult, Feature};

    const EPS: f64 = 1e-9;

    #[test]
    fn test_layout_segment_percentages() {
        let segment = Segment::new("s2", 3000.0, 7000.0);
        let layout = layout_segment(&segment, 7000.0);
        assert!((layout.left_percent - 300.0 / 7.0).abs() < EPS);
        assert!((layout.width_percent - 400.0 / 7.0).abs() < EPS);
        assert!((layout.right_percent() - 100.0).abs() < EPS);
    }

    #[test]
    fn test_layout_segment_zero_total() {
        let segment = Segment::new("s1", 0.0, 2000.0);
        assert_eq!(layout_segment(&segment, 0.0), SegmentLayout::ZERO);
        assert_eq!(layout_segment(&segment, f64::NAN), SegmentLayout::ZERO);
    }

    #[test]
    fn test_layout_monotonic() {
        let model = build_model(
            &AnalysisResult::from_segments(vec![
                Segment::new("a", 0.0, 1200.0),
                Segment::new("b", 1200.0, 1300.0),
                Segment::new("c", 1300.0, 5000.0),
                Segment::new("d", 5000.0, 9100.0),
            ]),
            false,
        );
        let lefts: Vec<f64> = model
            .segments
            .iter()
            .map(|s| layout_segment(s, model.total_duration_ms).left_percent)
            .collect();
        assert!(lefts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_compute_track_order() {
        let layout = TimelineLayout::compute(&TimelineModel::default());
        let kinds: Vec<TrackKind> = layout.tracks.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TrackKind::Video,
                TrackKind::Feature(FeatureCategory::CameraMotion),
                TrackKind::Feature(FeatureCategory::Lighting),
                TrackKind::Feature(FeatureCategory::ColorGrading),
            ]
        );
        assert_eq!(layout.element_count(), 0);
        assert!(layout.ruler().is_empty());
    }

    #[test]
    fn test_multiple_features_per_category() {
        let segment = Segment::new("s1", 0.0, 1000.0)
            .with_feature(Feature::new(FeatureCategory::Lighting, "key", "hard key", 0.8))
            .with_feature(Feature::new(FeatureCategory::CameraMotion, "pan", "pan right", 0.0))
            .with_feature(Feature::new(FeatureCategory::Lighting, "fill", "no fill", 0.456));
        let model = build_model(&AnalysisResult::from_segments(vec![segment]), false);
        let layout = TimelineLayout::compute(&model);

        let lighting = layout
            .track(TrackKind::Feature(FeatureCategory::Lighting))
            .unwrap();
        assert_eq!(lighting.elements.len(), 2);
        assert_eq!(lighting.elements[0].element, ElementRef::feature("s1", 0));
        assert_eq!(lighting.elements[1].element, ElementRef::feature("s1", 2));
        assert_eq!(lighting.elements[1].confidence_percent, Some(46));

        let camera = layout
            .track(TrackKind::Feature(FeatureCategory::CameraMotion))
            .unwrap();
        assert_eq!(camera.elements[0].confidence_percent, None);

        let color = layout
            .track(TrackKind::Feature(FeatureCategory::ColorGrading))
            .unwrap();
        assert!(color.elements.is_empty(), "finalized segments get no placeholder");
    }

    #[test]
    fn test_placeholder_only_for_missing_categories() {
        let segment = Segment::placeholder("s1", 0.0, 2000.0).with_feature(Feature::new(
            FeatureCategory::CameraMotion,
            "static",
            "locked off",
            0.7,
        ));
        let model = build_model(&AnalysisResult::from_segments(vec![segment]), true);
        let layout = TimelineLayout::compute(&model);

        let camera = layout
            .track(TrackKind::Feature(FeatureCategory::CameraMotion))
            .unwrap();
        assert!(!camera.elements[0].placeholder);

        for category in [FeatureCategory::Lighting, FeatureCategory::ColorGrading] {
            let track = layout.track(TrackKind::Feature(category)).unwrap();
            assert_eq!(track.elements.len(), 1);
            assert!(track.elements[0].placeholder);
            assert_eq!(track.elements[0].element.kind, ElementKind::Placeholder(category));
        }
    }

    #[test]
    fn test_element_lookup() {
        let model = build_model(
            &AnalysisResult::from_segments(vec![
                Segment::new("s1", 0.0, 3000.0),
                Segment::new("s2", 3000.0, 7000.0),
            ]),
            false,
        );
        let layout = TimelineLayout::compute(&model);
        let element = layout.element(&ElementRef::segment("s2")).unwrap();
        assert_eq!(element.start_ms, 3000.0);
        assert_eq!(element.value, "4.0s");
        assert!(layout.element(&ElementRef::segment("nope")).is_none());
    }

    #[test]
    fn test_tiny_confidence_still_shown() {
        let segment = Segment::new("s1", 0.0, 1000.0)
            .with_feature(Feature::new(FeatureCategory::Lighting, "key", "dim", 0.004));
        let model = build_model(&AnalysisResult::from_segments(vec![segment]), false);
        let layout = TimelineLayout::compute(&model);

        let lighting = layout
            .track(TrackKind::Feature(FeatureCategory::Lighting))
            .unwrap();
        assert_eq!(lighting.elements[0].confidence_percent, Some(0));
    }

    #[test]
    fn test_unknown_category_lands_on_no_track() {
        let unknown = Feature::new(FeatureCategory::Unknown, "unknown", "", 0.5);
        let model = build_model(
            &AnalysisResult::from_segments(vec![
                Segment::new("s1", 0.0, 1000.0)
                    .with_feature(unknown.clone())
                    .with_feature(Feature::new(FeatureCategory::CameraMotion, "pan", "pan", 0.9)),
                Segment::placeholder("s2", 1000.0, 2000.0).with_feature(unknown),
            ]),
            true,
        );
        let layout = TimelineLayout::compute(&model);

        assert_eq!(layout.tracks.len(), 1 + FeatureCategory::ALL.len());
        assert!(layout.element(&ElementRef::feature("s1", 0)).is_none());
        assert!(layout.element(&ElementRef::feature("s2", 0)).is_none());

        let camera = layout
            .track(TrackKind::Feature(FeatureCategory::CameraMotion))
            .unwrap();
        assert_eq!(camera.elements[0].element, ElementRef::feature("s1", 1));

        // s2 has nothing trackable yet, so every track shows its placeholder
        for category in FeatureCategory::ALL {
            let track = layout.track(TrackKind::Feature(category)).unwrap();
            let s2 = track.elements.iter().find(|e| e.element.segment_id == "s2").unwrap();
            assert!(s2.placeholder);
        }
    }
}
