//! Shot segments and the features attached to them.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Feature category produced by the analysis backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum FeatureCategory {
    /// Camera movement (pan, tilt, dolly, ...)
    CameraMotion,
    /// Lighting setup
    Lighting,
    /// Color grading
    ColorGrading,
    /// Category the backend could not name; kept off every track
    #[serde(other)]
    Unknown,
}

impl FeatureCategory {
    /// All trackable categories, in track render order.
    pub const ALL: [FeatureCategory; 3] = [
        FeatureCategory::CameraMotion,
        FeatureCategory::Lighting,
        FeatureCategory::ColorGrading,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureCategory::CameraMotion => "camera_motion",
            FeatureCategory::Lighting => "lighting",
            FeatureCategory::ColorGrading => "color_grading",
            FeatureCategory::Unknown => "unknown",
        }
    }

    /// Short class name used by track renderers.
    pub fn css_class(&self) -> &'static str {
        match self {
            FeatureCategory::CameraMotion => "camera",
            FeatureCategory::Lighting => "lighting",
            FeatureCategory::ColorGrading => "color",
            FeatureCategory::Unknown => "unknown",
        }
    }

    /// Human readable name for track headers and detail panels.
    pub fn display_name(&self) -> &'static str {
        match self {
            FeatureCategory::CameraMotion => "Camera Motion",
            FeatureCategory::Lighting => "Lighting",
            FeatureCategory::ColorGrading => "Color Grading",
            FeatureCategory::Unknown => "Unknown",
        }
    }

    /// False for `Unknown`, which has no track of its own.
    pub fn is_known(&self) -> bool {
        *self != FeatureCategory::Unknown
    }
}

impl std::fmt::Display for FeatureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Long-form explanation of a feature.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct DetailedDescription {
    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub technical_terms: Vec<String>,

    #[serde(default)]
    pub purpose: String,

    /// Free-form technical parameters. Non-string values are stringified.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_parameters"
    )]
    #[schemars(with = "Option<BTreeMap<String, String>>")]
    pub parameters: Option<BTreeMap<String, String>>,
}

fn deserialize_parameters<'de, D>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|map| {
        map.into_iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect()
    }))
}

/// A categorized, confidence-scored observation about a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Feature {
    pub category: FeatureCategory,

    /// Feature type within the category (e.g. "dolly_in")
    #[serde(rename = "type")]
    pub feature_type: String,

    /// Human readable value
    #[serde(default)]
    pub value: String,

    /// Confidence score (0.0-1.0)
    #[serde(default)]
    pub confidence: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<DetailedDescription>,
}

impl Feature {
    pub fn new(
        category: FeatureCategory,
        feature_type: impl Into<String>,
        value: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            category,
            feature_type: feature_type.into(),
            value: value.into(),
            confidence,
            detailed_description: None,
        }
    }

    /// Confidence clamped into `[0, 1]`; non-finite scores count as 0.
    pub fn clamped_confidence(&self) -> f64 {
        if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// A contiguous time span of the source video treated as one shot.
///
/// All times are milliseconds from the start of the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Segment {
    #[serde(rename = "segment_id", deserialize_with = "deserialize_segment_id")]
    #[schemars(with = "String")]
    pub id: String,

    pub start_ms: f64,

    #[serde(default)]
    pub end_ms: f64,

    #[serde(default)]
    pub duration_ms: f64,

    /// Placeholder awaiting feature analysis
    #[serde(default)]
    pub analyzing: bool,

    #[serde(default)]
    pub features: Vec<Feature>,
}

/// Segment ids arrive as strings, but older payloads used integers.
fn deserialize_segment_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

impl Segment {
    /// Create a finalized segment spanning `[start_ms, end_ms)`.
    pub fn new(id: impl Into<String>, start_ms: f64, end_ms: f64) -> Self {
        Self {
            id: id.into(),
            start_ms,
            end_ms,
            duration_ms: end_ms - start_ms,
            analyzing: false,
            features: Vec::new(),
        }
    }

    /// Create a placeholder segment that is still being analyzed.
    pub fn placeholder(id: impl Into<String>, start_ms: f64, end_ms: f64) -> Self {
        Self {
            analyzing: true,
            ..Self::new(id, start_ms, end_ms)
        }
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    /// Return a copy where `end_ms == start_ms + duration_ms` holds.
    ///
    /// A missing (zero) duration is recovered from the end time; the end
    /// time is then re-derived from start and duration. Negative or
    /// non-finite values collapse to zero.
    pub fn normalized(&self) -> Self {
        let start_ms = finite_non_negative(self.start_ms);
        let mut duration_ms = finite_non_negative(self.duration_ms);
        if duration_ms == 0.0 {
            duration_ms = finite_non_negative(self.end_ms - start_ms);
        }

        Self {
            start_ms,
            duration_ms,
            end_ms: start_ms + duration_ms,
            ..self.clone()
        }
    }

    /// Iterate the features of a single category.
    pub fn features_in(&self, category: FeatureCategory) -> impl Iterator<Item = &Feature> {
        self.features.iter().filter(move |f| f.category == category)
    }

    /// True if the segment has at least one feature in `category`.
    pub fn has_category(&self, category: FeatureCategory) -> bool {
        self.features_in(category).next().is_some()
    }
}

fn finite_non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_deserializes_wire_names() {
        let json = r#"{
            "segment_id": "seg_001",
            "start_ms": 0,
            "end_ms": 2000,
            "duration_ms": 2000,
            "analyzing": true,
            "features": []
        }"#;
        let seg: Segment = serde_json::from_str(json).unwrap();
        assert_eq!(seg.id, "seg_001");
        assert_eq!(seg.end_ms, 2000.0);
        assert!(seg.analyzing);
    }

    #[test]
    fn test_segment_accepts_numeric_id() {
        let json = r#"{"segment_id": 7, "start_ms": 100, "end_ms": 300}"#;
        let seg: Segment = serde_json::from_str(json).unwrap();
        assert_eq!(seg.id, "7");
        assert!(!seg.analyzing);
        assert!(seg.features.is_empty());
    }

    #[test]
    fn test_normalized_recovers_duration() {
        let seg = Segment {
            duration_ms: 0.0,
            ..Segment::new("s1", 1000.0, 2500.0)
        };
        let norm = seg.normalized();
        assert_eq!(norm.duration_ms, 1500.0);
        assert_eq!(norm.start_ms + norm.duration_ms, norm.end_ms);
    }

    #[test]
    fn test_normalized_rederives_end() {
        let seg = Segment {
            end_ms: 9999.0,
            duration_ms: 500.0,
            ..Segment::new("s1", 1000.0, 1500.0)
        };
        let norm = seg.normalized();
        assert_eq!(norm.end_ms, 1500.0);
    }

    #[test]
    fn test_normalized_rejects_garbage() {
        let seg = Segment {
            start_ms: f64::NAN,
            end_ms: -5.0,
            duration_ms: f64::INFINITY,
            ..Segment::new("s1", 0.0, 0.0)
        };
        let norm = seg.normalized();
        assert_eq!(norm.start_ms, 0.0);
        assert_eq!(norm.duration_ms, 0.0);
        assert_eq!(norm.end_ms, 0.0);
    }

    #[test]
    fn test_features_in_filters_category() {
        let seg = Segment::new("s1", 0.0, 1000.0)
            .with_feature(Feature::new(FeatureCategory::CameraMotion, "pan", "slow pan", 0.8))
            .with_feature(Feature::new(FeatureCategory::Lighting, "key", "high key", 0.6))
            .with_feature(Feature::new(FeatureCategory::CameraMotion, "tilt", "tilt up", 0.5));

        assert_eq!(seg.features_in(FeatureCategory::CameraMotion).count(), 2);
        assert!(seg.has_category(FeatureCategory::Lighting));
        assert!(!seg.has_category(FeatureCategory::ColorGrading));
    }

    #[test]
    fn test_detailed_description_stringifies_parameters() {
        let json = r#"{
            "category": "lighting",
            "type": "low_key",
            "value": "Low key",
            "confidence": 0.9,
            "detailed_description": {
                "summary": "Dark mood",
                "technical_terms": ["contrast ratio"],
                "purpose": "Tension",
                "parameters": {"ratio": 8, "source": "practical"}
            }
        }"#;
        let feature: Feature = serde_json::from_str(json).unwrap();
        let params = feature.detailed_description.unwrap().parameters.unwrap();
        assert_eq!(params["ratio"], "8");
        assert_eq!(params["source"], "practical");
    }

    #[test]
    fn test_unrecognised_category_is_unknown() {
        let json = r#"{
            "segment_id": "s1",
            "start_ms": 0,
            "end_ms": 2000,
            "features": [
                {"category": "unknown", "type": "unknown", "value": "", "confidence": 0.0},
                {"category": "soundtrack", "type": "score", "value": "strings", "confidence": 0.4},
                {"category": "camera_motion", "type": "pan", "value": "slow pan", "confidence": 0.8}
            ]
        }"#;
        let seg: Segment = serde_json::from_str(json).unwrap();
        assert_eq!(seg.features.len(), 3);
        assert_eq!(seg.features_in(FeatureCategory::Unknown).count(), 2);
        assert_eq!(seg.features_in(FeatureCategory::CameraMotion).count(), 1);
        assert!(!FeatureCategory::ALL.contains(&FeatureCategory::Unknown));
        assert!(!FeatureCategory::Unknown.is_known());
    }

    #[test]
    fn test_clamped_confidence() {
        let mut f = Feature::new(FeatureCategory::ColorGrading, "teal_orange", "Teal", 1.4);
        assert_eq!(f.clamped_confidence(), 1.0);
        f.confidence = f64::NAN;
        assert_eq!(f.clamped_confidence(), 0.0);
    }
}
