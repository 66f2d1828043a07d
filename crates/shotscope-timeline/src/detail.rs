//! Content of the feature detail panel.

use serde::Serialize;

use shotscope_models::{format_ms, DetailedDescription, Feature, Segment};

use crate::layout::{ElementKind, ElementRef};
use crate::model::TimelineModel;

/// Everything the detail panel shows for one selected feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureDetail {
    pub category: &'static str,
    pub css_class: &'static str,
    pub feature_type: String,
    pub value: String,
    pub confidence_percent: u32,
    /// `MM:SS.mmm - MM:SS.mmm`
    pub time_range: String,
    pub start_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<DetailedDescription>,
}

impl FeatureDetail {
    pub fn new(feature: &Feature, segment: &Segment) -> Self {
        Self {
            category: feature.category.display_name(),
            css_class: feature.category.css_class(),
            feature_type: feature.feature_type.clone(),
            value: feature.value.clone(),
            confidence_percent: (feature.clamped_confidence() * 100.0).round() as u32,
            time_range: format!(
                "{} - {}",
                format_ms(segment.start_ms),
                format_ms(segment.end_ms)
            ),
            start_ms: segment.start_ms,
            description: feature.detailed_description.clone(),
        }
    }

    /// Resolve a selected feature element against the model.
    ///
    /// Segment and placeholder elements have no detail.
    pub fn for_element(model: &TimelineModel, element: &ElementRef) -> Option<Self> {
        let ElementKind::Feature(index) = element.kind else {
            return None;
        };
        let segment = model.segment(&element.segment_id)?;
        let feature = segment.features.get(index)?;
        Some(Self::new(feature, segment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::build_model;
    use shotscope_models::{AnalysisResult, FeatureCategory};

    fn model() -> TimelineModel {
        let mut feature = Feature::new(FeatureCategory::ColorGrading, "palette", "teal and orange", 0.87);
        feature.detailed_description = Some(DetailedDescription {
            summary: "Complementary grade".to_string(),
            technical_terms: vec!["split toning".to_string()],
            purpose: "Separate skin from background".to_string(),
            parameters: None,
        });
        build_model(
            &AnalysisResult::from_segments(vec![
                Segment::new("s1", 0.0, 3000.0),
                Segment::new("s2", 3000.0, 7000.0).with_feature(feature),
            ]),
            false,
        )
    }

    #[test]
    fn test_detail_for_feature_element() {
        let detail = FeatureDetail::for_element(&model(), &ElementRef::feature("s2", 0)).unwrap();
        assert_eq!(detail.category, "Color Grading");
        assert_eq!(detail.css_class, "color");
        assert_eq!(detail.confidence_percent, 87);
        assert_eq!(detail.time_range, "00:03.000 - 00:07.000");
        assert_eq!(detail.description.unwrap().summary, "Complementary grade");
    }

    #[test]
    fn test_no_detail_for_other_elements() {
        let model = model();
        assert!(FeatureDetail::for_element(&model, &ElementRef::segment("s2")).is_none());
        assert!(FeatureDetail::for_element(&model, &ElementRef::feature("s2", 3)).is_none());
        assert!(FeatureDetail::for_element(&model, &ElementRef::feature("zz", 0)).is_none());
    }
}
