//! History listing and job deletion payloads.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::job::JobStatus;

/// One entry of `GET /v1/video-analysis/history`, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryItem {
    pub job_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub status: JobStatus,

    #[serde(default)]
    pub learning_points: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    #[serde(with = "naive_or_utc")]
    #[schemars(with = "DateTime<Utc>")]
    pub created_at: DateTime<Utc>,
}

impl HistoryItem {
    /// Only finished analyses can be replayed on the timeline.
    pub fn is_replayable(&self) -> bool {
        self.status == JobStatus::Succeeded
    }

    /// Title for listings, falling back to the job id.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.job_id)
    }
}

/// The backend emits timestamps with or without an offset; offset-less
/// values are taken as UTC.
mod naive_or_utc {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

/// Acknowledgement of `DELETE /v1/video-analysis/jobs/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeleteJobResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_item_parses_naive_timestamp() {
        let json = r#"{
            "job_id": "job_1",
            "title": null,
            "status": "succeeded",
            "learning_points": ["slow dolly in"],
            "segment_count": 12,
            "duration_sec": 41.5,
            "created_at": "2025-03-04T10:11:12.123456"
        }"#;
        let item: HistoryItem = serde_json::from_str(json).unwrap();
        assert!(item.is_replayable());
        assert_eq!(item.display_title(), "job_1");
        assert_eq!(item.created_at.to_rfc3339(), "2025-03-04T10:11:12.123456+00:00");
    }

    #[test]
    fn test_history_item_parses_rfc3339() {
        let json = r#"{
            "job_id": "job_2",
            "title": "Night drive",
            "status": "failed",
            "created_at": "2025-03-04T10:11:12+02:00"
        }"#;
        let item: HistoryItem = serde_json::from_str(json).unwrap();
        assert!(!item.is_replayable());
        assert_eq!(item.display_title(), "Night drive");
        assert!(item.learning_points.is_empty());
        assert_eq!(item.created_at.to_rfc3339(), "2025-03-04T08:11:12+00:00");
    }
}
