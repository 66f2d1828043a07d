//! View state and application areas.

use serde::Serialize;

use shotscope_models::JobProgress;

/// What the analysis area shows.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    /// No job; the empty affordance is shown
    #[default]
    Idle,
    /// Job submitted, no timeline data yet
    Loading {
        #[serde(skip_serializing_if = "Option::is_none")]
        progress: Option<JobProgress>,
    },
    /// At least one result payload has been rendered
    Timeline,
}

impl ViewState {
    pub fn is_idle(&self) -> bool {
        matches!(self, ViewState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading { .. })
    }

    pub fn is_timeline(&self) -> bool {
        matches!(self, ViewState::Timeline)
    }
}

/// Top-level application area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppArea {
    #[default]
    ShotAnalysis,
    Dashboard,
    History,
    Settings,
}

impl AppArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppArea::ShotAnalysis => "shot_analysis",
            AppArea::Dashboard => "dashboard",
            AppArea::History => "history",
            AppArea::Settings => "settings",
        }
    }
}

/// Whether the session was produced by a fresh run or loaded from history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOrigin {
    #[default]
    Fresh,
    Replay,
}
