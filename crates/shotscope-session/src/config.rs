//! Engine configuration.

use shotscope_client::client::DEFAULT_HISTORY_LIMIT;
use shotscope_client::{ClientConfig, PollConfig};
use shotscope_timeline::TrackGeometry;

use crate::error::SessionResult;

/// Everything needed to stand up a session controller.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub client: ClientConfig,
    pub poll: PollConfig,
    /// Initial track geometry; resized by the front end
    pub geometry: TrackGeometry,
    /// Entries requested when listing history
    pub history_limit: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            poll: PollConfig::default(),
            geometry: TrackGeometry::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> SessionResult<Self> {
        let defaults = TrackGeometry::default();

        Ok(Self {
            client: ClientConfig::from_env()?,
            poll: PollConfig::from_env(),
            geometry: TrackGeometry::new(
                env_f64("SHOTSCOPE_TRACK_WIDTH").unwrap_or(defaults.track_area_width),
                env_f64("SHOTSCOPE_TRACK_HEADER_WIDTH").unwrap_or(defaults.track_header_width),
                env_f64("SHOTSCOPE_TRACK_PADDING").unwrap_or(defaults.padding),
            ),
            history_limit: std::env::var("SHOTSCOPE_HISTORY_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_HISTORY_LIMIT),
        })
    }
}

fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
}
