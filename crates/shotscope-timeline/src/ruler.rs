//! Time ruler above the tracks.

use serde::Serialize;

use shotscope_models::format_ms;

/// Number of intervals the ruler is divided into.
pub const DEFAULT_RULER_INTERVALS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulerTick {
    pub left_percent: f64,
    pub time_ms: f64,
    /// `MM:SS.mmm`
    pub label: String,
}

/// Evenly spaced ticks from 0 to `total_duration_ms`, both ends included.
///
/// An empty timeline has no ruler.
pub fn ruler_ticks(total_duration_ms: f64, intervals: u32) -> Vec<RulerTick> {
    if intervals == 0 || !total_duration_ms.is_finite() || total_duration_ms <= 0.0 {
        return Vec::new();
    }

    (0..=intervals)
        .map(|i| {
            let fraction = f64::from(i) / f64::from(intervals);
            let time_ms = total_duration_ms * fraction;
            RulerTick {
                left_percent: 100.0 * fraction,
                time_ms,
                label: format_ms(time_ms),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ruler_ticks() {
        let ticks = ruler_ticks(7000.0, DEFAULT_RULER_INTERVALS);
        assert_eq!(ticks.len(), 11);
        assert_eq!(ticks[0].label, "00:00.000");
        assert_eq!(ticks[5].time_ms, 3500.0);
        assert_eq!(ticks[5].label, "00:03.500");
        assert_eq!(ticks[10].left_percent, 100.0);
        assert_eq!(ticks[10].label, "00:07.000");
    }

    #[test]
    fn test_ruler_degenerate() {
        assert!(ruler_ticks(0.0, 10).is_empty());
        assert!(ruler_ticks(5000.0, 0).is_empty());
        assert!(ruler_ticks(f64::INFINITY, 10).is_empty());
    }
}
