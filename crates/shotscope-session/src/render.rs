//! Plain-text rendering of a laid-out timeline for terminals.

use std::fmt::Write;

use shotscope_timeline::{PlayheadPosition, TimelineLayout, TrackGeometry};

const TITLE_WIDTH: usize = 14;

/// Render each track as a row of `columns` cells.
///
/// `|` marks the start of an element, `=` fills it and `~` fills a
/// placeholder. Empty space is `.`.
pub fn render_tracks(layout: &TimelineLayout, columns: usize) -> String {
    let mut out = String::new();
    let columns = columns.max(1);

    for track in &layout.tracks {
        let mut band = vec!['.'; columns];
        for element in &track.elements {
            let start = cell(element.layout.left_percent, columns);
            let end = cell(element.layout.right_percent(), columns).max(start + 1).min(columns);
            if start >= columns {
                continue;
            }
            let fill = if element.placeholder { '~' } else { '=' };
            for c in &mut band[start..end] {
                *c = fill;
            }
            band[start] = '|';
        }

        let row: String = band.into_iter().collect();
        let _ = writeln!(out, "{:<width$} {}", track.title(), row, width = TITLE_WIDTH);
    }

    out
}

/// Row with a `^` under the playhead, aligned with `render_tracks`.
pub fn render_playhead(position: &PlayheadPosition, columns: usize) -> String {
    let columns = columns.max(1);
    let at = cell(position.progress_percent, columns).min(columns - 1);
    format!("{:<width$} {}^", "", " ".repeat(at), width = TITLE_WIDTH)
}

/// Describe the playhead in pixels for a given geometry.
pub fn describe_playhead(position: &PlayheadPosition, geometry: &TrackGeometry) -> String {
    format!(
        "playhead {:.1}% at {:.1}px (content {:.0}px from {:.0}px)",
        position.progress_percent,
        position.offset,
        geometry.content_width(),
        geometry.content_origin()
    )
}

fn cell(percent: f64, columns: usize) -> usize {
    if !percent.is_finite() || percent <= 0.0 {
        return 0;
    }
    (percent / 100.0 * columns as f64).floor() as usize
}
