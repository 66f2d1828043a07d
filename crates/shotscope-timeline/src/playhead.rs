//! Playhead synchronization between the media clock and the track band.
//!
//! The clock owns the current time. The synchronizer only maps time to a
//! pixel offset and back; the offset is always derived from the current
//! geometry so a resize never leaves a stale position behind.

use serde::Serialize;
use tracing::trace;

use crate::layout::ElementRef;

/// Allowed zoom range for the track content.
pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;

/// Step applied by the arrow keys.
pub const NUDGE_STEP_MS: f64 = 1000.0;

/// Pixel geometry of the track area.
///
/// The content band starts after the track header plus padding and ends
/// one padding before the right edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackGeometry {
    /// Full width of the track area, header included
    pub track_area_width: f64,
    pub track_header_width: f64,
    pub padding: f64,
    /// Content zoom multiplier
    pub zoom: f64,
}

impl Default for TrackGeometry {
    fn default() -> Self {
        Self {
            track_area_width: 1200.0,
            track_header_width: 140.0,
            padding: 8.0,
            zoom: 1.0,
        }
    }
}

impl TrackGeometry {
    pub fn new(track_area_width: f64, track_header_width: f64, padding: f64) -> Self {
        Self {
            track_area_width,
            track_header_width,
            padding,
            zoom: 1.0,
        }
    }

    /// Width of the content band, never negative.
    pub fn content_width(&self) -> f64 {
        let base = self.track_area_width - self.track_header_width - 2.0 * self.padding;
        if base.is_finite() && base > 0.0 {
            base * self.zoom
        } else {
            0.0
        }
    }

    /// Left edge of the content band.
    pub fn content_origin(&self) -> f64 {
        self.track_header_width + self.padding
    }

    /// Pixel offset for a progress percentage.
    pub fn offset_for_progress(&self, progress_percent: f64) -> f64 {
        self.content_origin() + self.content_width() * progress_percent / 100.0
    }

    /// Progress fraction in `[0, 1]` for a pixel offset.
    pub fn progress_for_offset(&self, offset: f64) -> f64 {
        let width = self.content_width();
        if width <= 0.0 || !offset.is_finite() {
            return 0.0;
        }
        ((offset - self.content_origin()) / width).clamp(0.0, 1.0)
    }

    /// True if `x` falls on the track header column.
    pub fn is_header(&self, x: f64) -> bool {
        x < self.track_header_width
    }

    /// Multiply the zoom, keeping it within range.
    pub fn zoom_by(&mut self, factor: f64) {
        if factor.is_finite() && factor > 0.0 {
            self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }
}

/// Snapshot of the media clock.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PlaybackState {
    pub current_time_ms: f64,
    pub duration_ms: f64,
    pub is_playing: bool,
}

impl PlaybackState {
    /// Progress percentage, or `None` when it cannot be computed.
    pub fn progress_percent(&self) -> Option<f64> {
        progress_percent(self.current_time_ms, self.duration_ms)
    }
}

/// `100 * current / duration`, suppressed for a zero or non-finite result.
pub fn progress_percent(current_time_ms: f64, duration_ms: f64) -> Option<f64> {
    if !duration_ms.is_finite() || duration_ms <= 0.0 {
        return None;
    }
    let percent = 100.0 * current_time_ms / duration_ms;
    percent.is_finite().then_some(percent)
}

/// The media element driving playback.
pub trait MediaClock {
    fn current_time_ms(&self) -> f64;
    fn duration_ms(&self) -> f64;
    fn seek(&mut self, time_ms: f64);
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;

    fn playback_state(&self) -> PlaybackState {
        PlaybackState {
            current_time_ms: self.current_time_ms(),
            duration_ms: self.duration_ms(),
            is_playing: !self.is_paused(),
        }
    }
}

/// A clock moved only by explicit calls. Stands in for a media element
/// when there is none, e.g. on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManualClock {
    pub current_time_ms: f64,
    pub duration_ms: f64,
    pub paused: bool,
}

impl ManualClock {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            current_time_ms: 0.0,
            duration_ms,
            paused: true,
        }
    }

    /// Advance playback time, stopping at the end.
    pub fn advance(&mut self, delta_ms: f64) {
        if !self.paused {
            self.current_time_ms = (self.current_time_ms + delta_ms).min(self.duration_ms);
        }
    }
}

impl MediaClock for ManualClock {
    fn current_time_ms(&self) -> f64 {
        self.current_time_ms
    }

    fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    fn seek(&mut self, time_ms: f64) {
        self.current_time_ms = time_ms;
    }

    fn play(&mut self) {
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}

/// Where a pointer event landed on the track area.
#[derive(Debug, Clone, PartialEq)]
pub enum HitTarget {
    /// Track title column
    Header,
    /// A laid-out element; handled by `select_element`
    Element(ElementRef),
    /// Empty track or ruler space
    TrackArea,
}

/// Rendered playhead position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlayheadPosition {
    pub time_ms: f64,
    pub progress_percent: f64,
    /// Absolute pixel offset from the left of the track area
    pub offset: f64,
}

/// Keeps the playhead offset in step with the media clock.
#[derive(Debug, Clone)]
pub struct PlayheadSynchronizer {
    geometry: TrackGeometry,
    last_time_ms: Option<f64>,
    last_progress: Option<f64>,
}

impl Default for PlayheadSynchronizer {
    fn default() -> Self {
        Self::new(TrackGeometry::default())
    }
}

impl PlayheadSynchronizer {
    pub fn new(geometry: TrackGeometry) -> Self {
        Self {
            geometry,
            last_time_ms: None,
            last_progress: None,
        }
    }

    pub fn geometry(&self) -> &TrackGeometry {
        &self.geometry
    }

    /// Last rendered position, recomputed from the current geometry.
    pub fn position(&self) -> Option<PlayheadPosition> {
        let progress_percent = self.last_progress?;
        Some(PlayheadPosition {
            time_ms: self.last_time_ms.unwrap_or(0.0),
            progress_percent,
            offset: self.geometry.offset_for_progress(progress_percent),
        })
    }

    /// Forget the last position, e.g. when a new timeline is loaded.
    pub fn clear(&mut self) {
        self.last_time_ms = None;
        self.last_progress = None;
    }

    /// Handle a playback tick. Returns `None` when the update is suppressed.
    pub fn on_clock_tick(&mut self, state: &PlaybackState) -> Option<PlayheadPosition> {
        let progress = state.progress_percent()?;
        self.record(state.current_time_ms, progress)
    }

    /// Apply a new track area width and re-place the playhead.
    pub fn resize(&mut self, track_area_width: f64) -> Option<PlayheadPosition> {
        self.geometry.track_area_width = track_area_width;
        self.position()
    }

    /// Change the zoom and re-place the playhead.
    pub fn zoom_by(&mut self, factor: f64) -> Option<PlayheadPosition> {
        self.geometry.zoom_by(factor);
        self.position()
    }

    /// Handle a click on the track area.
    ///
    /// Header and element hits have their own semantics and are ignored.
    pub fn on_track_pointer<C>(
        &mut self,
        x: f64,
        target: &HitTarget,
        clock: &mut C,
    ) -> Option<PlayheadPosition>
    where
        C: MediaClock + ?Sized,
    {
        match target {
            HitTarget::Header | HitTarget::Element(_) => None,
            HitTarget::TrackArea if self.geometry.is_header(x) => None,
            HitTarget::TrackArea => {
                let fraction = self.geometry.progress_for_offset(x);
                self.seek_to(fraction * clock.duration_ms(), clock)
            }
        }
    }

    /// Seek to a selected segment or feature element.
    pub fn select_element<C>(&mut self, start_ms: f64, clock: &mut C) -> Option<PlayheadPosition>
    where
        C: MediaClock + ?Sized,
    {
        self.seek_to(start_ms, clock)
    }

    /// Seek the clock and place the playhead from the target time right
    /// away, without waiting for the next tick.
    pub fn seek_to<C>(&mut self, time_ms: f64, clock: &mut C) -> Option<PlayheadPosition>
    where
        C: MediaClock + ?Sized,
    {
        let duration_ms = clock.duration_ms();
        if !time_ms.is_finite() || !duration_ms.is_finite() || duration_ms <= 0.0 {
            return None;
        }

        let target = time_ms.clamp(0.0, duration_ms);
        clock.seek(target);

        let progress = progress_percent(target, duration_ms)?;
        self.record(target, progress)
    }

    /// Step by `delta_ms` from the clock's current time.
    pub fn nudge<C>(&mut self, delta_ms: f64, clock: &mut C) -> Option<PlayheadPosition>
    where
        C: MediaClock + ?Sized,
    {
        let target = clock.current_time_ms() + delta_ms;
        self.seek_to(target, clock)
    }

    /// Seek from the transport slider, `fraction` of the full duration.
    pub fn slider_seek<C>(&mut self, fraction: f64, clock: &mut C) -> Option<PlayheadPosition>
    where
        C: MediaClock + ?Sized,
    {
        if !fraction.is_finite() {
            return None;
        }
        let target = fraction.clamp(0.0, 1.0) * clock.duration_ms();
        self.seek_to(target, clock)
    }

    /// Toggle playback. Returns true if the clock is now playing.
    pub fn toggle_play<C>(&mut self, clock: &mut C) -> bool
    where
        C: MediaClock + ?Sized,
    {
        if clock.is_paused() {
            clock.play();
            true
        } else {
            clock.pause();
            false
        }
    }

    fn record(&mut self, time_ms: f64, progress_percent: f64) -> Option<PlayheadPosition> {
        self.last_time_ms = Some(time_ms);
        self.last_progress = Some(progress_percent);
        let position = self.position();
        trace!(time_ms = time_ms, progress = progress_percent, "Playhead moved");
        position
    }
}
