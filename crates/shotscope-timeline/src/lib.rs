//! Timeline engine for ShotScope.
//!
//! This crate provides:
//! - The normalized timeline model and its streaming merge
//! - Proportional layout of segments and per-category feature tracks
//! - The time ruler and feature detail content
//! - Playhead synchronization with a media clock

pub mod detail;
pub mod layout;
pub mod model;
pub mod playhead;
pub mod ruler;

pub use detail::FeatureDetail;
pub use layout::{
    layout_segment, ElementKind, ElementRef, SegmentLayout, TimelineLayout, Track, TrackElement,
    TrackKind,
};
pub use model::{build_model, merge_model, TimelineModel};
pub use playhead::{
    HitTarget, ManualClock, MediaClock, PlaybackState, PlayheadPosition, PlayheadSynchronizer,
    TrackGeometry,
};
pub use ruler::{ruler_ticks, RulerTick};
