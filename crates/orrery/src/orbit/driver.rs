use std::time::Duration;

use tracing::{debug, info};

use super::easing::Easing;
use super::frame::{FrameRequestId, FrameScheduler};
use super::geometry::{normalize_degrees, OrbitGeometry, FULL_TURN_DEGREES};
use super::EntityId;

/// Delay between consecutive entities starting their animation.
pub const DEFAULT_STAGGER_STEP: Duration = Duration::from_millis(100);

/// Write-only placement seam between the driver and whatever draws the scene.
pub trait PositionSink {
    fn set_position(&mut self, entity: EntityId, x: f64, y: f64);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MotionPreference {
    #[default]
    Full,
    Reduced,
}

impl MotionPreference {
    pub fn from_reduced_flag(reduced: bool) -> Self {
        if reduced {
            Self::Reduced
        } else {
            Self::Full
        }
    }

    pub fn is_reduced(self) -> bool {
        self == Self::Reduced
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationMode {
    /// Perpetual orbit starting at the phase offset.
    ContinuousCycle { degrees_per_second: f64 },
    /// One-shot eased travel that settles at `to_degrees`.
    AnimateToTarget {
        from_degrees: f64,
        to_degrees: f64,
        duration: Duration,
        easing: Easing,
    },
    Static,
}

impl AnimationMode {
    pub fn continuous_with_period(period: Duration) -> Self {
        let seconds = period.as_secs_f64();
        let degrees_per_second = if seconds > 0.0 {
            FULL_TURN_DEGREES / seconds
        } else {
            0.0
        };
        Self::ContinuousCycle { degrees_per_second }
    }

    fn initial_angle(&self, phase_offset_degrees: f64) -> f64 {
        match *self {
            AnimationMode::AnimateToTarget { from_degrees, .. } => normalize_degrees(from_degrees),
            AnimationMode::ContinuousCycle { .. } | AnimationMode::Static => {
                normalize_degrees(phase_offset_degrees)
            }
        }
    }

    fn settled_angle(&self, phase_offset_degrees: f64) -> f64 {
        match *self {
            AnimationMode::AnimateToTarget { to_degrees, .. } => normalize_degrees(to_degrees),
            AnimationMode::ContinuousCycle { .. } | AnimationMode::Static => {
                normalize_degrees(phase_offset_degrees)
            }
        }
    }

    /// Angle after `elapsed` of animation and whether the animation is finished.
    fn angle_at(&self, phase_offset_degrees: f64, elapsed: Duration) -> (f64, bool) {
        match *self {
            AnimationMode::ContinuousCycle { degrees_per_second } => {
                let travelled = elapsed.as_secs_f64() * degrees_per_second;
                (normalize_degrees(phase_offset_degrees + travelled), false)
            }
            AnimationMode::AnimateToTarget {
                from_degrees,
                to_degrees,
                duration,
                easing,
            } => {
                if elapsed >= duration {
                    return (normalize_degrees(to_degrees), true);
                }
                let progress = elapsed.as_secs_f64() / duration.as_secs_f64();
                let eased = easing.apply(progress);
                let angle = from_degrees + (to_degrees - from_degrees) * eased;
                (normalize_degrees(angle), false)
            }
            AnimationMode::Static => (normalize_degrees(phase_offset_degrees), true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPhase {
    Idle { starts_at: Duration },
    Animating,
    Settled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    current_angle_degrees: f64,
    phase_offset_degrees: f64,
    start_timestamp: Option<Duration>,
    mode: AnimationMode,
    phase: AnimationPhase,
    ticks: u64,
}

impl AnimationState {
    pub fn current_angle_degrees(&self) -> f64 {
        self.current_angle_degrees
    }

    pub fn start_timestamp(&self) -> Option<Duration> {
        self.start_timestamp
    }

    pub fn mode(&self) -> AnimationMode {
        self.mode
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_settled(&self) -> bool {
        self.phase == AnimationPhase::Settled
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackBinding {
    pub entity: EntityId,
    pub geometry: OrbitGeometry,
    pub phase_offset_degrees: f64,
    pub mode: AnimationMode,
    pub stagger: Duration,
}

#[derive(Debug)]
struct Track {
    entity: EntityId,
    geometry: OrbitGeometry,
    state: AnimationState,
}

impl Track {
    fn write_position(&self, sink: &mut impl PositionSink) {
        let position = self.geometry.position_at(self.state.current_angle_degrees);
        sink.set_position(self.entity, position.x, position.y);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub ticked: usize,
    pub settled: usize,
    pub frame_requested: bool,
}

/// Advances every mounted entity along its orbit once per delivered frame.
///
/// The driver holds at most one outstanding [`FrameRequestId`]. Frames are only
/// requested while some entity is idle or animating, and [`OrbitDriver::unmount`]
/// cancels the outstanding request so nothing is written afterwards.
#[derive(Debug, Default)]
pub struct OrbitDriver {
    tracks: Vec<Track>,
    pending_frame: Option<FrameRequestId>,
    mounted: bool,
}

impl OrbitDriver {
    pub fn mount(
        &mut self,
        now: Duration,
        bindings: impl IntoIterator<Item = TrackBinding>,
        motion: MotionPreference,
        scheduler: &mut FrameScheduler,
        sink: &mut impl PositionSink,
    ) {
        if self.mounted {
            self.unmount(scheduler);
        }

        for binding in bindings {
            let phase_offset_degrees = normalize_degrees(binding.phase_offset_degrees);
            let settle_now =
                motion.is_reduced() || matches!(binding.mode, AnimationMode::Static);
            let (current_angle_degrees, phase) = if settle_now {
                (
                    binding.mode.settled_angle(phase_offset_degrees),
                    AnimationPhase::Settled,
                )
            } else {
                (
                    binding.mode.initial_angle(phase_offset_degrees),
                    AnimationPhase::Idle {
                        starts_at: now.saturating_add(binding.stagger),
                    },
                )
            };
            let track = Track {
                entity: binding.entity,
                geometry: binding.geometry,
                state: AnimationState {
                    current_angle_degrees,
                    phase_offset_degrees,
                    start_timestamp: None,
                    mode: binding.mode,
                    phase,
                    ticks: 0,
                },
            };
            track.write_position(sink);
            self.tracks.push(track);
        }

        self.mounted = true;
        self.request_frame_if_needed(scheduler);
        info!(
            entity_count = self.tracks.len(),
            reduced_motion = motion.is_reduced(),
            animating = self.pending_frame.is_some(),
            "orbit_driver_mounted"
        );
    }

    pub fn frame(
        &mut self,
        request: FrameRequestId,
        now: Duration,
        scheduler: &mut FrameScheduler,
        sink: &mut impl PositionSink,
    ) -> FrameReport {
        if !self.mounted || self.pending_frame != Some(request) {
            debug!(request = request.0, "stale_frame_ignored");
            return FrameReport::default();
        }
        self.pending_frame = None;

        let mut report = FrameReport::default();
        for track in &mut self.tracks {
            if let AnimationPhase::Idle { starts_at } = track.state.phase {
                if now < starts_at {
                    continue;
                }
                track.state.phase = AnimationPhase::Animating;
                track.state.start_timestamp = Some(starts_at);
            }
            if track.state.phase != AnimationPhase::Animating {
                continue;
            }

            let started = track.state.start_timestamp.unwrap_or(now);
            let elapsed = now.saturating_sub(started);
            let (angle, finished) = track
                .state
                .mode
                .angle_at(track.state.phase_offset_degrees, elapsed);
            track.state.current_angle_degrees = angle;
            track.state.ticks = track.state.ticks.saturating_add(1);
            track.write_position(sink);
            report.ticked += 1;

            if finished {
                track.state.phase = AnimationPhase::Settled;
                report.settled += 1;
                debug!(entity = track.entity.0, angle, "orbit_settled");
            }
        }

        self.request_frame_if_needed(scheduler);
        report.frame_requested = self.pending_frame.is_some();
        report
    }

    /// Re-places every entity with fresh geometry at its current angle.
    pub fn relayout<F>(&mut self, geometry_for: F, sink: &mut impl PositionSink) -> usize
    where
        F: Fn(EntityId) -> Option<OrbitGeometry>,
    {
        let mut written = 0;
        for track in &mut self.tracks {
            if let Some(geometry) = geometry_for(track.entity) {
                track.geometry = geometry;
            }
            track.write_position(sink);
            written += 1;
        }
        written
    }

    pub fn remove_entity(&mut self, entity: EntityId, scheduler: &mut FrameScheduler) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|track| track.entity != entity);
        let removed = self.tracks.len() != before;
        if removed && !self.needs_frames() {
            self.cancel_pending_frame(scheduler);
        }
        removed
    }

    pub fn unmount(&mut self, scheduler: &mut FrameScheduler) {
        if !self.mounted {
            return;
        }
        self.cancel_pending_frame(scheduler);
        let discarded = self.tracks.len();
        self.tracks.clear();
        self.mounted = false;
        info!(discarded, "orbit_driver_unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn pending_frame(&self) -> Option<FrameRequestId> {
        self.pending_frame
    }

    pub fn entity_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn state(&self, entity: EntityId) -> Option<&AnimationState> {
        self.tracks
            .iter()
            .find(|track| track.entity == entity)
            .map(|track| &track.state)
    }

    pub fn total_ticks(&self) -> u64 {
        self.tracks
            .iter()
            .fold(0u64, |sum, track| sum.saturating_add(track.state.ticks))
    }

    fn needs_frames(&self) -> bool {
        self.tracks
            .iter()
            .any(|track| track.state.phase != AnimationPhase::Settled)
    }

    fn request_frame_if_needed(&mut self, scheduler: &mut FrameScheduler) {
        if self.pending_frame.is_none() && self.mounted && self.needs_frames() {
            self.pending_frame = Some(scheduler.request_frame());
        }
    }

    fn cancel_pending_frame(&mut self, scheduler: &mut FrameScheduler) {
        if let Some(request) = self.pending_frame.take() {
            scheduler.cancel_frame(request);
        }
    }
}
