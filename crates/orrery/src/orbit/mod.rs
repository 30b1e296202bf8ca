mod driver;
mod easing;
mod frame;
mod geometry;

pub use driver::{
    AnimationMode, AnimationPhase, AnimationState, FrameReport, MotionPreference, OrbitDriver,
    PositionSink, TrackBinding, DEFAULT_STAGGER_STEP,
};
pub use easing::Easing;
pub use frame::{FrameRequestId, FrameScheduler};
pub use geometry::{
    clamp_orbit_radius, completion_to_angle, normalize_degrees, orbit_position, OrbitGeometry,
    Vec2, FULL_TURN_DEGREES, MIN_ORBIT_RADIUS, PROGRESS_DEGREES_PER_PERCENT,
    PROGRESS_START_DEGREES,
};

/// Stable identity of an orbiting body, shared by the driver, the composer and the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);
