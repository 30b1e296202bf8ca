mod composer;
mod layout;
mod resize;
mod selection;
mod slots;

pub use composer::{
    default_angular_speed, OrbitMotion, SceneComposer, BASE_ORBIT_PERIOD,
    PROGRESS_SWEEP_DURATION, RING_PERIOD_STEP,
};
pub use layout::{
    compute_layout, layout, EntityLayout, LayoutGeneration, LayoutPolicy, SceneLayout, Viewport,
    MIN_BODY_RADIUS, MIN_SUN_RADIUS,
};
pub use resize::{ResizeDebouncer, DEFAULT_RESIZE_QUIET_PERIOD};
pub use selection::{DetailPanel, Selection};
pub use slots::{
    assign_slot_angles, assign_slot_angles_with_overrides, SlotArc, SlotPolicy,
    DEFAULT_SLOT_BASE_DEGREES, DEFAULT_SLOT_STEP_DEGREES,
};
