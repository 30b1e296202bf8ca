mod frame_stats;
mod input;
mod loop_runner;
mod rendering;
mod scene;
mod stage;

pub use frame_stats::FrameStatsSnapshot;
pub use input::InputSnapshot;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{HudData, Renderer};
pub use scene::{Scene, SceneCommand, SceneKey};
pub use stage::{
    panel_rect, PanelContent, Rect, Stage, StageBody, StageCard, StageSun, PANEL_MARGIN_PX,
    PANEL_MIN_WIDTH_PX, PANEL_WIDTH_FRACTION, PICK_PADDING_PX,
};
