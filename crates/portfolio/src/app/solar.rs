use std::time::Duration;

use orrery::content::OrbitingEntity;
use orrery::scene::{LayoutGeneration, ResizeDebouncer};
use orrery::{
    panel_rect, FrameScheduler, InputSnapshot, MotionPreference, OrbitDriver, OrbitMotion, Scene,
    SceneCommand, SceneComposer, SceneKey, Stage, StageBody, StageSun, Vec2, Viewport,
};
use tracing::info;

const SOLAR_CAPTION: &str = "CLICK A PLANET FOR DETAILS   TAB: GRID   T: THEME";

/// Landing view: every project orbits the sun on its own ring.
pub(crate) struct SolarScene {
    entities: Vec<OrbitingEntity>,
    orbit_motion: OrbitMotion,
    motion_preference: fn() -> MotionPreference,
    viewport: Viewport,
    viewport_synced: bool,
    composer: SceneComposer,
    driver: OrbitDriver,
    scheduler: FrameScheduler,
    resize: ResizeDebouncer,
}

impl SolarScene {
    pub(crate) fn new(
        entities: Vec<OrbitingEntity>,
        viewport: Viewport,
        orbit_motion: OrbitMotion,
        resize_quiet_period: Duration,
        motion_preference: fn() -> MotionPreference,
    ) -> Self {
        let composer = SceneComposer::new(entities.clone(), viewport);
        Self {
            entities,
            orbit_motion,
            motion_preference,
            viewport,
            viewport_synced: false,
            composer,
            driver: OrbitDriver::default(),
            scheduler: FrameScheduler::default(),
            resize: ResizeDebouncer::new(resize_quiet_period),
        }
    }

    fn sync_stage_layout(&self, stage: &mut Stage) {
        let layout = self.composer.layout();
        stage.set_sun(Some(StageSun {
            center: layout.center,
            radius_px: layout.sun_radius,
        }));
        stage.set_orbits(layout.entries.iter().map(|entry| entry.geometry).collect());
        for entity in self.composer.entities() {
            let Some(entry) = layout.entry(entity.id) else {
                continue;
            };
            stage.upsert_body(StageBody {
                entity: entity.id,
                label: entity.title.clone(),
                color: entity.accent_color.to_rgba(),
                radius_px: entry.body_radius,
                completion_fraction: entity.completion_fraction(),
                position: None,
            });
        }
    }

    fn apply_layout(&mut self, generation: LayoutGeneration, viewport: Viewport, stage: &mut Stage) {
        if !self.composer.relayout(viewport, generation) {
            return;
        }
        self.sync_stage_layout(stage);
        let layout = self.composer.layout();
        self.driver.relayout(|id| layout.geometry_for(id), stage);
    }

    /// The window may open at a different physical size than requested, so the
    /// first frame adopts the real size without waiting out the resize debounce.
    fn sync_viewport(&mut self, now: Duration, input: &InputSnapshot, stage: &mut Stage) {
        if let Some(viewport) = input.resized_to() {
            self.viewport = viewport;
            self.viewport_synced = true;
            self.resize.record(viewport, now);
        } else if !self.viewport_synced {
            self.viewport_synced = true;
            let current = input.viewport();
            if current.width > 0 && current.height > 0 && current != self.composer.layout().viewport {
                self.viewport = current;
                let generation = self.resize.record(current, now);
                self.resize.clear();
                self.apply_layout(generation, current, stage);
            }
        }

        if let Some((generation, viewport)) = self.resize.poll(now) {
            self.apply_layout(generation, viewport, stage);
        }
    }

    fn handle_click(&mut self, cursor: Vec2, viewport: Viewport, stage: &mut Stage) {
        if stage.panel().is_some() && panel_rect(viewport.width, viewport.height).contains(cursor) {
            return;
        }
        match stage.pick_body_at(cursor) {
            Some(id) => {
                self.composer.select(id, stage);
            }
            None => {
                if self.composer.selection().selected().is_some() {
                    self.composer.deselect(stage);
                }
            }
        }
    }
}

impl Scene for SolarScene {
    fn load(&mut self, now: Duration, stage: &mut Stage) {
        self.composer = SceneComposer::new(self.entities.clone(), self.viewport);
        self.viewport_synced = false;
        self.resize.clear();
        stage.set_caption(Some(SOLAR_CAPTION.to_string()));
        self.sync_stage_layout(stage);

        let motion = (self.motion_preference)();
        let bindings = self.composer.bindings(self.orbit_motion);
        self.driver
            .mount(now, bindings, motion, &mut self.scheduler, stage);
        info!(
            scene = "solar",
            body_count = stage.bodies().len(),
            orbit_motion = ?self.orbit_motion,
            "scene_loaded"
        );
    }

    fn update(&mut self, now: Duration, input: &InputSnapshot, stage: &mut Stage) -> SceneCommand {
        self.sync_viewport(now, input, stage);

        for request in self.scheduler.take_due() {
            self.driver.frame(request, now, &mut self.scheduler, stage);
        }

        if input.switch_scene_pressed() {
            return SceneCommand::SwitchTo(SceneKey::Grid);
        }
        if input.close_panel_pressed() {
            self.composer.deselect(stage);
        }
        if input.left_click_pressed() {
            if let Some(cursor) = input.cursor_position_px() {
                self.handle_click(cursor, input.viewport(), stage);
            }
        }

        SceneCommand::None
    }

    fn unload(&mut self, _stage: &mut Stage) {
        self.driver.unmount(&mut self.scheduler);
        self.scheduler.clear();
        self.resize.clear();
    }

    fn title(&self) -> Option<String> {
        self.composer
            .selected_entity()
            .map(|entity| format!("Orrery | {}", entity.title))
    }
}
