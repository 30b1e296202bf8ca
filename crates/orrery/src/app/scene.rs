use std::time::Duration;

use tracing::info;

use super::input::InputSnapshot;
use super::stage::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    Solar,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(SceneKey),
}

/// A view of the site. `now` is time since the loop started.
///
/// `unload` is called whenever the scene stops being active, so anything that
/// schedules frames must cancel them there.
pub trait Scene {
    fn load(&mut self, now: Duration, stage: &mut Stage);
    fn update(&mut self, now: Duration, input: &InputSnapshot, stage: &mut Stage) -> SceneCommand;
    fn unload(&mut self, stage: &mut Stage);
    fn title(&self) -> Option<String> {
        None
    }
}

struct SceneRuntime {
    scene: Box<dyn Scene>,
    stage: Stage,
    is_loaded: bool,
}

impl SceneRuntime {
    fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            stage: Stage::default(),
            is_loaded: false,
        }
    }

    fn load(&mut self, now: Duration) {
        if self.is_loaded {
            return;
        }
        self.scene.load(now, &mut self.stage);
        self.is_loaded = true;
    }

    fn unload(&mut self) {
        if !self.is_loaded {
            return;
        }
        self.scene.unload(&mut self.stage);
        self.stage.clear();
        self.is_loaded = false;
    }
}

pub(crate) struct SceneMachine {
    solar: SceneRuntime,
    grid: SceneRuntime,
    active_scene: SceneKey,
}

impl SceneMachine {
    pub(crate) fn new(solar: Box<dyn Scene>, grid: Box<dyn Scene>, active_scene: SceneKey) -> Self {
        Self {
            solar: SceneRuntime::new(solar),
            grid: SceneRuntime::new(grid),
            active_scene,
        }
    }

    pub(crate) fn active_scene(&self) -> SceneKey {
        self.active_scene
    }

    pub(crate) fn load_active(&mut self, now: Duration) {
        self.runtime_mut(self.active_scene).load(now);
    }

    pub(crate) fn update_active(&mut self, now: Duration, input: &InputSnapshot) -> SceneCommand {
        let runtime = self.runtime_mut(self.active_scene);
        runtime.scene.update(now, input, &mut runtime.stage)
    }

    pub(crate) fn active_stage(&self) -> &Stage {
        &self.runtime_ref(self.active_scene).stage
    }

    pub(crate) fn active_title(&self) -> Option<String> {
        self.runtime_ref(self.active_scene).scene.title()
    }

    /// Unloads the current scene before loading the next one.
    pub(crate) fn switch_to(&mut self, next_scene: SceneKey, now: Duration) -> bool {
        if self.active_scene == next_scene {
            return false;
        }
        let previous = self.active_scene;
        self.runtime_mut(previous).unload();
        self.active_scene = next_scene;
        self.runtime_mut(next_scene).load(now);
        info!(from = ?previous, to = ?next_scene, "scene_switched");
        true
    }

    pub(crate) fn shutdown_all(&mut self) {
        self.solar.unload();
        self.grid.unload();
    }

    fn runtime_ref(&self, key: SceneKey) -> &SceneRuntime {
        match key {
            SceneKey::Solar => &self.solar,
            SceneKey::Grid => &self.grid,
        }
    }

    fn runtime_mut(&mut self, key: SceneKey) -> &mut SceneRuntime {
        match key {
            SceneKey::Solar => &mut self.solar,
            SceneKey::Grid => &mut self.grid,
        }
    }
}
