use winit::event::{ElementState, MouseButton};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::orbit::Vec2;
use crate::scene::Viewport;

/// Input as seen by one scene update. Presses are edges: true for exactly one
/// snapshot per physical press.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    cursor_position_px: Option<Vec2>,
    left_click_pressed: bool,
    close_panel_pressed: bool,
    switch_scene_pressed: bool,
    resized_to: Option<Viewport>,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn left_click_pressed(&self) -> bool {
        self.left_click_pressed
    }

    pub fn close_panel_pressed(&self) -> bool {
        self.close_panel_pressed
    }

    pub fn switch_scene_pressed(&self) -> bool {
        self.switch_scene_pressed
    }

    /// Latest window size if the window was resized since the previous snapshot.
    pub fn resized_to(&self) -> Option<Viewport> {
        self.resized_to
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.window_width, self.window_height)
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_left_click_pressed(mut self, left_click_pressed: bool) -> Self {
        self.left_click_pressed = left_click_pressed;
        self
    }

    pub fn with_close_panel_pressed(mut self, close_panel_pressed: bool) -> Self {
        self.close_panel_pressed = close_panel_pressed;
        self
    }

    pub fn with_switch_scene_pressed(mut self, switch_scene_pressed: bool) -> Self {
        self.switch_scene_pressed = switch_scene_pressed;
        self
    }

    pub fn with_resized_to(mut self, resized_to: Option<Viewport>) -> Self {
        self.resized_to = resized_to;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }
}

#[derive(Debug, Default)]
struct EdgeKey {
    is_down: bool,
    pressed_edge: bool,
}

impl EdgeKey {
    fn handle(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.is_down {
                    self.pressed_edge = true;
                }
                self.is_down = true;
            }
            ElementState::Released => self.is_down = false,
        }
    }

    fn take(&mut self) -> bool {
        std::mem::take(&mut self.pressed_edge)
    }
}

#[derive(Debug, Default)]
pub(crate) struct InputCollector {
    quit_requested: bool,
    switch_scene: EdgeKey,
    close_panel: EdgeKey,
    theme_toggle: EdgeKey,
    left_mouse: EdgeKey,
    cursor_position_px: Option<Vec2>,
    resized_to: Option<Viewport>,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    pub(crate) fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    pub(crate) fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    pub(crate) fn handle_key(&mut self, key: PhysicalKey, state: ElementState) {
        match key {
            PhysicalKey::Code(KeyCode::Tab) => self.switch_scene.handle(state),
            PhysicalKey::Code(KeyCode::Escape) => self.close_panel.handle(state),
            PhysicalKey::Code(KeyCode::KeyT) => self.theme_toggle.handle(state),
            _ => {}
        }
    }

    pub(crate) fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.left_mouse.handle(state);
        }
    }

    pub(crate) fn set_cursor_position_px(&mut self, x: f64, y: f64) {
        self.cursor_position_px = Some(Vec2::new(x, y));
    }

    pub(crate) fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
    }

    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        if (width, height) == (self.window_width, self.window_height) && self.resized_to.is_none() {
            return;
        }
        self.window_width = width;
        self.window_height = height;
        self.resized_to = Some(Viewport::new(width, height));
    }

    pub(crate) fn take_theme_toggle_pressed(&mut self) -> bool {
        self.theme_toggle.take()
    }

    pub(crate) fn snapshot_for_frame(&mut self) -> InputSnapshot {
        InputSnapshot {
            quit_requested: self.quit_requested,
            cursor_position_px: self.cursor_position_px,
            left_click_pressed: self.left_mouse.take(),
            close_panel_pressed: self.close_panel.take(),
            switch_scene_pressed: self.switch_scene.take(),
            resized_to: self.resized_to.take(),
            window_width: self.window_width,
            window_height: self.window_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> PhysicalKey {
        PhysicalKey::Code(code)
    }

    #[test]
    fn tab_press_is_edge_triggered_for_single_frame() {
        let mut input = InputCollector::default();
        input.handle_key(key(KeyCode::Tab), ElementState::Pressed);

        let first = input.snapshot_for_frame();
        let second = input.snapshot_for_frame();

        assert!(first.switch_scene_pressed());
        assert!(!second.switch_scene_pressed());
    }

    #[test]
    fn held_key_does_not_repeat_pressed_edge() {
        let mut input = InputCollector::default();
        input.handle_key(key(KeyCode::Escape), ElementState::Pressed);
        assert!(input.snapshot_for_frame().close_panel_pressed());

        input.handle_key(key(KeyCode::Escape), ElementState::Pressed);
        assert!(!input.snapshot_for_frame().close_panel_pressed());

        input.handle_key(key(KeyCode::Escape), ElementState::Released);
        input.handle_key(key(KeyCode::Escape), ElementState::Pressed);
        assert!(input.snapshot_for_frame().close_panel_pressed());
    }

    #[test]
    fn left_click_is_edge_triggered_and_other_buttons_ignored() {
        let mut input = InputCollector::default();
        input.handle_mouse_input(MouseButton::Right, ElementState::Pressed);
        assert!(!input.snapshot_for_frame().left_click_pressed());

        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        assert!(input.snapshot_for_frame().left_click_pressed());
        assert!(!input.snapshot_for_frame().left_click_pressed());
    }

    #[test]
    fn theme_toggle_is_consumed_outside_snapshots() {
        let mut input = InputCollector::default();
        input.handle_key(key(KeyCode::KeyT), ElementState::Pressed);
        input.snapshot_for_frame();

        assert!(input.take_theme_toggle_pressed());
        assert!(!input.take_theme_toggle_pressed());
    }

    #[test]
    fn resize_is_reported_once_with_latest_size() {
        let mut input = InputCollector::new(800, 600);
        input.set_window_size(1024, 768);
        input.set_window_size(1280, 720);

        let first = input.snapshot_for_frame();
        assert_eq!(first.resized_to(), Some(Viewport::new(1280, 720)));
        assert_eq!(first.window_size(), (1280, 720));
        assert_eq!(input.snapshot_for_frame().resized_to(), None);

        input.set_window_size(1280, 720);
        assert_eq!(input.snapshot_for_frame().resized_to(), None);
    }

    #[test]
    fn snapshot_carries_cursor_until_cleared() {
        let mut input = InputCollector::new(640, 480);
        input.set_cursor_position_px(12.5, 40.0);
        assert_eq!(
            input.snapshot_for_frame().cursor_position_px(),
            Some(Vec2::new(12.5, 40.0))
        );

        input.clear_cursor_position();
        assert_eq!(input.snapshot_for_frame().cursor_position_px(), None);
    }

    #[test]
    fn quit_request_is_sticky() {
        let mut input = InputCollector::default();
        input.mark_quit_requested();
        assert!(input.snapshot_for_frame().quit_requested());
        assert!(input.snapshot_for_frame().quit_requested());
    }
}
