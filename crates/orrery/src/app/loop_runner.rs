use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::content::ContentError;
use crate::scene::DEFAULT_RESIZE_QUIET_PERIOD;
use crate::theme::ThemeController;
use crate::StartupError;

use super::frame_stats::FrameStatsAccumulator;
use super::input::InputCollector;
use super::rendering::{HudData, Renderer};
use super::scene::{Scene, SceneCommand, SceneKey, SceneMachine};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub metrics_log_interval: Duration,
    pub max_render_fps: Option<u32>,
    pub resize_quiet_period: Duration,
    pub initial_scene: SceneKey,
    pub show_hud: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Orrery".to_string(),
            window_width: 1280,
            window_height: 720,
            metrics_log_interval: Duration::from_secs(1),
            max_render_fps: None,
            resize_quiet_period: DEFAULT_RESIZE_QUIET_PERIOD,
            initial_scene: SceneKey::Solar,
            show_hud: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and runs the frame-synced loop until the window closes.
///
/// Every redraw takes one input snapshot, runs one update of the active scene,
/// applies any scene switch, then renders the active stage. Scene time is the
/// time since the loop started.
pub fn run_app(
    config: LoopConfig,
    solar: Box<dyn Scene>,
    grid: Box<dyn Scene>,
    theme: ThemeController,
) -> Result<(), AppError> {
    let mut scenes = SceneMachine::new(solar, grid, config.initial_scene);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let window_for_loop = Arc::clone(&window);
    let mut renderer = Renderer::new(window, theme.reader()).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);
    let initial_viewport = renderer.viewport();
    let mut input_collector = InputCollector::new(initial_viewport.width, initial_viewport.height);

    let loop_start = Instant::now();
    scenes.load_active(Duration::ZERO);
    info!(
        scene = ?scenes.active_scene(),
        body_count = scenes.active_stage().bodies().len(),
        theme = ?theme.mode(),
        "scene_loaded"
    );
    info!(
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        resize_quiet_period_ms = config.resize_quiet_period.as_millis() as u64,
        "loop_config"
    );

    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut stats_accumulator = FrameStatsAccumulator::new(metrics_log_interval);
    let mut last_stats = None;
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        input_collector.mark_quit_requested();
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        input_collector.set_window_size(new_size.width, new_size.height);
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = window_for_loop.inner_size();
                        input_collector.set_window_size(size.width, size.height);
                        if let Err(error) = renderer.resize(size.width, size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        input_collector.set_cursor_position_px(position.x, position.y);
                    }
                    WindowEvent::CursorLeft { .. } => {
                        input_collector.clear_cursor_position();
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        input_collector.handle_mouse_input(button, state);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        input_collector.handle_key(event.physical_key, event.state);
                    }
                    WindowEvent::RedrawRequested => {
                        if input_collector.take_theme_toggle_pressed() {
                            theme.toggle_theme();
                        }

                        let frame_instant = Instant::now();
                        let raw_frame_dt = frame_instant.saturating_duration_since(last_frame_instant);
                        last_frame_instant = frame_instant;
                        let now = frame_instant.saturating_duration_since(loop_start);

                        let input_snapshot = input_collector.snapshot_for_frame();
                        let command = scenes.update_active(now, &input_snapshot);
                        if let SceneCommand::SwitchTo(next_scene) = command {
                            scenes.switch_to(next_scene, now);
                        }

                        let elapsed_since_last_present =
                            Instant::now().saturating_duration_since(last_present_instant);
                        let cap_sleep =
                            compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                        if cap_sleep > Duration::ZERO {
                            thread::sleep(cap_sleep);
                        }

                        let hud = config.show_hud.then(|| HudData {
                            stats: last_stats.unwrap_or_default(),
                            render_fps_cap: effective_render_cap,
                        });
                        if let Err(error) = renderer.render_stage(scenes.active_stage(), hud.as_ref()) {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }
                        last_present_instant = Instant::now();

                        let next_title = scenes.active_title();
                        if next_title != last_applied_title {
                            match &next_title {
                                Some(title) => window_for_loop.set_title(title),
                                None => window_for_loop.set_title(&config.window_title),
                            }
                            last_applied_title = next_title;
                        }

                        stats_accumulator.record_frame(raw_frame_dt);
                        stats_accumulator
                            .observe_position_writes(scenes.active_stage().position_writes());
                        if let Some(snapshot) = stats_accumulator.maybe_snapshot(frame_instant) {
                            last_stats = Some(snapshot);
                            info!(
                                fps = snapshot.fps,
                                frame_time_ms = snapshot.frame_time_ms,
                                position_writes_per_second = snapshot.position_writes_per_second,
                                body_count = scenes.active_stage().bodies().len(),
                                scene = ?scenes.active_scene(),
                                "loop_metrics"
                            );
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                scenes.shutdown_all();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}
