use std::env;
use std::path::PathBuf;

use orrery::{
    resolve_app_paths, AppError, LoopConfig, MotionPreference, OrbitMotion, ProjectCatalog, Scene,
    ThemeController, ThemeMode, Viewport,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::grid::GridScene;
use super::solar::SolarScene;

const CONTENT_FILE_ENV_VAR: &str = "ORRERY_CONTENT_FILE";
const ORBIT_MODE_ENV_VAR: &str = "ORRERY_ORBIT_MODE";
const THEME_ENV_VAR: &str = "ORRERY_THEME";
const MAX_FPS_ENV_VAR: &str = "ORRERY_MAX_FPS";
const REDUCED_MOTION_ENV_VAR: &str = "ORRERY_REDUCED_MOTION";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) solar: Box<dyn Scene>,
    pub(crate) grid: Box<dyn Scene>,
    pub(crate) theme: ThemeController,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    info!("=== Orrery Startup ===");

    let app_paths = resolve_app_paths()?;
    let content_file = read_env(CONTENT_FILE_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| app_paths.content_file.clone());
    info!(
        root = %app_paths.root.display(),
        content_file = %content_file.display(),
        "startup"
    );
    let catalog = ProjectCatalog::load_or_sample(&content_file)?;

    let orbit_motion = setting_from_env(ORBIT_MODE_ENV_VAR, OrbitMotion::parse, OrbitMotion::default());
    let theme_mode = setting_from_env(THEME_ENV_VAR, ThemeMode::parse, ThemeMode::default());
    let max_render_fps = setting_from_env(MAX_FPS_ENV_VAR, parse_render_fps, None);
    let config = LoopConfig {
        max_render_fps,
        show_hud: cfg!(debug_assertions),
        ..LoopConfig::default()
    };
    info!(
        project_count = catalog.len(),
        orbit_motion = ?orbit_motion,
        theme = ?theme_mode,
        "app_configured"
    );

    let initial_viewport = Viewport::new(config.window_width, config.window_height);
    let entities = catalog.into_entities();
    let solar = SolarScene::new(
        entities.clone(),
        initial_viewport,
        orbit_motion,
        config.resize_quiet_period,
        reduced_motion_from_env,
    );
    let grid = GridScene::new(entities, initial_viewport);

    Ok(AppWiring {
        config,
        solar: Box::new(solar),
        grid: Box::new(grid),
        theme: ThemeController::new(theme_mode),
    })
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Read on every mount of the solar scene, so a changed preference applies on
/// the next visit.
pub(crate) fn reduced_motion_from_env() -> MotionPreference {
    let reduced = read_env(REDUCED_MOTION_ENV_VAR)
        .map(|raw| parse_reduced_motion_flag(&raw))
        .unwrap_or(false);
    MotionPreference::from_reduced_flag(reduced)
}

fn read_env(var: &'static str) -> Option<String> {
    match env::var(var) {
        Ok(value) => Some(value),
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(env_var = var, error = %err, "unable to read env var; using default");
            None
        }
    }
}

fn setting_from_env<T>(var: &'static str, parse: impl Fn(&str) -> Option<T>, fallback: T) -> T {
    match read_env(var) {
        Some(raw) => parse_setting(var, &raw, parse, fallback),
        None => fallback,
    }
}

fn parse_setting<T>(
    var: &'static str,
    raw: &str,
    parse: impl Fn(&str) -> Option<T>,
    fallback: T,
) -> T {
    match parse(raw.trim()) {
        Some(value) => value,
        None => {
            warn!(
                env_var = var,
                value = raw,
                "invalid env var value; falling back to default"
            );
            fallback
        }
    }
}

/// `off` or `0` disables the cap.
fn parse_render_fps(raw: &str) -> Option<Option<u32>> {
    if raw.eq_ignore_ascii_case("off") {
        return Some(None);
    }
    raw.parse::<u32>()
        .ok()
        .map(|fps| if fps == 0 { None } else { Some(fps) })
}

fn parse_reduced_motion_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "reduce"
    )
}
