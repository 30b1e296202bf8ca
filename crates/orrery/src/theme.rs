use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

static THEME_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_theme_lock_poison_once(operation: &'static str) {
    if THEME_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "theme lock poisoned; recovered inner value");
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    pub fn palette(self) -> ThemePalette {
        match self {
            Self::Light => ThemePalette::LIGHT,
            Self::Dark => ThemePalette::DARK,
        }
    }
}

/// RGBA colors the renderer draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub background: [u8; 4],
    pub star: [u8; 4],
    pub orbit: [u8; 4],
    pub sun_core: [u8; 4],
    pub sun_halo: [u8; 4],
    pub text: [u8; 4],
    pub muted_text: [u8; 4],
    pub panel_background: [u8; 4],
    pub panel_border: [u8; 4],
    pub card_background: [u8; 4],
    pub selection: [u8; 4],
    pub progress_track: [u8; 4],
}

impl ThemePalette {
    pub const LIGHT: Self = Self {
        background: [0xF4, 0xF6, 0xFB, 0xFF],
        star: [0xB8, 0xC2, 0xD9, 0xFF],
        orbit: [0x9A, 0xA6, 0xC2, 0xFF],
        sun_core: [0xFF, 0xC8, 0x3D, 0xFF],
        sun_halo: [0xFF, 0xE3, 0x94, 0xFF],
        text: [0x1C, 0x22, 0x33, 0xFF],
        muted_text: [0x5A, 0x64, 0x7D, 0xFF],
        panel_background: [0xFF, 0xFF, 0xFF, 0xFF],
        panel_border: [0xC9, 0xD0, 0xE0, 0xFF],
        card_background: [0xFF, 0xFF, 0xFF, 0xFF],
        selection: [0x1C, 0x22, 0x33, 0xFF],
        progress_track: [0xDD, 0xE2, 0xEE, 0xFF],
    };

    pub const DARK: Self = Self {
        background: [0x08, 0x0B, 0x16, 0xFF],
        star: [0x4B, 0x55, 0x70, 0xFF],
        orbit: [0x3A, 0x44, 0x60, 0xFF],
        sun_core: [0xFF, 0xD2, 0x4D, 0xFF],
        sun_halo: [0x8A, 0x5A, 0x12, 0xFF],
        text: [0xE8, 0xEC, 0xF5, 0xFF],
        muted_text: [0x9A, 0xA3, 0xB8, 0xFF],
        panel_background: [0x12, 0x17, 0x26, 0xFF],
        panel_border: [0x2E, 0x37, 0x52, 0xFF],
        card_background: [0x15, 0x1B, 0x2C, 0xFF],
        selection: [0xFF, 0xFF, 0xFF, 0xFF],
        progress_track: [0x26, 0x2E, 0x44, 0xFF],
    };
}

/// Sole writer of the theme mode.
#[derive(Debug)]
pub struct ThemeController {
    mode: Arc<RwLock<ThemeMode>>,
}

/// Read-only view of the theme mode; clone freely.
#[derive(Debug, Clone)]
pub struct ThemeReader {
    mode: Arc<RwLock<ThemeMode>>,
}

impl Default for ThemeController {
    fn default() -> Self {
        Self::new(ThemeMode::default())
    }
}

impl ThemeController {
    pub fn new(initial: ThemeMode) -> Self {
        Self {
            mode: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn reader(&self) -> ThemeReader {
        ThemeReader {
            mode: Arc::clone(&self.mode),
        }
    }

    pub fn mode(&self) -> ThemeMode {
        read_mode(&self.mode)
    }

    pub fn set_mode(&self, mode: ThemeMode) {
        match self.mode.write() {
            Ok(mut guard) => *guard = mode,
            Err(poisoned) => {
                warn_theme_lock_poison_once("write");
                let mut guard = poisoned.into_inner();
                *guard = mode;
            }
        }
    }

    pub fn toggle_theme(&self) -> ThemeMode {
        let next = self.mode().toggled();
        self.set_mode(next);
        info!(mode = ?next, "theme_toggled");
        next
    }
}

impl ThemeReader {
    pub fn mode(&self) -> ThemeMode {
        read_mode(&self.mode)
    }

    pub fn is_dark(&self) -> bool {
        self.mode().is_dark()
    }

    pub fn palette(&self) -> ThemePalette {
        self.mode().palette()
    }
}

fn read_mode(lock: &RwLock<ThemeMode>) -> ThemeMode {
    match lock.read() {
        Ok(guard) => *guard,
        Err(poisoned) => {
            warn_theme_lock_poison_once("read");
            *poisoned.into_inner()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn poison_lock(lock: &RwLock<ThemeMode>) {
        thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = lock.write().expect("write guard");
                    panic!("poison theme lock");
                })
                .join();
        });
    }

    #[test]
    fn defaults_to_light_mode() {
        let controller = ThemeController::default();
        assert_eq!(controller.mode(), ThemeMode::Light);
        assert!(!controller.reader().is_dark());
    }

    #[test]
    fn toggle_is_visible_to_every_reader() {
        let controller = ThemeController::default();
        let first = controller.reader();
        let second = first.clone();

        assert_eq!(controller.toggle_theme(), ThemeMode::Dark);
        assert!(first.is_dark());
        assert_eq!(second.palette(), ThemePalette::DARK);

        controller.toggle_theme();
        assert_eq!(first.mode(), ThemeMode::Light);
    }

    #[test]
    fn parse_accepts_known_names_only() {
        assert_eq!(ThemeMode::parse(" Dark "), Some(ThemeMode::Dark));
        assert_eq!(ThemeMode::parse("light"), Some(ThemeMode::Light));
        assert_eq!(ThemeMode::parse("sepia"), None);
    }

    #[test]
    fn read_recovers_after_poison_without_panic() {
        let controller = ThemeController::new(ThemeMode::Dark);
        poison_lock(controller.mode.as_ref());

        assert_eq!(controller.reader().mode(), ThemeMode::Dark);
    }

    #[test]
    fn toggle_recovers_after_poison_without_panic() {
        let controller = ThemeController::default();
        let reader = controller.reader();
        poison_lock(controller.mode.as_ref());

        controller.toggle_theme();

        assert_eq!(reader.mode(), ThemeMode::Dark);
    }
}
