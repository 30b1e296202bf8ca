use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use super::raster::Canvas;
use super::text::{draw_text, line_advance, text_width, truncate_to_width, wrap_text};
use crate::app::frame_stats::FrameStatsSnapshot;
use crate::app::stage::{panel_rect, PanelContent, Stage, StageBody, StageCard};
use crate::scene::Viewport;
use crate::theme::{ThemePalette, ThemeReader};

const STAR_COUNT: usize = 140;
const STAR_SEED: u64 = 0x5EED_0F_0A_B175;
const ORBIT_DASH_DEGREES: f64 = 2.5;
const ORBIT_GAP_DEGREES: f64 = 2.0;
const SUN_HALO_SCALE: f64 = 1.45;
const PROGRESS_RING_GAP_PX: f64 = 3.0;
const PROGRESS_RING_THICKNESS_PX: f64 = 2.5;
const SELECTION_RING_GAP_PX: f64 = 8.0;
const LABEL_SCALE: i32 = 2;
const LABEL_MAX_WIDTH_PX: i32 = 180;
const CARD_TITLE_SCALE: i32 = 2;
const CARD_PADDING_PX: i32 = 12;
const CARD_ACCENT_WIDTH_PX: i32 = 6;
const PANEL_TITLE_SCALE: i32 = 3;
const PANEL_BODY_SCALE: i32 = 2;
const PANEL_PADDING_PX: i32 = 18;
const PROGRESS_BAR_HEIGHT_PX: i32 = 8;
const HUD_SCALE: i32 = 2;
const HUD_MARGIN_PX: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Star {
    x_fraction: f64,
    y_fraction: f64,
    size_px: i32,
}

/// Same starfield on every run; positions are viewport fractions.
fn starfield(count: usize, seed: u64) -> Vec<Star> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    (0..count)
        .map(|_| Star {
            x_fraction: next(),
            y_fraction: next(),
            size_px: if next() > 0.85 { 2 } else { 1 },
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HudData {
    pub stats: FrameStatsSnapshot,
    pub render_fps_cap: Option<u32>,
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    theme: ThemeReader,
    stars: Vec<Star>,
}

impl Renderer {
    pub fn new(window: Arc<Window>, theme: ThemeReader) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport::new(size.width, size.height),
            theme,
            stars: starfield(STAR_COUNT, STAR_SEED),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport::new(width, height);
        Ok(())
    }

    fn build_pixels(window: Arc<Window>, width: u32, height: u32) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub(crate) fn render_stage(&mut self, stage: &Stage, hud: Option<&HudData>) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }
        let palette = self.theme.palette();
        let (width, height) = (self.viewport.width, self.viewport.height);
        let mut canvas = Canvas::new(self.pixels.frame_mut(), width, height);
        draw_stage(&mut canvas, stage, &palette, &self.stars);
        if let Some(hud) = hud {
            draw_hud(&mut canvas, hud, &palette);
        }
        self.pixels.render()
    }
}

fn draw_stage(canvas: &mut Canvas<'_>, stage: &Stage, palette: &ThemePalette, stars: &[Star]) {
    canvas.clear(palette.background);
    draw_stars(canvas, stars, palette.star);

    for orbit in stage.orbits() {
        canvas.draw_dashed_ellipse(orbit, ORBIT_DASH_DEGREES, ORBIT_GAP_DEGREES, palette.orbit);
    }

    if let Some(sun) = stage.sun() {
        canvas.draw_filled_circle(
            sun.center.x,
            sun.center.y,
            sun.radius_px * SUN_HALO_SCALE,
            with_alpha(palette.sun_halo, 150),
        );
        canvas.draw_filled_circle(sun.center.x, sun.center.y, sun.radius_px, palette.sun_core);
    }

    for body in stage.bodies() {
        draw_body(canvas, body, stage.selected() == Some(body.entity), palette);
    }

    for card in stage.cards() {
        draw_card(canvas, card, stage.selected() == Some(card.entity), palette);
    }

    if let Some(caption) = stage.caption() {
        let y = canvas.height() as i32 - line_advance(LABEL_SCALE) - HUD_MARGIN_PX;
        draw_text(canvas, HUD_MARGIN_PX, y, caption, LABEL_SCALE, palette.muted_text);
    }

    if let Some(panel) = stage.panel() {
        draw_panel(canvas, panel, palette);
    }
}

fn draw_stars(canvas: &mut Canvas<'_>, stars: &[Star], color: [u8; 4]) {
    let (width, height) = (f64::from(canvas.width()), f64::from(canvas.height()));
    for star in stars {
        let x = (star.x_fraction * width) as i32;
        let y = (star.y_fraction * height) as i32;
        canvas.draw_filled_rect(x, y, star.size_px, star.size_px, color);
    }
}

fn draw_body(canvas: &mut Canvas<'_>, body: &StageBody, selected: bool, palette: &ThemePalette) {
    let Some(position) = body.position else {
        return;
    };
    let ring_radius = body.radius_px + PROGRESS_RING_GAP_PX + PROGRESS_RING_THICKNESS_PX;
    canvas.draw_ring(
        position.x,
        position.y,
        ring_radius,
        PROGRESS_RING_THICKNESS_PX,
        palette.progress_track,
    );
    let sweep = 360.0 * body.completion_fraction.clamp(0.0, 1.0);
    canvas.draw_arc(
        position.x,
        position.y,
        ring_radius,
        PROGRESS_RING_THICKNESS_PX,
        -90.0,
        sweep,
        body.color,
    );
    canvas.draw_filled_circle(position.x, position.y, body.radius_px, body.color);

    if selected {
        canvas.draw_ring(
            position.x,
            position.y,
            ring_radius + SELECTION_RING_GAP_PX,
            2.0,
            palette.selection,
        );
    }

    let label = truncate_to_width(&body.label, LABEL_MAX_WIDTH_PX, LABEL_SCALE);
    let label_x = position.x.round() as i32 - text_width(&label, LABEL_SCALE) / 2;
    let label_y = (position.y + ring_radius).round() as i32 + 6;
    draw_text(canvas, label_x, label_y, &label, LABEL_SCALE, palette.text);
}

fn draw_progress_bar(
    canvas: &mut Canvas<'_>,
    (x, y, width): (i32, i32, i32),
    fraction: f64,
    fill: [u8; 4],
    track: [u8; 4],
) {
    canvas.draw_filled_rect(x, y, width, PROGRESS_BAR_HEIGHT_PX, track);
    let filled = (f64::from(width) * fraction.clamp(0.0, 1.0)).round() as i32;
    canvas.draw_filled_rect(x, y, filled, PROGRESS_BAR_HEIGHT_PX, fill);
}

fn draw_card(canvas: &mut Canvas<'_>, card: &StageCard, selected: bool, palette: &ThemePalette) {
    let x = card.rect.x.round() as i32;
    let y = card.rect.y.round() as i32;
    let width = card.rect.width.round() as i32;
    let height = card.rect.height.round() as i32;

    canvas.draw_filled_rect(x, y, width, height, palette.card_background);
    canvas.draw_filled_rect(x, y, CARD_ACCENT_WIDTH_PX, height, card.color);
    let border = if selected {
        palette.selection
    } else {
        palette.panel_border
    };
    canvas.draw_rect_outline(x, y, width, height, border);

    let inner_x = x + CARD_ACCENT_WIDTH_PX + CARD_PADDING_PX;
    let inner_width = width - CARD_ACCENT_WIDTH_PX - 2 * CARD_PADDING_PX;
    let mut cursor_y = y + CARD_PADDING_PX;
    let title = truncate_to_width(&card.title, inner_width, CARD_TITLE_SCALE);
    draw_text(canvas, inner_x, cursor_y, &title, CARD_TITLE_SCALE, palette.text);
    cursor_y += line_advance(CARD_TITLE_SCALE);

    let subtitle = truncate_to_width(&card.subtitle, inner_width, 1);
    draw_text(canvas, inner_x, cursor_y, &subtitle, 1, palette.muted_text);

    let bar_y = y + height - CARD_PADDING_PX - PROGRESS_BAR_HEIGHT_PX;
    draw_progress_bar(
        canvas,
        (inner_x, bar_y, inner_width),
        card.completion_fraction,
        card.color,
        palette.progress_track,
    );
}

fn draw_panel(canvas: &mut Canvas<'_>, panel: &PanelContent, palette: &ThemePalette) {
    let rect = panel_rect(canvas.width(), canvas.height());
    let x = rect.x.round() as i32;
    let y = rect.y.round() as i32;
    let width = rect.width.round() as i32;
    let height = rect.height.round() as i32;
    if width <= 2 * PANEL_PADDING_PX || height <= 2 * PANEL_PADDING_PX {
        return;
    }

    canvas.draw_filled_rect(x, y, width, height, palette.panel_background);
    canvas.draw_filled_rect(x, y, width, 6, panel.color);
    canvas.draw_rect_outline(x, y, width, height, palette.panel_border);

    let inner_x = x + PANEL_PADDING_PX;
    let inner_width = width - 2 * PANEL_PADDING_PX;
    let bottom = y + height - PANEL_PADDING_PX;
    let mut cursor_y = y + PANEL_PADDING_PX + 6;

    for line in wrap_text(&panel.title, inner_width, PANEL_TITLE_SCALE) {
        draw_text(canvas, inner_x, cursor_y, &line, PANEL_TITLE_SCALE, palette.text);
        cursor_y += line_advance(PANEL_TITLE_SCALE);
    }
    cursor_y += line_advance(1);

    let progress = format!("{}% COMPLETE", panel.completion_percent);
    draw_text(canvas, inner_x, cursor_y, &progress, PANEL_BODY_SCALE, panel.color);
    cursor_y += line_advance(PANEL_BODY_SCALE);
    draw_progress_bar(
        canvas,
        (inner_x, cursor_y, inner_width),
        f64::from(panel.completion_percent) / 100.0,
        panel.color,
        palette.progress_track,
    );
    cursor_y += PROGRESS_BAR_HEIGHT_PX + line_advance(PANEL_BODY_SCALE);

    let mut body_lines = wrap_text(&panel.description, inner_width, PANEL_BODY_SCALE);
    if !panel.tags.is_empty() {
        body_lines.push(String::new());
        body_lines.extend(wrap_text(
            &format!("STACK: {}", panel.tags.join(", ")),
            inner_width,
            PANEL_BODY_SCALE,
        ));
    }
    if !panel.links.is_empty() {
        body_lines.push(String::new());
        for link in &panel.links {
            body_lines.push(truncate_to_width(link, inner_width, PANEL_BODY_SCALE));
        }
    }

    let hint_y = bottom - line_advance(PANEL_BODY_SCALE);
    for line in body_lines {
        if cursor_y + line_advance(PANEL_BODY_SCALE) > hint_y {
            break;
        }
        draw_text(canvas, inner_x, cursor_y, &line, PANEL_BODY_SCALE, palette.text);
        cursor_y += line_advance(PANEL_BODY_SCALE);
    }
    draw_text(
        canvas,
        inner_x,
        hint_y,
        "ESC TO CLOSE",
        PANEL_BODY_SCALE,
        palette.muted_text,
    );
}

fn draw_hud(canvas: &mut Canvas<'_>, hud: &HudData, palette: &ThemePalette) {
    let mut line = format!(
        "FPS {:.0}  {:.1} MS  WRITES {:.0}/S",
        hud.stats.fps, hud.stats.frame_time_ms, hud.stats.position_writes_per_second
    );
    if let Some(cap) = hud.render_fps_cap {
        line.push_str(&format!("  CAP {cap}"));
    }
    draw_text(canvas, HUD_MARGIN_PX, HUD_MARGIN_PX, &line, HUD_SCALE, palette.muted_text);
}

fn with_alpha(color: [u8; 4], alpha: u8) -> [u8; 4] {
    [color[0], color[1], color[2], alpha]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::sample_catalog;
    use crate::orbit::{EntityId, OrbitGeometry, PositionSink, Vec2};
    use crate::scene::DetailPanel;

    const WIDTH: u32 = 320;
    const HEIGHT: u32 = 200;

    fn body(entity: u64, color: [u8; 4]) -> StageBody {
        StageBody {
            entity: EntityId(entity),
            label: "P".to_string(),
            color,
            radius_px: 8.0,
            completion_fraction: 0.5,
            position: None,
        }
    }

    fn render(stage: &Stage, palette: &ThemePalette) -> Vec<u8> {
        let mut frame = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
        let mut canvas = Canvas::new(&mut frame, WIDTH, HEIGHT);
        draw_stage(&mut canvas, stage, palette, &[]);
        frame
    }

    fn pixel(frame: &[u8], x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * WIDTH + x) * 4) as usize;
        [frame[offset], frame[offset + 1], frame[offset + 2], frame[offset + 3]]
    }

    #[test]
    fn starfield_is_deterministic_and_in_unit_range() {
        let first = starfield(32, 7);
        assert_eq!(first, starfield(32, 7));
        assert_ne!(first, starfield(32, 8));
        for star in &first {
            assert!((0.0..1.0).contains(&star.x_fraction));
            assert!((0.0..1.0).contains(&star.y_fraction));
        }
    }

    #[test]
    fn background_follows_theme() {
        let stage = Stage::default();
        let light = render(&stage, &ThemePalette::LIGHT);
        let dark = render(&stage, &ThemePalette::DARK);
        assert_eq!(pixel(&light, 0, 0), ThemePalette::LIGHT.background);
        assert_eq!(pixel(&dark, 0, 0), ThemePalette::DARK.background);
    }

    #[test]
    fn placed_body_is_drawn_at_its_position() {
        let accent = [10, 200, 30, 255];
        let mut stage = Stage::default();
        stage.upsert_body(body(1, accent));
        stage.set_position(EntityId(1), 100.0, 80.0);

        let frame = render(&stage, &ThemePalette::DARK);

        assert_eq!(pixel(&frame, 100, 80), accent);
    }

    #[test]
    fn unplaced_body_is_not_drawn() {
        let accent = [10, 200, 30, 255];
        let mut stage = Stage::default();
        stage.upsert_body(body(1, accent));

        let frame = render(&stage, &ThemePalette::DARK);

        assert!(frame.chunks_exact(4).all(|px| px != accent));
    }

    #[test]
    fn orbit_path_is_drawn_in_orbit_color() {
        let mut stage = Stage::default();
        stage.set_orbits(vec![OrbitGeometry::new(Vec2::new(160.0, 100.0), 60.0, 42.0)]);

        let frame = render(&stage, &ThemePalette::LIGHT);

        assert_eq!(pixel(&frame, 220, 100), ThemePalette::LIGHT.orbit);
    }

    #[test]
    fn selected_entity_opens_panel_on_right() {
        let catalog = sample_catalog();
        let mut stage = Stage::default();
        stage.show(Some(&catalog.entities()[0]));

        let frame = render(&stage, &ThemePalette::LIGHT);
        let rect = panel_rect(WIDTH, HEIGHT);
        let inside_x = (rect.x + rect.width - 3.0) as u32;
        let inside_y = (rect.y + rect.height - 3.0) as u32;

        assert_eq!(pixel(&frame, inside_x, inside_y), ThemePalette::LIGHT.panel_background);
        assert_eq!(pixel(&frame, 2, 2), ThemePalette::LIGHT.background);
    }

    #[test]
    fn tiny_viewports_never_panic() {
        let catalog = sample_catalog();
        let mut stage = Stage::default();
        stage.upsert_body(body(1, [1, 2, 3, 255]));
        stage.set_position(EntityId(1), -50.0, 5000.0);
        stage.show(Some(&catalog.entities()[1]));
        stage.set_caption(Some("caption".to_string()));
        for (width, height) in [(1, 1), (2, 3), (17, 9)] {
            let mut frame = vec![0u8; (width * height * 4) as usize];
            let mut canvas = Canvas::new(&mut frame, width, height);
            draw_stage(&mut canvas, &stage, &ThemePalette::DARK, &starfield(4, 1));
            draw_hud(&mut canvas, &HudData::default(), &ThemePalette::DARK);
        }
    }
}
