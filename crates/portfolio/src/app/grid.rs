use std::time::Duration;

use orrery::scene::Selection;
use orrery::{
    panel_rect, EntityId, InputSnapshot, OrbitingEntity, Rect, Scene, SceneCommand,
    SceneKey, Stage, StageCard, Vec2, Viewport,
};
use tracing::info;

const GRID_CAPTION: &str = "PROJECTS   TAB: ORBITS   T: THEME";
const CARD_WIDTH_PX: f64 = 300.0;
const CARD_HEIGHT_PX: f64 = 110.0;
const GRID_MARGIN_PX: f64 = 32.0;
const GRID_GAP_PX: f64 = 20.0;
const GRID_TOP_PX: f64 = 48.0;

/// Card rectangles in reading order, as many columns as fit the viewport.
fn card_rects(count: usize, viewport: Viewport) -> Vec<Rect> {
    let available = (f64::from(viewport.width) - 2.0 * GRID_MARGIN_PX).max(1.0);
    let card_width = CARD_WIDTH_PX.min(available);
    let columns = (((available + GRID_GAP_PX) / (card_width + GRID_GAP_PX)).floor() as usize).max(1);
    (0..count)
        .map(|index| {
            let column = (index % columns) as f64;
            let row = (index / columns) as f64;
            Rect::new(
                GRID_MARGIN_PX + column * (card_width + GRID_GAP_PX),
                GRID_TOP_PX + row * (CARD_HEIGHT_PX + GRID_GAP_PX),
                card_width,
                CARD_HEIGHT_PX,
            )
        })
        .collect()
}

fn card_subtitle(entity: &OrbitingEntity) -> String {
    if entity.tags.is_empty() {
        format!("{}% complete", entity.completion_percent)
    } else {
        entity.tags.join(", ")
    }
}

/// Static list view of the same projects.
pub(crate) struct GridScene {
    entities: Vec<OrbitingEntity>,
    viewport: Viewport,
    selection: Selection,
}

impl GridScene {
    pub(crate) fn new(entities: Vec<OrbitingEntity>, viewport: Viewport) -> Self {
        Self {
            entities,
            viewport,
            selection: Selection::default(),
        }
    }

    fn layout_cards(&self, stage: &mut Stage) {
        let cards = self
            .entities
            .iter()
            .zip(card_rects(self.entities.len(), self.viewport))
            .map(|(entity, rect)| StageCard {
                entity: entity.id,
                title: entity.title.clone(),
                subtitle: card_subtitle(entity),
                color: entity.accent_color.to_rgba(),
                completion_fraction: entity.completion_fraction(),
                rect,
            })
            .collect();
        stage.set_cards(cards);
    }

    fn entity(&self, id: EntityId) -> Option<&OrbitingEntity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    fn handle_click(&mut self, cursor: Vec2, viewport: Viewport, stage: &mut Stage) {
        if stage.panel().is_some() && panel_rect(viewport.width, viewport.height).contains(cursor) {
            return;
        }
        match stage.pick_card_at(cursor) {
            Some(id) => {
                self.selection.select_in(&self.entities, id, stage);
            }
            None => {
                if self.selection.selected().is_some() {
                    self.selection.deselect(stage);
                }
            }
        }
    }
}

impl Scene for GridScene {
    fn load(&mut self, _now: Duration, stage: &mut Stage) {
        self.selection = Selection::default();
        stage.set_caption(Some(GRID_CAPTION.to_string()));
        self.layout_cards(stage);
        info!(scene = "grid", card_count = stage.cards().len(), "scene_loaded");
    }

    fn update(&mut self, _now: Duration, input: &InputSnapshot, stage: &mut Stage) -> SceneCommand {
        let current = input.viewport();
        if current.width > 0 && current.height > 0 && current != self.viewport {
            self.viewport = current;
            self.layout_cards(stage);
        }

        if input.switch_scene_pressed() {
            return SceneCommand::SwitchTo(SceneKey::Solar);
        }
        if input.close_panel_pressed() {
            self.selection.deselect(stage);
        }
        if input.left_click_pressed() {
            if let Some(cursor) = input.cursor_position_px() {
                self.handle_click(cursor, current, stage);
            }
        }

        SceneCommand::None
    }

    fn unload(&mut self, _stage: &mut Stage) {
        self.selection = Selection::default();
    }

    fn title(&self) -> Option<String> {
        let title = self
            .selection
            .selected()
            .and_then(|id| self.entity(id))
            .map_or_else(|| "Projects".to_string(), |entity| entity.title.clone());
        Some(format!("Orrery | {title}"))
    }
}
