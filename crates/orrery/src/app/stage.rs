use tracing::debug;

use crate::content::OrbitingEntity;
use crate::orbit::{EntityId, OrbitGeometry, PositionSink, Vec2};
use crate::scene::DetailPanel;

/// Extra pick radius around a body so small planets stay clickable.
pub const PICK_PADDING_PX: f64 = 4.0;
pub const PANEL_WIDTH_FRACTION: f64 = 0.32;
pub const PANEL_MIN_WIDTH_PX: f64 = 220.0;
pub const PANEL_MARGIN_PX: f64 = 16.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }
}

/// Detail panel area docked to the right edge of the window.
pub fn panel_rect(viewport_width: u32, viewport_height: u32) -> Rect {
    let width = f64::from(viewport_width);
    let height = f64::from(viewport_height);
    let panel_width = (width * PANEL_WIDTH_FRACTION)
        .max(PANEL_MIN_WIDTH_PX)
        .min((width - 2.0 * PANEL_MARGIN_PX).max(0.0));
    Rect::new(
        width - panel_width - PANEL_MARGIN_PX,
        PANEL_MARGIN_PX,
        panel_width,
        (height - 2.0 * PANEL_MARGIN_PX).max(0.0),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageBody {
    pub entity: EntityId,
    pub label: String,
    pub color: [u8; 4],
    pub radius_px: f64,
    pub completion_fraction: f64,
    /// `None` until the driver first places the body.
    pub position: Option<Vec2>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageSun {
    pub center: Vec2,
    pub radius_px: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageCard {
    pub entity: EntityId,
    pub title: String,
    pub subtitle: String,
    pub color: [u8; 4],
    pub completion_fraction: f64,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelContent {
    pub entity: EntityId,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub completion_percent: u8,
    pub links: Vec<String>,
    pub color: [u8; 4],
}

impl PanelContent {
    pub fn from_entity(entity: &OrbitingEntity) -> Self {
        let links = [&entity.links.github, &entity.links.live]
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        Self {
            entity: entity.id,
            title: entity.title.clone(),
            description: entity.description.clone(),
            tags: entity.tags.clone(),
            completion_percent: entity.completion_percent,
            links,
            color: entity.accent_color.to_rgba(),
        }
    }
}

/// Everything the renderer draws for the active scene. Scenes write it, the
/// renderer only reads it.
#[derive(Debug, Default)]
pub struct Stage {
    sun: Option<StageSun>,
    orbits: Vec<OrbitGeometry>,
    bodies: Vec<StageBody>,
    cards: Vec<StageCard>,
    panel: Option<PanelContent>,
    selected: Option<EntityId>,
    caption: Option<String>,
    position_writes: u64,
}

impl Stage {
    pub fn clear(&mut self) {
        self.sun = None;
        self.orbits.clear();
        self.bodies.clear();
        self.cards.clear();
        self.panel = None;
        self.selected = None;
        self.caption = None;
    }

    pub fn sun(&self) -> Option<StageSun> {
        self.sun
    }

    pub fn set_sun(&mut self, sun: Option<StageSun>) {
        self.sun = sun;
    }

    pub fn orbits(&self) -> &[OrbitGeometry] {
        &self.orbits
    }

    pub fn set_orbits(&mut self, orbits: Vec<OrbitGeometry>) {
        self.orbits = orbits;
    }

    pub fn bodies(&self) -> &[StageBody] {
        &self.bodies
    }

    pub fn body(&self, entity: EntityId) -> Option<&StageBody> {
        self.bodies.iter().find(|body| body.entity == entity)
    }

    /// Inserts or replaces a body, keeping the existing position when replacing.
    pub fn upsert_body(&mut self, mut body: StageBody) {
        match self
            .bodies
            .iter_mut()
            .find(|existing| existing.entity == body.entity)
        {
            Some(existing) => {
                if body.position.is_none() {
                    body.position = existing.position;
                }
                *existing = body;
            }
            None => self.bodies.push(body),
        }
    }

    /// Topmost placed body under the cursor. Later bodies draw over earlier ones.
    pub fn pick_body_at(&self, cursor: Vec2) -> Option<EntityId> {
        self.bodies
            .iter()
            .rev()
            .filter_map(|body| body.position.map(|position| (body, position)))
            .find(|(body, position)| {
                let reach = body.radius_px + PICK_PADDING_PX;
                position.distance_squared(cursor) <= reach * reach
            })
            .map(|(body, _)| body.entity)
    }

    pub fn cards(&self) -> &[StageCard] {
        &self.cards
    }

    pub fn set_cards(&mut self, cards: Vec<StageCard>) {
        self.cards = cards;
    }

    pub fn pick_card_at(&self, cursor: Vec2) -> Option<EntityId> {
        self.cards
            .iter()
            .rev()
            .find(|card| card.rect.contains(cursor))
            .map(|card| card.entity)
    }

    pub fn panel(&self) -> Option<&PanelContent> {
        self.panel.as_ref()
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn set_caption(&mut self, caption: Option<String>) {
        self.caption = caption;
    }

    /// Total position writes received, across clears.
    pub fn position_writes(&self) -> u64 {
        self.position_writes
    }
}

impl PositionSink for Stage {
    fn set_position(&mut self, entity: EntityId, x: f64, y: f64) {
        match self.bodies.iter_mut().find(|body| body.entity == entity) {
            Some(body) => {
                body.position = Some(Vec2::new(x, y));
                self.position_writes = self.position_writes.saturating_add(1);
            }
            None => debug!(entity = entity.0, "position_for_unknown_body_dropped"),
        }
    }
}

impl DetailPanel for Stage {
    fn show(&mut self, entity: Option<&OrbitingEntity>) {
        self.panel = entity.map(PanelContent::from_entity);
        self.selected = entity.map(|entity| entity.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::sample_catalog;

    fn body(entity: u64, radius_px: f64) -> StageBody {
        StageBody {
            entity: EntityId(entity),
            label: format!("body {entity}"),
            color: [255, 255, 255, 255],
            radius_px,
            completion_fraction: 0.5,
            position: None,
        }
    }

    #[test]
    fn position_writes_land_on_known_bodies_only() {
        let mut stage = Stage::default();
        stage.upsert_body(body(1, 10.0));

        stage.set_position(EntityId(1), 30.0, 40.0);
        stage.set_position(EntityId(2), 1.0, 1.0);

        assert_eq!(
            stage.body(EntityId(1)).and_then(|b| b.position),
            Some(Vec2::new(30.0, 40.0))
        );
        assert_eq!(stage.position_writes(), 1);
    }

    #[test]
    fn pick_prefers_topmost_overlapping_body() {
        let mut stage = Stage::default();
        stage.upsert_body(body(1, 10.0));
        stage.upsert_body(body(2, 10.0));
        stage.set_position(EntityId(1), 100.0, 100.0);
        stage.set_position(EntityId(2), 108.0, 100.0);

        assert_eq!(stage.pick_body_at(Vec2::new(104.0, 100.0)), Some(EntityId(2)));
        assert_eq!(stage.pick_body_at(Vec2::new(88.0, 100.0)), Some(EntityId(1)));
        assert_eq!(stage.pick_body_at(Vec2::new(300.0, 300.0)), None);
    }

    #[test]
    fn unplaced_bodies_are_not_pickable() {
        let mut stage = Stage::default();
        stage.upsert_body(body(1, 50.0));
        assert_eq!(stage.pick_body_at(Vec2::new(0.0, 0.0)), None);
    }

    #[test]
    fn upsert_keeps_position_of_existing_body() {
        let mut stage = Stage::default();
        stage.upsert_body(body(1, 10.0));
        stage.set_position(EntityId(1), 5.0, 6.0);

        stage.upsert_body(body(1, 20.0));

        let placed = stage.body(EntityId(1)).expect("body");
        assert_eq!(placed.position, Some(Vec2::new(5.0, 6.0)));
        assert_eq!(placed.radius_px, 20.0);
        assert_eq!(stage.bodies().len(), 1);
    }

    #[test]
    fn panel_shows_full_record_and_clears() {
        let catalog = sample_catalog();
        let entity = &catalog.entities()[0];
        let mut stage = Stage::default();

        stage.show(Some(entity));
        let panel = stage.panel().expect("panel");
        assert_eq!(panel.title, entity.title);
        assert_eq!(panel.completion_percent, 45);
        assert_eq!(panel.links.len(), 2);
        assert_eq!(stage.selected(), Some(entity.id));

        stage.show(None);
        assert!(stage.panel().is_none());
        assert!(stage.selected().is_none());
    }

    #[test]
    fn card_pick_uses_rect_bounds() {
        let mut stage = Stage::default();
        stage.set_cards(vec![StageCard {
            entity: EntityId(4),
            title: "card".to_string(),
            subtitle: String::new(),
            color: [0, 0, 0, 255],
            completion_fraction: 0.1,
            rect: Rect::new(10.0, 10.0, 100.0, 50.0),
        }]);

        assert_eq!(stage.pick_card_at(Vec2::new(10.0, 10.0)), Some(EntityId(4)));
        assert_eq!(stage.pick_card_at(Vec2::new(110.0, 30.0)), None);
    }

    #[test]
    fn panel_rect_docks_right_and_fits_small_windows() {
        let rect = panel_rect(1000, 600);
        assert!((rect.x + rect.width - (1000.0 - PANEL_MARGIN_PX)).abs() < 1e-9);
        assert!((rect.width - 320.0).abs() < 1e-9);

        let tiny = panel_rect(100, 20);
        assert!(tiny.width >= 0.0);
        assert!(tiny.height >= 0.0);
        assert!(tiny.x >= 0.0);
    }

    #[test]
    fn clear_keeps_write_counter() {
        let mut stage = Stage::default();
        stage.upsert_body(body(1, 10.0));
        stage.set_position(EntityId(1), 1.0, 1.0);

        stage.clear();

        assert!(stage.bodies().is_empty());
        assert_eq!(stage.position_writes(), 1);
    }
}
