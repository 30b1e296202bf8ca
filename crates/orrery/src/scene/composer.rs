use std::time::Duration;

use tracing::{info, warn};

use super::layout::{compute_layout, LayoutGeneration, LayoutPolicy, SceneLayout, Viewport};
use super::selection::{DetailPanel, Selection};
use super::slots::{assign_slot_angles_with_overrides, SlotPolicy};
use crate::content::OrbitingEntity;
use crate::orbit::{
    completion_to_angle, AnimationMode, Easing, EntityId, TrackBinding, DEFAULT_STAGGER_STEP,
    FULL_TURN_DEGREES, PROGRESS_START_DEGREES,
};

/// Orbit period of ring 1 when content gives no speed.
pub const BASE_ORBIT_PERIOD: Duration = Duration::from_secs(40);
/// Extra period per ring outward.
pub const RING_PERIOD_STEP: Duration = Duration::from_secs(15);
pub const PROGRESS_SWEEP_DURATION: Duration = Duration::from_millis(1_200);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrbitMotion {
    #[default]
    Perpetual,
    /// Each body sweeps from the top of its orbit to its completion angle and rests there.
    Progress,
}

impl OrbitMotion {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "perpetual" | "orbit" | "continuous" => Some(Self::Perpetual),
            "progress" => Some(Self::Progress),
            _ => None,
        }
    }
}

pub fn default_angular_speed(orbit_ring: u32) -> f64 {
    let ring_index = orbit_ring.max(1) - 1;
    let period = BASE_ORBIT_PERIOD + RING_PERIOD_STEP * ring_index;
    FULL_TURN_DEGREES / period.as_secs_f64()
}

/// Owns the entities of one orbit view, their slots, the published layout and the selection.
#[derive(Debug)]
pub struct SceneComposer {
    entities: Vec<OrbitingEntity>,
    slot_angles: Vec<f64>,
    layout_policy: LayoutPolicy,
    layout: SceneLayout,
    selection: Selection,
}

impl SceneComposer {
    pub fn new(entities: Vec<OrbitingEntity>, viewport: Viewport) -> Self {
        Self::with_policies(
            entities,
            viewport,
            &SlotPolicy::default(),
            LayoutPolicy::default(),
        )
    }

    pub fn with_policies(
        entities: Vec<OrbitingEntity>,
        viewport: Viewport,
        slot_policy: &SlotPolicy,
        layout_policy: LayoutPolicy,
    ) -> Self {
        let overrides = entities
            .iter()
            .map(|entity| entity.phase_offset_degrees)
            .collect::<Vec<_>>();
        let slot_angles = assign_slot_angles_with_overrides(&overrides, slot_policy);
        let layout = compute_layout(&entities, viewport, &layout_policy);
        Self {
            entities,
            slot_angles,
            layout_policy,
            layout,
            selection: Selection::default(),
        }
    }

    pub fn entities(&self) -> &[OrbitingEntity] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&OrbitingEntity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn slot_angle(&self, id: EntityId) -> Option<f64> {
        self.entities
            .iter()
            .position(|entity| entity.id == id)
            .and_then(|index| self.slot_angles.get(index).copied())
    }

    pub fn slot_angles(&self) -> &[f64] {
        &self.slot_angles
    }

    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected_entity(&self) -> Option<&OrbitingEntity> {
        self.selection.selected().and_then(|id| self.entity(id))
    }

    pub fn select(&mut self, id: EntityId, panel: &mut impl DetailPanel) -> bool {
        self.selection.select_in(&self.entities, id, panel)
    }

    pub fn deselect(&mut self, panel: &mut impl DetailPanel) {
        self.selection.deselect(panel);
    }

    /// Swaps in `layout` unless it is older than the current one.
    pub fn publish_layout(&mut self, layout: SceneLayout) -> bool {
        if layout.generation < self.layout.generation {
            warn!(
                stale = layout.generation.0,
                current = self.layout.generation.0,
                "stale_layout_discarded"
            );
            return false;
        }
        info!(
            generation = layout.generation.0,
            width = layout.viewport.width,
            height = layout.viewport.height,
            "layout_published"
        );
        self.layout = layout;
        true
    }

    pub fn relayout(&mut self, viewport: Viewport, generation: LayoutGeneration) -> bool {
        let layout =
            compute_layout(&self.entities, viewport, &self.layout_policy).with_generation(generation);
        self.publish_layout(layout)
    }

    pub fn bindings(&self, motion: OrbitMotion) -> Vec<TrackBinding> {
        self.entities
            .iter()
            .zip(&self.slot_angles)
            .enumerate()
            .filter_map(|(index, (entity, slot_angle))| {
                let geometry = self.layout.geometry_for(entity.id)?;
                let mode = match motion {
                    OrbitMotion::Perpetual => AnimationMode::ContinuousCycle {
                        degrees_per_second: entity
                            .angular_speed_degrees_per_second
                            .unwrap_or_else(|| default_angular_speed(entity.orbit_ring)),
                    },
                    OrbitMotion::Progress => AnimationMode::AnimateToTarget {
                        from_degrees: PROGRESS_START_DEGREES,
                        to_degrees: completion_to_angle(entity.completion_percent),
                        duration: PROGRESS_SWEEP_DURATION,
                        easing: Easing::EaseOutCubic,
                    },
                };
                Some(TrackBinding {
                    entity: entity.id,
                    geometry,
                    phase_offset_degrees: *slot_angle,
                    mode,
                    stagger: DEFAULT_STAGGER_STEP * u32::try_from(index).unwrap_or(u32::MAX),
                })
            })
            .collect()
    }

    /// Drops an entity. Clears the panel when the removed entity was selected.
    pub fn remove_entity(&mut self, id: EntityId, panel: &mut impl DetailPanel) -> bool {
        let Some(index) = self.entities.iter().position(|entity| entity.id == id) else {
            return false;
        };
        self.entities.remove(index);
        if index < self.slot_angles.len() {
            self.slot_angles.remove(index);
        }
        self.layout.entries.retain(|entry| entry.entity != id);
        if self.selection.is_selected(id) {
            self.deselect(panel);
        }
        info!(entity = id.0, remaining = self.entities.len(), "entity_removed");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::sample_catalog;

    #[derive(Debug, Default)]
    struct PanelSpy {
        shown: Vec<Option<String>>,
    }

    impl DetailPanel for PanelSpy {
        fn show(&mut self, entity: Option<&OrbitingEntity>) {
            self.shown.push(entity.map(|entity| entity.slug.clone()));
        }
    }

    fn composer() -> SceneComposer {
        SceneComposer::new(
            sample_catalog().into_entities(),
            Viewport::new(1280, 720),
        )
    }

    #[test]
    fn select_hands_full_record_to_panel() {
        let mut composer = composer();
        let mut panel = PanelSpy::default();
        let target = composer.entities()[2].id;

        assert!(composer.select(target, &mut panel));

        assert_eq!(composer.selection().selected(), Some(target));
        let selected = composer.selected_entity().expect("selected entity");
        assert_eq!(selected.title, "AI Content Generator");
        assert_eq!(panel.shown, vec![Some(selected.slug.clone())]);
    }

    #[test]
    fn unknown_id_leaves_selection_untouched() {
        let mut composer = composer();
        let mut panel = PanelSpy::default();
        let first = composer.entities()[0].id;
        composer.select(first, &mut panel);

        assert!(!composer.select(EntityId(999), &mut panel));
        assert_eq!(composer.selection().selected(), Some(first));
        assert_eq!(panel.shown.len(), 1);
    }

    #[test]
    fn deselect_clears_panel() {
        let mut composer = composer();
        let mut panel = PanelSpy::default();
        composer.select(composer.entities()[0].id, &mut panel);

        composer.deselect(&mut panel);

        assert!(composer.selected_entity().is_none());
        assert_eq!(panel.shown.last(), Some(&None));
    }

    #[test]
    fn sample_scene_uses_canonical_slots() {
        let composer = composer();
        let expected = [300.0, 320.0, 340.0, 0.0, 20.0];
        for (actual, expected) in composer.slot_angles().iter().zip(expected) {
            assert!((actual - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn stale_layout_is_discarded() {
        let mut composer = composer();
        assert!(composer.relayout(Viewport::new(800, 600), LayoutGeneration(3)));
        assert!(!composer.relayout(Viewport::new(1920, 1080), LayoutGeneration(2)));

        assert_eq!(composer.layout().generation, LayoutGeneration(3));
        assert_eq!(composer.layout().viewport, Viewport::new(800, 600));
    }

    #[test]
    fn perpetual_bindings_stagger_and_slow_outer_rings() {
        let composer = composer();
        let bindings = composer.bindings(OrbitMotion::Perpetual);
        assert_eq!(bindings.len(), 5);

        let speeds = bindings
            .iter()
            .map(|binding| match binding.mode {
                AnimationMode::ContinuousCycle { degrees_per_second } => degrees_per_second,
                other => panic!("unexpected mode {other:?}"),
            })
            .collect::<Vec<_>>();
        assert!(speeds.windows(2).all(|pair| pair[0] > pair[1]));
        assert!((speeds[0] - 9.0).abs() < 1e-9);

        assert_eq!(bindings[0].stagger, Duration::ZERO);
        assert_eq!(bindings[3].stagger, Duration::from_millis(300));
        assert!((bindings[3].phase_offset_degrees - 0.0).abs() < 1e-9);
    }

    #[test]
    fn progress_bindings_target_completion_angle() {
        let composer = composer();
        let bindings = composer.bindings(OrbitMotion::Progress);
        let first = composer.entities()[0].completion_percent;

        match bindings[0].mode {
            AnimationMode::AnimateToTarget {
                from_degrees,
                to_degrees,
                duration,
                ..
            } => {
                assert!((from_degrees - 270.0).abs() < 1e-9);
                assert!((to_degrees - completion_to_angle(first)).abs() < 1e-9);
                assert_eq!(duration, PROGRESS_SWEEP_DURATION);
            }
            other => panic!("unexpected mode {other:?}"),
        }
    }

    #[test]
    fn removing_selected_entity_clears_panel() {
        let mut composer = composer();
        let mut panel = PanelSpy::default();
        let target = composer.entities()[1].id;
        composer.select(target, &mut panel);

        assert!(composer.remove_entity(target, &mut panel));

        assert_eq!(composer.entities().len(), 4);
        assert_eq!(composer.slot_angles().len(), 4);
        assert!(composer.layout().geometry_for(target).is_none());
        assert!(composer.selection().selected().is_none());
        assert_eq!(panel.shown.last(), Some(&None));
        assert!(!composer.remove_entity(target, &mut panel));
    }

    #[test]
    fn motion_names_parse() {
        assert_eq!(OrbitMotion::parse(" Progress "), Some(OrbitMotion::Progress));
        assert_eq!(OrbitMotion::parse("perpetual"), Some(OrbitMotion::Perpetual));
        assert_eq!(OrbitMotion::parse("sideways"), None);
    }
}
