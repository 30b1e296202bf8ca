use tracing::{debug, info};

use crate::content::OrbitingEntity;
use crate::orbit::EntityId;

/// Receives the selected record, or `None` when the selection is cleared.
pub trait DetailPanel {
    fn show(&mut self, entity: Option<&OrbitingEntity>);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<EntityId>,
}

impl Selection {
    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    pub fn is_selected(&self, entity: EntityId) -> bool {
        self.selected == Some(entity)
    }

    /// Returns the previously selected id.
    pub fn set(&mut self, entity: EntityId) -> Option<EntityId> {
        self.selected.replace(entity)
    }

    pub fn clear(&mut self) -> Option<EntityId> {
        self.selected.take()
    }

    /// Selects `id` among `entities` and hands its record to `panel`.
    /// Unknown ids leave the selection and the panel untouched.
    pub fn select_in(
        &mut self,
        entities: &[OrbitingEntity],
        id: EntityId,
        panel: &mut impl DetailPanel,
    ) -> bool {
        let Some(entity) = entities.iter().find(|entity| entity.id == id) else {
            debug!(entity = id.0, "select_unknown_entity_ignored");
            return false;
        };
        self.set(id);
        panel.show(Some(entity));
        info!(entity = id.0, slug = %entity.slug, "entity_selected");
        true
    }

    /// Clears the selection and closes the panel.
    pub fn deselect(&mut self, panel: &mut impl DetailPanel) {
        if let Some(previous) = self.clear() {
            debug!(entity = previous.0, "entity_deselected");
        }
        panel.show(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_previous_selection() {
        let mut selection = Selection::default();
        assert_eq!(selection.set(EntityId(1)), None);
        assert_eq!(selection.set(EntityId(2)), Some(EntityId(1)));
        assert!(selection.is_selected(EntityId(2)));
        assert!(!selection.is_selected(EntityId(1)));
    }

    #[derive(Default)]
    struct RecordingPanel {
        shown: Vec<Option<EntityId>>,
    }

    impl DetailPanel for RecordingPanel {
        fn show(&mut self, entity: Option<&OrbitingEntity>) {
            self.shown.push(entity.map(|entity| entity.id));
        }
    }

    #[test]
    fn select_in_hands_record_to_panel_and_ignores_unknown_ids() {
        let entities = crate::content::sample_catalog().into_entities();
        let target = entities[1].id;
        let mut selection = Selection::default();
        let mut panel = RecordingPanel::default();

        assert!(selection.select_in(&entities, target, &mut panel));
        assert!(!selection.select_in(&entities, EntityId(999), &mut panel));

        assert_eq!(selection.selected(), Some(target));
        assert_eq!(panel.shown, vec![Some(target)]);

        selection.deselect(&mut panel);
        assert_eq!(selection.selected(), None);
        assert_eq!(panel.shown, vec![Some(target), None]);
    }

    #[test]
    fn clear_returns_and_forgets_selection() {
        let mut selection = Selection::default();
        selection.set(EntityId(3));
        assert_eq!(selection.clear(), Some(EntityId(3)));
        assert_eq!(selection.clear(), None);
        assert_eq!(selection.selected(), None);
    }
}
