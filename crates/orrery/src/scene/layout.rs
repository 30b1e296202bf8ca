use crate::content::OrbitingEntity;
use crate::orbit::{EntityId, OrbitGeometry, Vec2, MIN_ORBIT_RADIUS};

/// Monotonic layout counter; larger is newer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayoutGeneration(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Proportions of the solar scene relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPolicy {
    pub center_x_fraction: f64,
    pub center_y_fraction: f64,
    /// Horizontal radius of ring 1 as a fraction of viewport height.
    pub inner_radius_fraction: f64,
    pub ring_spacing_fraction: f64,
    /// `radius_y = radius_x * vertical_compression` when not given explicitly.
    pub vertical_compression: f64,
    /// Height that explicit content radii are authored against.
    pub reference_height: f64,
    pub sun_radius_fraction: f64,
    pub body_radius_fraction: f64,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        Self {
            center_x_fraction: 0.18,
            center_y_fraction: 0.5,
            inner_radius_fraction: 0.28,
            ring_spacing_fraction: 0.13,
            vertical_compression: 0.7,
            reference_height: 700.0,
            sun_radius_fraction: 0.07,
            body_radius_fraction: 0.03,
        }
    }
}

pub const MIN_BODY_RADIUS: f64 = 6.0;
pub const MIN_SUN_RADIUS: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityLayout {
    pub entity: EntityId,
    pub geometry: OrbitGeometry,
    pub body_radius: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneLayout {
    pub generation: LayoutGeneration,
    pub viewport: Viewport,
    pub center: Vec2,
    pub sun_radius: f64,
    pub entries: Vec<EntityLayout>,
}

impl SceneLayout {
    pub fn geometry_for(&self, entity: EntityId) -> Option<OrbitGeometry> {
        self.entry(entity).map(|entry| entry.geometry)
    }

    pub fn entry(&self, entity: EntityId) -> Option<&EntityLayout> {
        self.entries.iter().find(|entry| entry.entity == entity)
    }

    pub fn with_generation(mut self, generation: LayoutGeneration) -> Self {
        self.generation = generation;
        self
    }
}

pub fn layout(entities: &[OrbitingEntity], viewport_width: u32, viewport_height: u32) -> SceneLayout {
    compute_layout(
        entities,
        Viewport::new(viewport_width, viewport_height),
        &LayoutPolicy::default(),
    )
}

/// Builds a complete layout before anything observes it. The result carries
/// generation 0; callers stamp the generation they publish under.
pub fn compute_layout(entities: &[OrbitingEntity], viewport: Viewport, policy: &LayoutPolicy) -> SceneLayout {
    let width = f64::from(viewport.width.max(1));
    let height = f64::from(viewport.height.max(1));
    let center = Vec2::new(
        width * policy.center_x_fraction,
        height * policy.center_y_fraction,
    );
    let scale = if policy.reference_height > 0.0 {
        height / policy.reference_height
    } else {
        1.0
    };

    let entries = entities
        .iter()
        .map(|entity| {
            let ring_index = f64::from(entity.orbit_ring.max(1) - 1);
            let ring_radius =
                height * (policy.inner_radius_fraction + ring_index * policy.ring_spacing_fraction);
            let radius_x = entity
                .orbit_radius_x
                .map(|authored| authored * scale)
                .unwrap_or(ring_radius)
                .max(MIN_ORBIT_RADIUS);
            let radius_y = entity
                .orbit_radius_y
                .map(|authored| authored * scale)
                .unwrap_or(radius_x * policy.vertical_compression);
            EntityLayout {
                entity: entity.id,
                geometry: OrbitGeometry::new(center, radius_x, radius_y),
                body_radius: (height * policy.body_radius_fraction).max(MIN_BODY_RADIUS),
            }
        })
        .collect();

    SceneLayout {
        generation: LayoutGeneration::default(),
        viewport,
        center,
        sun_radius: (height * policy.sun_radius_fraction).max(MIN_SUN_RADIUS),
        entries,
    }
}
