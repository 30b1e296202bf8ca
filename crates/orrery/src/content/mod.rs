mod catalog;
mod entity;

pub use catalog::{
    sample_catalog, CatalogFile, ContentError, ProjectCatalog, MAX_ORBIT_RADIUS_PX, MAX_ORBIT_RING,
};
pub use entity::{
    AccentColor, AccentColorError, OrbitingEntity, ProjectLinks, ProjectRecord,
};
