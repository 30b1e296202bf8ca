use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::entity::{AccentColor, AccentColorError, OrbitingEntity, ProjectLinks, ProjectRecord};
use crate::orbit::{normalize_degrees, EntityId};

/// Authored rings beyond this are clamped; layout radius grows linearly with ring.
pub const MAX_ORBIT_RING: u32 = 64;
/// Authored orbit radii beyond this are clamped.
pub const MAX_ORBIT_RADIUS_PX: f64 = 10_000.0;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read content file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse content file {path} at `{field}`: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("project at index {index} has an empty slug")]
    EmptySlug { index: usize },
    #[error("duplicate project slug `{slug}`")]
    DuplicateSlug { slug: String },
    #[error("project `{slug}` has an invalid accent color")]
    InvalidAccentColor {
        slug: String,
        #[source]
        source: AccentColorError,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    pub projects: Vec<ProjectRecord>,
}

/// Ordered project records with ids assigned in catalog order, starting at 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectCatalog {
    entities: Vec<OrbitingEntity>,
}

impl ProjectCatalog {
    pub fn from_records(records: Vec<ProjectRecord>) -> Result<Self, ContentError> {
        let mut seen = HashSet::new();
        let mut entities = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let slug = record.slug.trim().to_string();
            if slug.is_empty() {
                return Err(ContentError::EmptySlug { index });
            }
            if !seen.insert(slug.clone()) {
                return Err(ContentError::DuplicateSlug { slug });
            }
            entities.push(build_entity(index, slug, record)?);
        }
        Ok(Self { entities })
    }

    pub fn from_json_str(raw: &str, path: &Path) -> Result<Self, ContentError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let file: CatalogFile =
            serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
                let field = error.path().to_string();
                ContentError::Parse {
                    path: path.to_path_buf(),
                    field,
                    source: error.into_inner(),
                }
            })?;
        Self::from_records(file.projects)
    }

    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let raw = fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&raw, path)?;
        info!(
            path = %path.display(),
            projects = catalog.len(),
            "content_loaded"
        );
        Ok(catalog)
    }

    /// Loads `path`, substituting the sample catalog when the file does not exist.
    pub fn load_or_sample(path: &Path) -> Result<Self, ContentError> {
        match Self::load(path) {
            Err(ContentError::Read { path, source }) if source.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "content_file_missing_using_sample");
                Ok(sample_catalog())
            }
            other => other,
        }
    }

    pub fn entities(&self) -> &[OrbitingEntity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [OrbitingEntity] {
        &mut self.entities
    }

    pub fn into_entities(self) -> Vec<OrbitingEntity> {
        self.entities
    }

    pub fn get(&self, id: EntityId) -> Option<&OrbitingEntity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn by_slug(&self, slug: &str) -> Option<&OrbitingEntity> {
        self.entities.iter().find(|entity| entity.slug == slug)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

fn build_entity(index: usize, slug: String, record: ProjectRecord) -> Result<OrbitingEntity, ContentError> {
    let accent_color = match record.accent_color.as_deref() {
        Some(raw) => raw
            .parse::<AccentColor>()
            .map_err(|source| ContentError::InvalidAccentColor {
                slug: slug.clone(),
                source,
            })?,
        None => AccentColor::default(),
    };

    let completion_percent = u8::try_from(record.completion_percent.clamp(0, 100)).unwrap_or(100);
    if i64::from(completion_percent) != record.completion_percent {
        warn!(
            slug = %slug,
            authored = record.completion_percent,
            clamped = completion_percent,
            "completion_percent_clamped"
        );
    }

    let catalog_ring = u32::try_from(index + 1).unwrap_or(u32::MAX);
    let orbit_ring = match record.orbit_ring {
        Some(0) => {
            warn!(slug = %slug, fallback = catalog_ring, "orbit_ring_zero_replaced");
            catalog_ring
        }
        Some(ring) if ring > MAX_ORBIT_RING => {
            warn!(slug = %slug, authored = ring, clamped = MAX_ORBIT_RING, "orbit_ring_clamped");
            MAX_ORBIT_RING
        }
        Some(ring) => ring,
        None => catalog_ring,
    };

    Ok(OrbitingEntity {
        id: EntityId(u64::try_from(index + 1).unwrap_or(u64::MAX)),
        orbit_radius_x: orbit_radius_or_warn(&slug, "orbit_radius_x", record.orbit_radius_x),
        orbit_radius_y: orbit_radius_or_warn(&slug, "orbit_radius_y", record.orbit_radius_y),
        phase_offset_degrees: finite_or_warn(
            &slug,
            "phase_offset_degrees",
            record.phase_offset_degrees,
        )
        .map(normalize_degrees),
        angular_speed_degrees_per_second: finite_or_warn(
            &slug,
            "angular_speed_degrees_per_second",
            record.angular_speed_degrees_per_second,
        ),
        slug,
        title: record.title,
        description: record.description,
        tags: record.tags,
        completion_percent,
        orbit_ring,
        accent_color,
        links: record.links,
    })
}

fn finite_or_warn(slug: &str, field: &'static str, value: Option<f64>) -> Option<f64> {
    match value {
        Some(value) if !value.is_finite() => {
            warn!(slug, field, "non_finite_value_ignored");
            None
        }
        other => other,
    }
}

fn orbit_radius_or_warn(slug: &str, field: &'static str, value: Option<f64>) -> Option<f64> {
    finite_or_warn(slug, field, value).map(|radius| {
        if radius > MAX_ORBIT_RADIUS_PX {
            warn!(slug, field, authored = radius, clamped = MAX_ORBIT_RADIUS_PX, "orbit_radius_clamped");
            MAX_ORBIT_RADIUS_PX
        } else {
            radius
        }
    })
}

struct SampleProject {
    slug: &'static str,
    title: &'static str,
    description: &'static str,
    tags: &'static [&'static str],
    completion_percent: u8,
    accent: (f64, f64, f64),
    live: bool,
}

const SAMPLE_PROJECTS: [SampleProject; 5] = [
    SampleProject {
        slug: "human-ai-interaction",
        title: "Human-AI interaction",
        description: "A full-stack e-commerce solution with React, Node.js, and Stripe integration. Features include real-time inventory management, user authentication, and a responsive checkout flow.",
        tags: &["React", "Node.js", "PostgreSQL", "Stripe", "Tailwind CSS"],
        completion_percent: 45,
        accent: (200.0, 85.0, 55.0),
        live: true,
    },
    SampleProject {
        slug: "task-management-app",
        title: "Task Management App",
        description: "A collaborative project management tool with drag-and-drop functionality, real-time updates via WebSockets, and team collaboration features.",
        tags: &["TypeScript", "Next.js", "Prisma", "Socket.io", "shadcn/ui"],
        completion_percent: 32,
        accent: (280.0, 70.0, 60.0),
        live: true,
    },
    SampleProject {
        slug: "ai-content-generator",
        title: "AI Content Generator",
        description: "An AI-powered content creation tool leveraging GPT-4 for blog posts, social media, and marketing copy. Includes templates and tone customization.",
        tags: &["React", "OpenAI API", "Firebase", "Framer Motion"],
        completion_percent: 68,
        accent: (140.0, 70.0, 50.0),
        live: false,
    },
    SampleProject {
        slug: "weather-dashboard",
        title: "Weather Dashboard",
        description: "A beautiful weather forecasting dashboard with interactive maps, hourly predictions, and location-based alerts. Built with modern design patterns.",
        tags: &["Vue.js", "D3.js", "OpenWeather API", "CSS Grid"],
        completion_percent: 10,
        accent: (15.0, 85.0, 55.0),
        live: true,
    },
    SampleProject {
        slug: "portfolio-analytics",
        title: "Portfolio Analytics",
        description: "Real-time analytics dashboard for tracking portfolio performance, visitor insights, and engagement metrics with beautiful data visualizations.",
        tags: &["React", "Chart.js", "Express", "MongoDB", "AWS"],
        completion_percent: 75,
        accent: (260.0, 75.0, 65.0),
        live: false,
    },
];

/// Built-in placeholder projects, one per ring.
pub fn sample_catalog() -> ProjectCatalog {
    let entities = SAMPLE_PROJECTS
        .iter()
        .zip(1u32..)
        .map(|(sample, ring)| {
            let (hue, saturation, lightness) = sample.accent;
            OrbitingEntity {
                id: EntityId(u64::from(ring)),
                slug: sample.slug.to_string(),
                title: sample.title.to_string(),
                description: sample.description.to_string(),
                tags: sample.tags.iter().map(|tag| tag.to_string()).collect(),
                completion_percent: sample.completion_percent,
                orbit_ring: ring,
                orbit_radius_x: None,
                orbit_radius_y: None,
                phase_offset_degrees: None,
                angular_speed_degrees_per_second: None,
                accent_color: AccentColor {
                    hue,
                    saturation,
                    lightness,
                },
                links: ProjectLinks {
                    github: Some("https://github.com".to_string()),
                    live: sample.live.then(|| "https://example.com".to_string()),
                },
            }
        })
        .collect();
    ProjectCatalog { entities }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn record(slug: &str) -> ProjectRecord {
        ProjectRecord {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            description: String::new(),
            tags: Vec::new(),
            completion_percent: 50,
            orbit_ring: None,
            orbit_radius_x: None,
            orbit_radius_y: None,
            phase_offset_degrees: None,
            angular_speed_degrees_per_second: None,
            accent_color: None,
            links: ProjectLinks::default(),
        }
    }

    #[test]
    fn bundled_asset_matches_sample_catalog() {
        let raw = include_str!("../../../../assets/projects.json");
        let catalog = ProjectCatalog::from_json_str(raw, Path::new("assets/projects.json"))
            .expect("bundled catalog parses");
        assert_eq!(catalog, sample_catalog());
    }

    #[test]
    fn ids_and_rings_follow_catalog_order() {
        let catalog =
            ProjectCatalog::from_records(vec![record("a"), record("b"), record("c")]).expect("catalog");
        let ids = catalog.entities().iter().map(|e| e.id).collect::<Vec<_>>();
        let rings = catalog.entities().iter().map(|e| e.orbit_ring).collect::<Vec<_>>();
        assert_eq!(ids, vec![EntityId(1), EntityId(2), EntityId(3)]);
        assert_eq!(rings, vec![1, 2, 3]);
        assert_eq!(catalog.by_slug("b").map(|e| e.id), Some(EntityId(2)));
    }

    #[test]
    fn completion_is_clamped_into_percent_range() {
        let mut high = record("high");
        high.completion_percent = 140;
        let mut low = record("low");
        low.completion_percent = -3;

        let catalog = ProjectCatalog::from_records(vec![high, low]).expect("catalog");

        assert_eq!(catalog.entities()[0].completion_percent, 100);
        assert_eq!(catalog.entities()[1].completion_percent, 0);
    }

    #[test]
    fn phase_offsets_are_normalized() {
        let mut entry = record("phase");
        entry.phase_offset_degrees = Some(-90.0);
        let catalog = ProjectCatalog::from_records(vec![entry]).expect("catalog");
        assert_eq!(catalog.entities()[0].phase_offset_degrees, Some(270.0));
    }

    #[test]
    fn absurd_ring_and_radii_are_clamped() {
        let mut far = record("far");
        far.orbit_ring = Some(1_000_000);
        let mut wide = record("wide");
        wide.orbit_radius_x = Some(9.0e7);
        wide.orbit_radius_y = Some(120.0);

        let catalog = ProjectCatalog::from_records(vec![far, wide]).expect("catalog");

        let far = catalog.by_slug("far").expect("far");
        assert_eq!(far.orbit_ring, MAX_ORBIT_RING);
        let wide = catalog.by_slug("wide").expect("wide");
        assert_eq!(wide.orbit_radius_x, Some(MAX_ORBIT_RADIUS_PX));
        assert_eq!(wide.orbit_radius_y, Some(120.0));
    }

    #[test]
    fn duplicate_slug_is_rejected() {
        let error = ProjectCatalog::from_records(vec![record("same"), record(" same ")])
            .expect_err("duplicate slug");
        assert!(matches!(error, ContentError::DuplicateSlug { slug } if slug == "same"));
    }

    #[test]
    fn empty_slug_is_rejected() {
        let error = ProjectCatalog::from_records(vec![record("ok"), record("  ")])
            .expect_err("empty slug");
        assert!(matches!(error, ContentError::EmptySlug { index: 1 }));
    }

    #[test]
    fn invalid_accent_color_names_project() {
        let mut entry = record("bad-color");
        entry.accent_color = Some("teal".to_string());
        let error = ProjectCatalog::from_records(vec![entry]).expect_err("invalid color");
        assert!(
            matches!(error, ContentError::InvalidAccentColor { ref slug, .. } if slug == "bad-color")
        );
    }

    #[test]
    fn parse_error_reports_field_path() {
        let raw = r#"{ "projects": [ { "slug": "a", "title": "A", "completion_percent": "lots" } ] }"#;
        let error = ProjectCatalog::from_json_str(raw, Path::new("projects.json"))
            .expect_err("type error");
        match error {
            ContentError::Parse { field, path, .. } => {
                assert_eq!(field, "projects[0].completion_percent");
                assert_eq!(path, PathBuf::from("projects.json"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let raw = r#"{ "projects": [ { "slug": "a", "title": "A", "colour": "red" } ] }"#;
        assert!(ProjectCatalog::from_json_str(raw, Path::new("p.json")).is_err());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("projects.json");
        fs::write(
            &path,
            r#"{ "projects": [ { "slug": "solo", "title": "Solo", "completion_percent": 20, "accent_color": "15 85% 55%" } ] }"#,
        )
        .expect("write catalog");

        let catalog = ProjectCatalog::load(&path).expect("load");

        assert_eq!(catalog.len(), 1);
        let entity = &catalog.entities()[0];
        assert_eq!(entity.title, "Solo");
        assert!((entity.accent_color.hue - 15.0).abs() < 1e-9);
    }

    #[test]
    fn missing_file_falls_back_to_sample() {
        let dir = TempDir::new().expect("temp dir");
        let catalog = ProjectCatalog::load_or_sample(&dir.path().join("absent.json"))
            .expect("sample fallback");
        assert_eq!(catalog, sample_catalog());
    }

    #[test]
    fn malformed_file_is_not_masked_by_sample() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("projects.json");
        fs::write(&path, "{ not json").expect("write");

        let error = ProjectCatalog::load_or_sample(&path).expect_err("parse error");
        assert!(matches!(error, ContentError::Parse { .. }));
    }

    #[test]
    fn sample_catalog_matches_bundled_projects_file() {
        let catalog = sample_catalog();
        assert_eq!(catalog.len(), 5);
        let percents = catalog
            .entities()
            .iter()
            .map(|e| e.completion_percent)
            .collect::<Vec<_>>();
        assert_eq!(percents, vec![45, 32, 68, 10, 75]);
        assert!(catalog.entities()[2].links.live.is_none());
    }
}
