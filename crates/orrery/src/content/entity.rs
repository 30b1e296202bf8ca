use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::orbit::EntityId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live: Option<String>,
}

impl ProjectLinks {
    pub fn is_empty(&self) -> bool {
        self.github.is_none() && self.live.is_none()
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("invalid accent color `{value}`: {reason}")]
pub struct AccentColorError {
    pub value: String,
    pub reason: &'static str,
}

/// HSL accent written as `"H S% L%"`, hue in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccentColor {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Default for AccentColor {
    fn default() -> Self {
        Self {
            hue: 200.0,
            saturation: 85.0,
            lightness: 55.0,
        }
    }
}

impl AccentColor {
    pub fn to_rgba(self) -> [u8; 4] {
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let l = (self.lightness / 100.0).clamp(0.0, 1.0);
        let a = s * l.min(1.0 - l);
        let channel = |n: f64| {
            let k = (n + self.hue / 30.0).rem_euclid(12.0);
            let value = l - a * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0);
            (value * 255.0).round().clamp(0.0, 255.0) as u8
        };
        [channel(0.0), channel(8.0), channel(4.0), 0xFF]
    }

    /// Same hue with lightness shifted by `delta` percentage points.
    pub fn with_lightness_offset(self, delta: f64) -> Self {
        Self {
            lightness: (self.lightness + delta).clamp(0.0, 100.0),
            ..self
        }
    }
}

impl FromStr for AccentColor {
    type Err = AccentColorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| AccentColorError {
            value: value.to_string(),
            reason,
        };
        let parts = value
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>();
        let [hue, saturation, lightness] = parts.as_slice() else {
            return Err(invalid("expected three components"));
        };
        let number = |raw: &str| {
            raw.trim_end_matches('%')
                .parse::<f64>()
                .ok()
                .filter(|parsed| parsed.is_finite())
        };
        let hue = number(*hue).ok_or_else(|| invalid("hue is not a number"))?;
        let saturation = number(*saturation).ok_or_else(|| invalid("saturation is not a number"))?;
        let lightness = number(*lightness).ok_or_else(|| invalid("lightness is not a number"))?;
        if !(0.0..=100.0).contains(&saturation) || !(0.0..=100.0).contains(&lightness) {
            return Err(invalid("saturation and lightness must be within 0..=100"));
        }
        Ok(Self {
            hue: hue.rem_euclid(360.0),
            saturation,
            lightness,
        })
    }
}

impl fmt::Display for AccentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}% {}%", self.hue, self.saturation, self.lightness)
    }
}

/// One entry of the content file as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectRecord {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub completion_percent: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit_ring: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit_radius_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit_radius_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_offset_degrees: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angular_speed_degrees_per_second: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(default, skip_serializing_if = "ProjectLinks::is_empty")]
    pub links: ProjectLinks,
}

/// A project placed in the scene. Static for the lifetime of a catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitingEntity {
    pub id: EntityId,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub completion_percent: u8,
    /// 1-based ring, counted outward from the sun.
    pub orbit_ring: u32,
    pub orbit_radius_x: Option<f64>,
    pub orbit_radius_y: Option<f64>,
    pub phase_offset_degrees: Option<f64>,
    pub angular_speed_degrees_per_second: Option<f64>,
    pub accent_color: AccentColor,
    pub links: ProjectLinks,
}

impl OrbitingEntity {
    pub fn completion_fraction(&self) -> f64 {
        f64::from(self.completion_percent.min(100)) / 100.0
    }
}
