/// Smallest semi-axis an orbit may have. Degenerate radii are clamped up to this.
pub const MIN_ORBIT_RADIUS: f64 = 1.0;

pub const FULL_TURN_DEGREES: f64 = 360.0;

/// Angle of a 0% complete entity on the progress track.
pub const PROGRESS_START_DEGREES: f64 = 270.0;
/// Degrees swept per completion percent (half a turn over 0..=100).
pub const PROGRESS_DEGREES_PER_PERCENT: f64 = 1.8;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(self, other: Vec2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Elliptical orbit around a shared center.
///
/// Angles follow screen conventions: 0° points right of the center and
/// angles grow clockwise because screen y grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitGeometry {
    pub center: Vec2,
    pub radius_x: f64,
    pub radius_y: f64,
}

impl OrbitGeometry {
    pub fn new(center: Vec2, radius_x: f64, radius_y: f64) -> Self {
        Self {
            center,
            radius_x: clamp_orbit_radius(radius_x),
            radius_y: clamp_orbit_radius(radius_y),
        }
    }

    pub fn position_at(&self, angle_degrees: f64) -> Vec2 {
        orbit_position(
            self.radius_x,
            self.radius_y,
            self.center.x,
            self.center.y,
            angle_degrees,
        )
    }
}

pub fn orbit_position(
    radius_x: f64,
    radius_y: f64,
    center_x: f64,
    center_y: f64,
    angle_degrees: f64,
) -> Vec2 {
    let radius_x = clamp_orbit_radius(radius_x);
    let radius_y = clamp_orbit_radius(radius_y);
    let angle_degrees = if angle_degrees.is_finite() {
        angle_degrees
    } else {
        0.0
    };
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    Vec2 {
        x: center_x + radius_x * cos,
        y: center_y + radius_y * sin,
    }
}

pub fn clamp_orbit_radius(radius: f64) -> f64 {
    if !radius.is_finite() {
        return MIN_ORBIT_RADIUS;
    }
    radius.max(MIN_ORBIT_RADIUS)
}

/// True modulo into `[0, 360)`.
pub fn normalize_degrees(angle_degrees: f64) -> f64 {
    if !angle_degrees.is_finite() {
        return 0.0;
    }
    ((angle_degrees % FULL_TURN_DEGREES) + FULL_TURN_DEGREES) % FULL_TURN_DEGREES
}

/// Resting angle for a completion percentage on the semicircular progress track:
/// 0% sits at 270° (top), 50% at 180° (left), 100% at 90° (bottom).
pub fn completion_to_angle(completion_percent: u8) -> f64 {
    let percent = f64::from(completion_percent.min(100));
    normalize_degrees(PROGRESS_START_DEGREES - percent * PROGRESS_DEGREES_PER_PERCENT)
}
