use crate::orbit::{OrbitGeometry, FULL_TURN_DEGREES};

/// Clipped RGBA drawing onto a `width * height * 4` frame.
pub(crate) struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn clear(&mut self, color: [u8; 4]) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    /// Alpha-blends `color` over the existing pixel. Out-of-bounds writes are dropped.
    pub(crate) fn write_pixel_rgba(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let Some(pixel_offset) = (y as usize)
            .checked_mul(self.width as usize)
            .and_then(|row| row.checked_add(x as usize))
        else {
            return;
        };
        let Some(byte_offset) = pixel_offset.checked_mul(4) else {
            return;
        };
        let Some(end) = byte_offset.checked_add(4) else {
            return;
        };
        if end > self.frame.len() {
            return;
        }
        let target = &mut self.frame[byte_offset..end];
        match color[3] {
            0 => {}
            255 => target.copy_from_slice(&color),
            alpha => {
                let alpha = u16::from(alpha);
                for channel in 0..3 {
                    let blended = (u16::from(color[channel]) * alpha
                        + u16::from(target[channel]) * (255 - alpha))
                        / 255;
                    target[channel] = blended as u8;
                }
                target[3] = 255;
            }
        }
    }

    pub(crate) fn draw_filled_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: [u8; 4]) {
        let left = x.max(0);
        let top = y.max(0);
        let right = x.saturating_add(width).min(self.width as i32);
        let bottom = y.saturating_add(height).min(self.height as i32);
        for py in top..bottom {
            for px in left..right {
                self.write_pixel_rgba(px, py, color);
            }
        }
    }

    pub(crate) fn draw_rect_outline(&mut self, x: i32, y: i32, width: i32, height: i32, color: [u8; 4]) {
        if width <= 0 || height <= 0 {
            return;
        }
        let right = x.saturating_add(width - 1);
        let bottom = y.saturating_add(height - 1);
        for px in x..=right {
            self.write_pixel_rgba(px, y, color);
            self.write_pixel_rgba(px, bottom, color);
        }
        for py in (y + 1)..bottom {
            self.write_pixel_rgba(x, py, color);
            self.write_pixel_rgba(right, py, color);
        }
    }

    pub(crate) fn draw_filled_circle(&mut self, cx: f64, cy: f64, radius: f64, color: [u8; 4]) {
        if !(radius > 0.0) || !cx.is_finite() || !cy.is_finite() {
            return;
        }
        let r_squared = radius * radius;
        let top = (cy - radius).floor() as i32;
        let bottom = (cy + radius).ceil() as i32;
        for py in top..=bottom {
            let dy = f64::from(py) + 0.5 - cy;
            let span_squared = r_squared - dy * dy;
            if span_squared < 0.0 {
                continue;
            }
            let span = span_squared.sqrt();
            let left = (cx - span).round() as i32;
            let right = (cx + span).round() as i32;
            for px in left..right {
                self.write_pixel_rgba(px, py, color);
            }
        }
    }

    /// Ring between `radius - thickness` and `radius`.
    pub(crate) fn draw_ring(&mut self, cx: f64, cy: f64, radius: f64, thickness: f64, color: [u8; 4]) {
        self.draw_arc(cx, cy, radius, thickness, 0.0, FULL_TURN_DEGREES, color);
    }

    /// Arc starting at `start_degrees` sweeping clockwise on screen.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn draw_arc(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        thickness: f64,
        start_degrees: f64,
        sweep_degrees: f64,
        color: [u8; 4],
    ) {
        if !(radius > 0.0) || !(sweep_degrees > 0.0) {
            return;
        }
        let inner = (radius - thickness.max(1.0)).max(0.0);
        let circumference = std::f64::consts::TAU * radius;
        let samples = ((circumference * sweep_degrees / FULL_TURN_DEGREES) * 2.0).ceil().max(1.0) as u32;
        for sample in 0..=samples {
            let angle = (start_degrees + sweep_degrees * f64::from(sample) / f64::from(samples))
                .to_radians();
            let (sin, cos) = angle.sin_cos();
            let mut r = inner;
            while r <= radius {
                self.write_pixel_rgba(
                    (cx + r * cos).round() as i32,
                    (cy + r * sin).round() as i32,
                    color,
                );
                r += 0.5;
            }
        }
    }

    /// Dashed outline of an orbit, dash and gap measured in degrees of the orbit.
    pub(crate) fn draw_dashed_ellipse(
        &mut self,
        geometry: &OrbitGeometry,
        dash_degrees: f64,
        gap_degrees: f64,
        color: [u8; 4],
    ) {
        let period = dash_degrees + gap_degrees;
        if !(dash_degrees > 0.0) || !(period > 0.0) {
            return;
        }
        if !self.ellipse_bounds_overlap(geometry) {
            return;
        }
        let circumference = std::f64::consts::TAU * geometry.radius_x.max(geometry.radius_y);
        let max_samples = 4 * (self.width + self.height).max(4);
        let samples = ((circumference * 1.5).ceil().max(16.0) as u32).min(max_samples);
        for sample in 0..samples {
            let angle = FULL_TURN_DEGREES * f64::from(sample) / f64::from(samples);
            if angle % period >= dash_degrees {
                continue;
            }
            let point = geometry.position_at(angle);
            self.write_pixel_rgba(point.x.round() as i32, point.y.round() as i32, color);
        }
    }

    fn ellipse_bounds_overlap(&self, geometry: &OrbitGeometry) -> bool {
        let OrbitGeometry {
            center,
            radius_x,
            radius_y,
        } = *geometry;
        if !(center.x.is_finite() && center.y.is_finite() && radius_x.is_finite() && radius_y.is_finite()) {
            return false;
        }
        center.x + radius_x >= 0.0
            && center.x - radius_x < f64::from(self.width)
            && center.y + radius_y >= 0.0
            && center.y - radius_y < f64::from(self.height)
    }

    #[cfg(test)]
    pub(crate) fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * self.width + x) * 4) as usize;
        let mut pixel = [0u8; 4];
        pixel.copy_from_slice(&self.frame[offset..offset + 4]);
        pixel
    }
}
