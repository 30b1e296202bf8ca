use tracing::warn;

use crate::orbit::{normalize_degrees, FULL_TURN_DEGREES};

pub const DEFAULT_SLOT_BASE_DEGREES: f64 = 300.0;
pub const DEFAULT_SLOT_STEP_DEGREES: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotArc {
    Full,
    /// 270° through 90° passing 0°, the half of the orbit right of the sun.
    RightHalf,
}

impl SlotArc {
    pub fn span_degrees(self) -> f64 {
        match self {
            SlotArc::Full => FULL_TURN_DEGREES,
            SlotArc::RightHalf => FULL_TURN_DEGREES / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotPolicy {
    pub base_degrees: f64,
    pub step_degrees: f64,
    pub arc: SlotArc,
}

impl Default for SlotPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_SLOT_BASE_DEGREES, DEFAULT_SLOT_STEP_DEGREES)
    }
}

impl SlotPolicy {
    pub fn fixed(base_degrees: f64, step_degrees: f64) -> Self {
        Self {
            base_degrees,
            step_degrees,
            arc: SlotArc::Full,
        }
    }

    /// Spaces `count` slots evenly across `arc`.
    pub fn spread(count: usize, arc: SlotArc) -> Self {
        let step_degrees = if count == 0 {
            0.0
        } else {
            arc.span_degrees() / count as f64
        };
        let base_degrees = match arc {
            SlotArc::Full => 0.0,
            SlotArc::RightHalf => 270.0 + step_degrees / 2.0,
        };
        Self {
            base_degrees,
            step_degrees,
            arc,
        }
    }

    fn effective_step(&self, count: usize) -> f64 {
        let span = self.arc.span_degrees();
        let requested = self.step_degrees.abs() * count as f64;
        if count == 0 || requested <= span {
            return self.step_degrees;
        }
        let compressed = span / count as f64;
        warn!(
            count,
            requested_step = self.step_degrees,
            compressed_step = compressed,
            "slot_step_compressed"
        );
        compressed.copysign(self.step_degrees)
    }
}

/// Slot angles for `count` entities in catalog order.
pub fn assign_slot_angles(count: usize, policy: &SlotPolicy) -> Vec<f64> {
    let step = policy.effective_step(count);
    (0..count)
        .map(|index| normalize_degrees(policy.base_degrees + index as f64 * step))
        .collect()
}

/// Slot angles where an explicit per-entity phase replaces the computed slot.
pub fn assign_slot_angles_with_overrides(overrides: &[Option<f64>], policy: &SlotPolicy) -> Vec<f64> {
    assign_slot_angles(overrides.len(), policy)
        .into_iter()
        .zip(overrides)
        .map(|(slot, explicit)| match explicit {
            Some(angle) => normalize_degrees(*angle),
            None => slot,
        })
        .collect()
}
