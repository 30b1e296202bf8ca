#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Easing {
    Linear,
    #[default]
    EaseOutCubic,
    EaseInOutCubic,
}

impl Easing {
    /// Maps linear progress to eased progress. Input is clamped to `[0, 1]`.
    pub fn apply(self, progress: f64) -> f64 {
        let t = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        match self {
            Easing::Linear => t,
            Easing::EaseOutCubic => {
                let inverse = 1.0 - t;
                1.0 - inverse * inverse * inverse
            }
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let tail = -2.0 * t + 2.0;
                    1.0 - tail * tail * tail / 2.0
                }
            }
        }
    }
}
