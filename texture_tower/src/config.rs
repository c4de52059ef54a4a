//! Tunables of [`TextureTower`](crate::TextureTower).
use super::lod::LOD_BIAS;

/// The default maximum number of levels, including the base image.
pub const MAX_LEVELS: usize = 12;

/// Controls the shape of the pyramid and the level selection.
///
/// The defaults reproduce the reference level selection exactly. They were
/// chosen by eye, so feel free to adjust them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TowerConfig {
    /// The maximum number of levels, including the base image. At least `1`.
    pub max_levels: usize,
    /// Added to the estimated level of detail before rounding. Negative values
    /// favor the finer level.
    pub lod_bias: f64,
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            max_levels: MAX_LEVELS,
            lod_bias: LOD_BIAS,
        }
    }
}

impl TowerConfig {
    /// Replace `max_levels`. Values less than `1` are raised to `1`.
    pub fn with_max_levels(self, max_levels: usize) -> Self {
        Self {
            max_levels: max_levels.max(1),
            ..self
        }
    }

    pub fn with_lod_bias(self, lod_bias: f64) -> Self {
        Self { lod_bias, ..self }
    }
}
