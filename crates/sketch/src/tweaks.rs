use serde::{Deserialize, Serialize};
use smoke_common::Rgb;

/// Starting value of the `uOpacity` uniform.
pub const DEFAULT_OPACITY: f32 = 1.0;

/// Live-tweakable parameters that are not stored on the material itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tweaks {
    /// Multiplier applied to elapsed seconds before it reaches `uTime`.
    pub speed: f32,
    /// Smoke tint, mirrored into `uColor`.
    pub color: Rgb,
    /// Mirrored into `uRaw` by the raw-material control.
    pub raw: bool,
}

impl Default for Tweaks {
    fn default() -> Self {
        Self {
            speed: 1.0,
            color: Rgb::new(0.6, 0.3, 0.2),
            raw: false,
        }
    }
}
