use serde::{Deserialize, Serialize};

/// Upper bound on the device pixel ratio used for the draw buffer.
pub const DEFAULT_MAX_PIXEL_RATIO: f64 = 2.0;

/// Size of the render target in physical pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferSize {
    pub width: u32,
    pub height: u32,
}

/// Drawing-surface size in logical (CSS-like) pixels plus the device pixel ratio.
///
/// The camera reads [`Viewport::aspect`], the renderer reads
/// [`Viewport::buffer_size`]. High-density displays are capped at
/// `max_pixel_ratio` so the buffer never grows past 2x the logical size by default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
    pub max_pixel_ratio: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0, 1.0)
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
            max_pixel_ratio: DEFAULT_MAX_PIXEL_RATIO,
        }
    }

    /// Build a viewport from a physical window size and the platform scale factor.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self::new(width as f64 / scale, height as f64 / scale, scale)
    }

    pub fn with_max_pixel_ratio(mut self, max_pixel_ratio: f64) -> Self {
        self.max_pixel_ratio = max_pixel_ratio;
        self
    }

    /// Camera aspect ratio, `width / height`. A zero height is treated as 1.
    pub fn aspect(&self) -> f32 {
        let height = if self.height > 0.0 { self.height } else { 1.0 };
        (self.width / height) as f32
    }

    /// Effective pixel ratio: `min(device_pixel_ratio, max_pixel_ratio)`.
    pub fn pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio.min(self.max_pixel_ratio)
    }

    /// True for a minimized or collapsed surface.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Draw-buffer size: `floor(w * ratio) x floor(h * ratio)`, at least 1x1.
    pub fn buffer_size(&self) -> BufferSize {
        let ratio = self.pixel_ratio();
        BufferSize {
            width: scaled_floor(self.width, ratio),
            height: scaled_floor(self.height, ratio),
        }
    }
}

// The epsilon absorbs round-off from `from_physical` dividing by the scale factor.
fn scaled_floor(logical: f64, ratio: f64) -> u32 {
    ((logical * ratio + 1e-6).floor() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_is_width_over_height() {
        let vp = Viewport::new(1920.0, 1080.0, 1.0);
        assert_eq!(vp.aspect(), (1920.0_f64 / 1080.0) as f32);
    }

    #[test]
    fn pixel_ratio_capped_at_two() {
        assert_eq!(Viewport::new(100.0, 100.0, 3.0).pixel_ratio(), 2.0);
        assert_eq!(Viewport::new(100.0, 100.0, 1.5).pixel_ratio(), 1.5);
    }

    #[test]
    fn buffer_size_floors_scaled_dimensions() {
        let vp = Viewport::new(801.0, 601.0, 1.25);
        assert_eq!(
            vp.buffer_size(),
            BufferSize {
                width: 1001,
                height: 751
            }
        );

        let dense = Viewport::new(400.0, 300.0, 3.0);
        assert_eq!(
            dense.buffer_size(),
            BufferSize {
                width: 800,
                height: 600
            }
        );
    }

    #[test]
    fn from_physical_recovers_logical_size() {
        let vp = Viewport::from_physical(2560, 1440, 2.0);
        assert_eq!(vp.width, 1280.0);
        assert_eq!(vp.height, 720.0);
        assert_eq!(
            vp.buffer_size(),
            BufferSize {
                width: 2560,
                height: 1440
            }
        );
    }

    #[test]
    fn fractional_scale_keeps_physical_size() {
        for scale in [1.1, 1.25, 1.5, 1.75] {
            let vp = Viewport::from_physical(1268, 720, scale);
            assert_eq!(
                vp.buffer_size(),
                BufferSize {
                    width: 1268,
                    height: 720
                },
                "scale {scale}"
            );
        }
    }

    #[test]
    fn zero_size_is_empty() {
        assert!(Viewport::new(0.0, 0.0, 1.0).is_empty());
        assert!(Viewport::new(10.0, 0.0, 1.0).is_empty());
        assert!(!Viewport::default().is_empty());
    }

    #[test]
    fn custom_cap() {
        let vp = Viewport::new(100.0, 50.0, 2.0).with_max_pixel_ratio(1.0);
        assert_eq!(vp.buffer_size().width, 100);
    }

    #[test]
    fn zero_height_does_not_divide_by_zero() {
        let vp = Viewport::new(10.0, 0.0, 1.0);
        assert_eq!(vp.aspect(), 10.0);
        assert_eq!(vp.buffer_size().height, 1);
    }
}
