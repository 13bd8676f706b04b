use std::sync::Arc;

use smoke_assets::TextureData;
use smoke_common::Rgb;

use crate::geometry::PlaneGeometry;

/// Uniform names exposed by the smoke shader, in binding order.
pub const UNIFORM_NAMES: [&str; 5] = ["uTime", "uPerlinTexture", "uColor", "uOpacity", "uRaw"];

/// Host-side values of the smoke shader's uniforms.
#[derive(Debug, Clone, PartialEq)]
pub struct SmokeUniforms {
    /// `uTime`: scaled elapsed seconds.
    pub time: f32,
    /// `uPerlinTexture`: `None` until the noise image has loaded.
    pub perlin_texture: Option<Arc<TextureData>>,
    /// `uColor`
    pub color: Rgb,
    /// `uOpacity`
    pub opacity: f32,
    /// `uRaw`
    pub raw: bool,
}

impl Default for SmokeUniforms {
    fn default() -> Self {
        Self {
            time: 0.0,
            perlin_texture: None,
            color: Rgb::new(1.0, 1.0, 1.0),
            opacity: 1.0,
            raw: false,
        }
    }
}

/// Shader material for the smoke plane.
#[derive(Debug, Clone, PartialEq)]
pub struct SmokeMaterial {
    pub uniforms: SmokeUniforms,
    pub wireframe: bool,
    pub double_sided: bool,
    pub transparent: bool,
    pub depth_write: bool,
}

impl Default for SmokeMaterial {
    fn default() -> Self {
        Self {
            uniforms: SmokeUniforms::default(),
            wireframe: false,
            double_sided: true,
            transparent: true,
            depth_write: false,
        }
    }
}

impl SmokeMaterial {
    pub fn with_uniforms(uniforms: SmokeUniforms) -> Self {
        Self {
            uniforms,
            ..Self::default()
        }
    }
}

/// Geometry plus material: the animated smoke surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SmokeMesh {
    pub geometry: PlaneGeometry,
    pub material: SmokeMaterial,
}

impl SmokeMesh {
    pub fn new(geometry: PlaneGeometry, material: SmokeMaterial) -> Self {
        Self { geometry, material }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_defaults_match_smoke_setup() {
        let m = SmokeMaterial::default();
        assert!(m.double_sided);
        assert!(m.transparent);
        assert!(!m.depth_write);
        assert!(!m.wireframe);
        assert_eq!(m.uniforms.opacity, 1.0);
        assert!(m.uniforms.perlin_texture.is_none());
    }

    #[test]
    fn uniform_names_are_stable() {
        assert_eq!(UNIFORM_NAMES[0], "uTime");
        assert!(UNIFORM_NAMES.contains(&"uPerlinTexture"));
        assert!(UNIFORM_NAMES.contains(&"uRaw"));
    }
}
