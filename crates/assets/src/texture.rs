use std::path::Path;

use crate::AssetError;

/// Texture addressing mode along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

/// Sampling parameters carried alongside the pixels.
///
/// The GPU backend builds its sampler from these; a level of 1 means
/// anisotropic filtering is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerSettings {
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
    pub anisotropy: u16,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            wrap_u: WrapMode::ClampToEdge,
            wrap_v: WrapMode::ClampToEdge,
            anisotropy: 1,
        }
    }
}

/// Decoded RGBA8 image plus sampler settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub sampler: SamplerSettings,
}

impl TextureData {
    pub fn new(name: impl Into<String>, width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            rgba,
            sampler: SamplerSettings::default(),
        }
    }

    /// Set the same addressing mode on both axes.
    pub fn set_wrap(&mut self, mode: WrapMode) {
        self.sampler.wrap_u = mode;
        self.sampler.wrap_v = mode;
    }

    pub fn set_anisotropy(&mut self, level: u16) {
        self.sampler.anisotropy = level.max(1);
    }
}

/// Load an image file into an RGBA8 texture with default sampler settings.
pub fn load_texture(path: impl AsRef<Path>) -> Result<TextureData, AssetError> {
    let path = path.as_ref();
    let rgba = image::open(path)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    tracing::info!(path = %path.display(), width, height, "loaded texture");
    Ok(TextureData::new(
        path.display().to_string(),
        width,
        height,
        rgba.into_raw(),
    ))
}
