//! Asset loading for the sketch: the baked glTF model and the perlin noise texture.
//!
//! Files are decoded off the render thread. Results come back through a
//! [`Pending`] completion channel that the render thread polls once per frame,
//! so the scene graph is only ever touched from one thread.
//!
//! # Layout
//! Both files live in a single asset directory and are resolved by name:
//! `bakedModel.glb` and `perlin.png`.

mod model;
mod pending;
mod texture;

use std::path::{Path, PathBuf};

pub use model::{LoadedModel, ModelObject, Primitive, load_gltf};
pub use pending::Pending;
pub use texture::{SamplerSettings, TextureData, WrapMode, load_texture};

/// File name of the baked scene model.
pub const MODEL_FILE: &str = "bakedModel.glb";
/// File name of the noise texture sampled by the smoke shader.
pub const NOISE_TEXTURE_FILE: &str = "perlin.png";

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("unsupported image format in {context}: {format}")]
    UnsupportedImageFormat { context: String, format: String },
    #[error("object not found in model: {0}")]
    ObjectNotFound(String),
    #[error("{0}: loader thread exited without a result")]
    Disconnected(String),
}

/// Resolves the sketch's asset files relative to one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    root: PathBuf,
}

impl AssetPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn model(&self) -> PathBuf {
        self.root.join(MODEL_FILE)
    }

    pub fn noise_texture(&self) -> PathBuf {
        self.root.join(NOISE_TEXTURE_FILE)
    }
}

pub fn crate_info() -> &'static str {
    "smoke-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_resolve_relative_to_root() {
        let paths = AssetPaths::new("static");
        assert_eq!(paths.model(), Path::new("static").join("bakedModel.glb"));
        assert_eq!(paths.noise_texture(), Path::new("static").join("perlin.png"));
    }

    #[test]
    fn error_messages_name_the_object() {
        let err = AssetError::ObjectNotFound("baked".into());
        assert!(err.to_string().contains("baked"));
    }
}
