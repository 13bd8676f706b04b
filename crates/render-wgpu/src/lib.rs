//! wgpu render backend for the coffee smoke sketch.
//!
//! Draws the baked model (unlit, textured) and then the transparent smoke
//! plane into a 4x multisampled target sized by the viewport's capped pixel
//! ratio, and scales the result onto the window surface.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - Opaque nodes are drawn before transparent ones.
//! - GPU resources for a scene node are created once and reused.

mod gpu;
mod mesh;
mod shaders;
mod targets;
mod texture;

pub use gpu::{FrameStats, FrameTarget, WgpuRenderer};
pub use shaders::SMOKE_SHADER;
pub use targets::SAMPLE_COUNT;
