//! Rendering adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - One call to [`Renderer::render`] is one draw of the whole scene.
//!
//! The GPU backend lives in `smoke-render-wgpu`. The renderers here are used
//! for headless runs, logging and tests.

mod renderer;

pub use renderer::{CaptureRenderer, DebugTextRenderer, FrameCapture, Renderer};

pub fn crate_info() -> &'static str {
    "smoke-render v0.1.0"
}
