//! Shared types used across the sketch crates.
//!
//! # Invariants
//! - Viewport sizing is pure arithmetic; nothing here touches a window or GPU.

mod types;
mod viewport;

pub use types::{NodeId, Rgb, Transform};
pub use viewport::{BufferSize, DEFAULT_MAX_PIXEL_RATIO, Viewport};
