//! Pointer input mapped to orbit-camera actions.
//!
//! # Invariants
//! - Window-system events are translated by the app; this crate only sees
//!   logical pixel positions and its own button type.
//! - The sketch consumes [`OrbitAction`]s, never raw pointer events.
//! - A drag that started in the scene always sees its release, even when an
//!   overlay UI claims the pointer by then.

pub mod action;

pub use action::{OrbitAction, PointerButton, PointerEvent, PointerTracker};

pub fn crate_info() -> &'static str {
    "smoke-input v0.1.0"
}
