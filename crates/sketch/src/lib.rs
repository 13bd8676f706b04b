//! The coffee smoke sketch: one scene, one animated shader material, five live controls.
//!
//! [`Sketch`] owns every piece of mutable state. Each external event maps to
//! one method: a frame tick ([`Sketch::frame`]), a resize ([`Sketch::resize`]),
//! an asset completion ([`Sketch::poll_assets`]) or a control edit
//! ([`Sketch::apply`]).
//!
//! # Invariants
//! - All state is touched from a single thread.
//! - Uniforms seen by frame N reflect every edit made before frame N was issued.
//! - The baked model is attached at most once.

pub mod controls;
pub mod frame_loop;
pub mod sketch;
pub mod tweaks;

pub use controls::{
    CONTROLS, ControlEdit, ControlId, ControlKind, ControlSpec, ControlValue, OPACITY_RANGE,
    SPEED_RANGE, SliderRange,
};
pub use frame_loop::{
    Clock, FrameBudget, FramePacer, IntervalPacer, SteppedClock, SystemClock, run,
};
pub use sketch::Sketch;
pub use tweaks::{DEFAULT_OPACITY, Tweaks};

pub fn crate_info() -> &'static str {
    "smoke-sketch v0.1.0"
}
