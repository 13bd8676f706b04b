//! Scene graph for the sketch: one root with a camera, the baked model and the smoke mesh.
//!
//! # Invariants
//! - Ownership is a tree: every node is a direct child of the root.
//! - Nodes are added once and never removed.
//! - At most one loaded model is attached.

pub mod camera;
pub mod geometry;
pub mod graph;
pub mod material;

pub use camera::{OrbitControls, PerspectiveCamera};
pub use geometry::PlaneGeometry;
pub use graph::{NodeKind, NodeTag, Scene, SceneError, SceneNode};
pub use material::{SmokeMaterial, SmokeMesh, SmokeUniforms, UNIFORM_NAMES};
