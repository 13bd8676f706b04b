use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use smoke_common::NodeId;
use smoke_scene::{NodeKind, Scene, SmokeMesh};

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene graph and draws it through the camera node
/// `camera`. It never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of `scene` as seen by `camera`.
    fn render(&mut self, scene: &Scene, camera: NodeId) -> Self::Output;
}

/// Shader-visible state of one drawn frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameCapture {
    pub frame: u64,
    pub time: f32,
    pub opacity: f32,
    pub raw: bool,
    pub color: [f32; 3],
    pub wireframe: bool,
    pub texture_loaded: bool,
    pub model_attached: bool,
    pub camera_position: [f32; 3],
    pub aspect: f32,
}

fn first_smoke(scene: &Scene) -> Option<&SmokeMesh> {
    scene.children().iter().find_map(|n| match &n.kind {
        NodeKind::Smoke(mesh) => Some(mesh),
        _ => None,
    })
}

/// Records the uniforms every draw would have uploaded.
///
/// Stands in for the GPU in headless runs and tests.
#[derive(Debug, Default)]
pub struct CaptureRenderer {
    frames: Vec<FrameCapture>,
}

impl CaptureRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[FrameCapture] {
        &self.frames
    }

    pub fn last(&self) -> Option<&FrameCapture> {
        self.frames.last()
    }

    pub fn into_frames(self) -> Vec<FrameCapture> {
        self.frames
    }
}

impl Renderer for CaptureRenderer {
    type Output = Option<FrameCapture>;

    fn render(&mut self, scene: &Scene, camera: NodeId) -> Option<FrameCapture> {
        let Some(cam) = scene.camera(camera) else {
            tracing::warn!(camera = %camera.short(), "camera node missing; frame skipped");
            return None;
        };
        let smoke = first_smoke(scene)?;
        let uniforms = &smoke.material.uniforms;
        let capture = FrameCapture {
            frame: self.frames.len() as u64,
            time: uniforms.time,
            opacity: uniforms.opacity,
            raw: uniforms.raw,
            color: uniforms.color.to_array(),
            wireframe: smoke.material.wireframe,
            texture_loaded: uniforms.perlin_texture.is_some(),
            model_attached: scene.model().is_some(),
            camera_position: cam.position.to_array(),
            aspect: cam.aspect,
        };
        self.frames.push(capture.clone());
        Some(capture)
    }
}

/// Debug text renderer.
///
/// Produces a human-readable description of the scene and the smoke uniforms.
/// Useful for CLI output and logging.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, scene: &Scene, camera: NodeId) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Scene ({} nodes) ===", scene.len());
        if let Some(cam) = scene.camera(camera) {
            let p = cam.position;
            let t = cam.target;
            let _ = write!(out, "Camera: eye=({:.2}, {:.2}, {:.2})", p.x, p.y, p.z);
            let _ = writeln!(
                out,
                " target=({:.2}, {:.2}, {:.2}) fov={:.0} aspect={:.3}",
                t.x, t.y, t.z, cam.fov_y_degrees, cam.aspect
            );
        }

        for node in scene.children() {
            let p = node.transform.position;
            let detail = match &node.kind {
                NodeKind::Camera(_) => "camera".to_string(),
                NodeKind::Model(model) => format!(
                    "model objects={} vertices={}",
                    model.objects.len(),
                    model.vertex_count()
                ),
                NodeKind::Smoke(mesh) => {
                    let u = &mesh.material.uniforms;
                    let c = u.color;
                    let texture = if u.perlin_texture.is_some() { "loaded" } else { "pending" };
                    let mut line = format!(
                        "smoke uTime={:.3} uOpacity={:.2} uRaw={}",
                        u.time, u.opacity, u.raw
                    );
                    let _ = write!(line, " uColor=({:.2}, {:.2}, {:.2})", c.r, c.g, c.b);
                    let _ = write!(
                        line,
                        " texture={texture} wireframe={}",
                        mesh.material.wireframe
                    );
                    line
                }
            };
            let _ = writeln!(
                out,
                "  [{}] {} pos=({:.2}, {:.2}, {:.2}) {}",
                node.id.short(),
                node.name,
                p.x,
                p.y,
                p.z,
                detail
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use smoke_common::Transform;
    use smoke_scene::{PerspectiveCamera, PlaneGeometry, SmokeMaterial};

    fn scene_with_smoke() -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let mut camera = PerspectiveCamera::new(25.0, 2.0, 0.1, 100.0);
        camera.position = Vec3::new(0.0, 6.0, 22.0);
        let cam = scene.add("camera", Transform::default(), NodeKind::Camera(camera));
        let mut material = SmokeMaterial::default();
        material.uniforms.time = 1.5;
        material.uniforms.raw = true;
        scene.add(
            "smoke",
            Transform::from_position(Vec3::new(0.0, 1.83, 0.0)),
            NodeKind::Smoke(SmokeMesh::new(PlaneGeometry::new(1.0, 1.0, 1, 1), material)),
        );
        (scene, cam)
    }

    #[test]
    fn debug_renderer_lists_nodes_and_uniforms() {
        let (scene, cam) = scene_with_smoke();
        let output = DebugTextRenderer::new().render(&scene, cam);

        assert!(output.contains("2 nodes"));
        assert!(output.contains("uTime=1.500"));
        assert!(output.contains("uRaw=true"));
        assert!(output.contains("texture=pending"));
        assert!(output.contains("aspect=2.000"));
    }

    #[test]
    fn capture_records_uniforms_per_frame() {
        let (scene, cam) = scene_with_smoke();
        let mut capture = CaptureRenderer::new();
        capture.render(&scene, cam);
        let second = capture.render(&scene, cam).unwrap();

        assert_eq!(capture.frames().len(), 2);
        assert_eq!(second.frame, 1);
        assert_eq!(second.time, 1.5);
        assert!(second.raw);
        assert!(!second.model_attached);
        assert_eq!(second.camera_position, [0.0, 6.0, 22.0]);
    }

    #[test]
    fn capture_skips_missing_camera() {
        let (scene, _) = scene_with_smoke();
        let mut capture = CaptureRenderer::new();
        assert!(capture.render(&scene, NodeId::new()).is_none());
        assert!(capture.last().is_none());
    }
}
