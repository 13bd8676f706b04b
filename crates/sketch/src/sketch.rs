use std::sync::Arc;

use glam::Vec3;
use smoke_assets::{
    AssetError, AssetPaths, LoadedModel, Pending, TextureData, WrapMode, load_gltf, load_texture,
};
use smoke_common::{BufferSize, NodeId, Transform, Viewport};
use smoke_input::OrbitAction;
use smoke_render::Renderer;
use smoke_scene::{
    NodeKind, OrbitControls, PerspectiveCamera, PlaneGeometry, Scene, SmokeMaterial, SmokeMesh,
    SmokeUniforms,
};

use crate::controls::{ControlEdit, ControlId, ControlValue, OPACITY_RANGE, SPEED_RANGE};
use crate::tweaks::{DEFAULT_OPACITY, Tweaks};

pub const CAMERA_FOV_DEGREES: f32 = 25.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 100.0;
pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 6.0, 22.0);
pub const ORBIT_TARGET: Vec3 = Vec3::new(0.0, 3.0, 0.0);
pub const SMOKE_HEIGHT: f32 = 1.83;

/// Name of the mesh object inside the model file that carries the baked lighting.
pub const BAKED_OBJECT: &str = "baked";
pub const BAKED_ANISOTROPY: u16 = 8;

/// Plane 1x1 with 16x64 segments, lifted so its base sits at the origin and
/// stretched into a column.
fn smoke_geometry() -> PlaneGeometry {
    let mut geometry = PlaneGeometry::new(1.0, 1.0, 16, 64);
    geometry
        .translate(Vec3::new(0.0, 0.5, 0.0))
        .scale(Vec3::new(1.5, 6.0, 1.5));
    geometry
}

/// All mutable state of the coffee smoke sketch.
#[derive(Debug)]
pub struct Sketch {
    scene: Scene,
    camera: NodeId,
    smoke: NodeId,
    controls: OrbitControls,
    tweaks: Tweaks,
    viewport: Viewport,
    pending_model: Option<Pending<LoadedModel>>,
    pending_texture: Option<Pending<TextureData>>,
    frames: u64,
}

impl Sketch {
    /// Build the scene: camera, orbit controls and the smoke plane. The model
    /// and noise texture arrive later through [`Sketch::load_assets`].
    pub fn new(viewport: Viewport) -> Self {
        let tweaks = Tweaks::default();
        let mut scene = Scene::new();

        let mut camera = PerspectiveCamera::new(
            CAMERA_FOV_DEGREES,
            viewport.aspect(),
            CAMERA_NEAR,
            CAMERA_FAR,
        );
        camera.position = CAMERA_POSITION;
        camera.look_at(ORBIT_TARGET);

        let mut controls = OrbitControls::new(ORBIT_TARGET);
        controls.enable_damping = true;
        controls.update(&mut camera);

        let camera = scene.add("camera", Transform::default(), NodeKind::Camera(camera));

        let material = SmokeMaterial::with_uniforms(SmokeUniforms {
            time: 0.0,
            perlin_texture: None,
            color: tweaks.color,
            opacity: DEFAULT_OPACITY,
            raw: tweaks.raw,
        });
        let smoke = scene.add(
            "smoke",
            Transform::from_position(Vec3::new(0.0, SMOKE_HEIGHT, 0.0)),
            NodeKind::Smoke(SmokeMesh::new(smoke_geometry(), material)),
        );

        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            pixel_ratio = viewport.pixel_ratio(),
            "sketch created"
        );

        Self {
            scene,
            camera,
            smoke,
            controls,
            tweaks,
            viewport,
            pending_model: None,
            pending_texture: None,
            frames: 0,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera_id(&self) -> NodeId {
        self.camera
    }

    pub fn smoke_id(&self) -> NodeId {
        self.smoke
    }

    pub fn camera(&self) -> Option<&PerspectiveCamera> {
        self.scene.camera(self.camera)
    }

    pub fn smoke(&self) -> Option<&SmokeMesh> {
        self.scene.smoke(self.smoke)
    }

    pub fn uniforms(&self) -> Option<&SmokeUniforms> {
        self.smoke().map(|s| &s.material.uniforms)
    }

    pub fn tweaks(&self) -> &Tweaks {
        &self.tweaks
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    /// Frames ticked so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn model_attached(&self) -> bool {
        self.scene.model().is_some()
    }

    // -- assets --

    /// Start loading the baked model and the noise texture on worker threads.
    pub fn load_assets(&mut self, paths: &AssetPaths) {
        let model_path = paths.model();
        let texture_path = paths.noise_texture();
        tracing::info!(
            model = %model_path.display(),
            texture = %texture_path.display(),
            "loading assets"
        );
        self.pending_model = Some(Pending::spawn("model", move || load_gltf(model_path)));
        self.pending_texture = Some(Pending::spawn("perlin", move || load_texture(texture_path)));
    }

    pub fn set_pending_model(&mut self, pending: Pending<LoadedModel>) {
        self.pending_model = Some(pending);
    }

    pub fn set_pending_texture(&mut self, pending: Pending<TextureData>) {
        self.pending_texture = Some(pending);
    }

    /// True while either load is still in flight.
    pub fn assets_pending(&self) -> bool {
        self.pending_model.is_some() || self.pending_texture.is_some()
    }

    /// Deliver any finished loads. Called once per frame on the render thread.
    pub fn poll_assets(&mut self) {
        if let Some(result) = self.pending_model.as_mut().and_then(|p| p.poll()) {
            self.pending_model = None;
            self.on_model_loaded(result);
        }
        if let Some(result) = self.pending_texture.as_mut().and_then(|p| p.poll()) {
            self.pending_texture = None;
            self.on_noise_texture_loaded(result);
        }
    }

    /// Block until both loads finish, then deliver them.
    pub fn wait_for_assets(&mut self) {
        if let Some(result) = self.pending_model.take().and_then(|mut p| p.wait()) {
            self.on_model_loaded(result);
        }
        if let Some(result) = self.pending_texture.take().and_then(|mut p| p.wait()) {
            self.on_noise_texture_loaded(result);
        }
    }

    /// Model-load callback: raise anisotropy on the baked texture and attach
    /// the model to the scene. Returns the new node, or `None` when the load
    /// failed or a model is already attached.
    pub fn on_model_loaded(&mut self, result: Result<LoadedModel, AssetError>) -> Option<NodeId> {
        let mut model = match result {
            Ok(model) => model,
            Err(e) => {
                tracing::error!("model load failed: {e}");
                return None;
            }
        };

        match model.set_object_anisotropy(BAKED_OBJECT, BAKED_ANISOTROPY) {
            Ok(changed) => {
                tracing::debug!(changed, "baked texture anisotropy set to {BAKED_ANISOTROPY}")
            }
            Err(e) => tracing::warn!("{e}; attaching model without anisotropy change"),
        }

        let objects = model.objects.len();
        match self.scene.attach_model("model", Arc::new(model)) {
            Ok(id) => {
                tracing::info!(id = %id.short(), objects, "model attached");
                Some(id)
            }
            Err(e) => {
                tracing::warn!("duplicate model delivery ignored: {e}");
                None
            }
        }
    }

    /// Noise-texture callback: switch to repeat addressing and bind to `uPerlinTexture`.
    pub fn on_noise_texture_loaded(&mut self, result: Result<TextureData, AssetError>) {
        let mut texture = match result {
            Ok(texture) => texture,
            Err(e) => {
                tracing::error!("noise texture load failed: {e}");
                return;
            }
        };
        texture.set_wrap(WrapMode::Repeat);
        tracing::info!(width = texture.width, height = texture.height, "noise texture bound");
        if let Some(smoke) = self.scene.smoke_mut(self.smoke) {
            smoke.material.uniforms.perlin_texture = Some(Arc::new(texture));
        }
    }

    // -- controls --

    /// Apply one widget edit. Numeric edits are clamped to the slider range.
    pub fn apply(&mut self, edit: ControlEdit) {
        tracing::debug!(?edit, "control edit");
        match edit {
            ControlEdit::Speed(v) => self.tweaks.speed = SPEED_RANGE.constrain(v),
            ControlEdit::Raw(v) => {
                self.tweaks.raw = v;
                if let Some(smoke) = self.scene.smoke_mut(self.smoke) {
                    smoke.material.uniforms.raw = v;
                }
            }
            ControlEdit::Wireframe(v) => {
                if let Some(smoke) = self.scene.smoke_mut(self.smoke) {
                    smoke.material.wireframe = v;
                }
            }
            ControlEdit::Opacity(v) => {
                if let Some(smoke) = self.scene.smoke_mut(self.smoke) {
                    smoke.material.uniforms.opacity = OPACITY_RANGE.constrain(v);
                }
            }
            ControlEdit::Color(c) => {
                let c = c.clamped();
                self.tweaks.color = c;
                if let Some(smoke) = self.scene.smoke_mut(self.smoke) {
                    smoke.material.uniforms.color = c;
                }
            }
        }
    }

    /// Current value behind a control.
    pub fn control_value(&self, id: ControlId) -> ControlValue {
        let smoke = self.smoke();
        match id {
            ControlId::Raw => ControlValue::Bool(self.tweaks.raw),
            ControlId::Speed => ControlValue::Number(self.tweaks.speed),
            ControlId::Wireframe => ControlValue::Bool(smoke.is_some_and(|s| s.material.wireframe)),
            ControlId::Opacity => {
                ControlValue::Number(smoke.map_or(DEFAULT_OPACITY, |s| s.material.uniforms.opacity))
            }
            ControlId::Color => ControlValue::Color(self.tweaks.color),
        }
    }

    // -- frame --

    /// Advance to `elapsed` seconds: write `uTime`, then step the orbit controls.
    pub fn tick(&mut self, elapsed: f32) {
        let time = elapsed * self.tweaks.speed;
        if let Some(smoke) = self.scene.smoke_mut(self.smoke) {
            smoke.material.uniforms.time = time;
        }
        if let Some(camera) = self.scene.camera_mut(self.camera) {
            self.controls.update(camera);
        }
        self.frames += 1;
    }

    /// One frame: tick, then draw through `renderer`.
    pub fn frame<R: Renderer>(&mut self, elapsed: f32, renderer: &mut R) -> R::Output {
        self.tick(elapsed);
        renderer.render(&self.scene, self.camera)
    }

    /// Window resize: update the camera aspect and return the draw-buffer size.
    pub fn resize(&mut self, viewport: Viewport) -> BufferSize {
        if viewport.is_empty() {
            tracing::debug!(
                width = viewport.width,
                height = viewport.height,
                "empty viewport; keeping previous size"
            );
            return self.viewport.buffer_size();
        }
        self.viewport = viewport;
        if let Some(camera) = self.scene.camera_mut(self.camera) {
            camera.set_aspect(viewport.aspect());
        }
        let size = viewport.buffer_size();
        tracing::debug!(
            width = size.width,
            height = size.height,
            aspect = viewport.aspect(),
            "viewport resized"
        );
        size
    }

    /// Feed pointer input to the orbit controls.
    pub fn orbit(&mut self, action: OrbitAction) {
        let height = self.viewport.height as f32;
        match action {
            OrbitAction::Rotate { dx, dy } => self.controls.rotate(dx, dy, height),
            OrbitAction::Pan { dx, dy } => {
                if let Some(camera) = self.scene.camera(self.camera) {
                    self.controls.pan(dx, dy, height, camera);
                }
            }
            OrbitAction::Dolly(steps) => self.controls.dolly(steps),
        }
    }
}
