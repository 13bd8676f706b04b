use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use smoke_assets::Primitive;
use smoke_scene::{PlaneGeometry, SmokeUniforms};

/// Position plus texture coordinate; shared by the model and smoke pipelines.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct TexturedVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl TexturedVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x2,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Interleave positions and UVs. Missing UVs become (0, 0).
pub(crate) fn interleave(positions: &[[f32; 3]], uvs: &[[f32; 2]]) -> Vec<TexturedVertex> {
    positions
        .iter()
        .enumerate()
        .map(|(i, &position)| TexturedVertex {
            position,
            uv: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect()
}

pub(crate) fn primitive_vertices(primitive: &Primitive) -> Vec<TexturedVertex> {
    interleave(&primitive.positions, &primitive.uvs)
}

pub(crate) fn plane_vertices(plane: &PlaneGeometry) -> Vec<TexturedVertex> {
    interleave(&plane.positions, &plane.uvs)
}

/// `ModelUniforms` in the model shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct ModelUniformBlock {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub base_color: [f32; 4],
}

impl ModelUniformBlock {
    pub fn new(view_proj: Mat4, model: Mat4, base_color: [f32; 4]) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            base_color,
        }
    }
}

/// `SmokeUniforms` in `smoke.wgsl`. Field order and padding follow WGSL
/// uniform layout: `uColor` is a vec3 and starts on a 16-byte boundary.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct SmokeUniformBlock {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub time: f32,
    pub opacity: f32,
    pub raw: u32,
    pub _pad0: f32,
    pub color: [f32; 3],
    pub _pad1: f32,
}

impl SmokeUniformBlock {
    pub fn new(view_proj: Mat4, model: Mat4, uniforms: &SmokeUniforms) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            time: uniforms.time,
            opacity: uniforms.opacity,
            raw: u32::from(uniforms.raw),
            _pad0: 0.0,
            color: uniforms.color.to_array(),
            _pad1: 0.0,
        }
    }
}
