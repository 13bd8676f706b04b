use std::collections::BTreeMap;
use std::sync::Arc;

use glam::Mat4;
use smoke_assets::{LoadedModel, TextureData};
use smoke_common::{BufferSize, NodeId};
use smoke_render::Renderer;
use smoke_scene::{NodeKind, Scene, SmokeMesh};
use wgpu::util::DeviceExt;

use crate::mesh::{self, ModelUniformBlock, SmokeUniformBlock, TexturedVertex};
use crate::shaders;
use crate::targets::{DEPTH_FORMAT, RenderTargets, SAMPLE_COUNT};
use crate::texture::{GpuTexture, TextureKind};

/// What one frame submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: u32,
    pub triangles: u32,
    pub buffer: BufferSize,
}

struct GpuPrimitive {
    world_transform: Mat4,
    base_color: [f32; 4],
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct GpuModel {
    primitives: Vec<GpuPrimitive>,
    // Held so the textures live as long as the model.
    _textures: Vec<GpuTexture>,
}

struct GpuSmoke {
    vertex_buffer: wgpu::Buffer,
    triangle_indices: wgpu::Buffer,
    triangle_index_count: u32,
    line_indices: wgpu::Buffer,
    line_index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    noise_source: Option<Arc<TextureData>>,
    _noise: Option<GpuTexture>,
}

/// wgpu-based scene renderer.
pub struct WgpuRenderer {
    surface_format: wgpu::TextureFormat,
    model_layout: wgpu::BindGroupLayout,
    smoke_layout: wgpu::BindGroupLayout,
    blit_layout: wgpu::BindGroupLayout,
    model_pipeline: wgpu::RenderPipeline,
    smoke_pipeline: wgpu::RenderPipeline,
    smoke_wire_pipeline: wgpu::RenderPipeline,
    blit_pipeline: wgpu::RenderPipeline,
    blit_sampler: wgpu::Sampler,
    targets: RenderTargets,
    white: GpuTexture,
    placeholder_noise: GpuTexture,
    models: BTreeMap<NodeId, GpuModel>,
    smokes: BTreeMap<NodeId, GpuSmoke>,
}

/// Uniform buffer, texture and sampler bound at group 0.
fn textured_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

fn textured_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    uniforms: &wgpu::Buffer,
    texture: &GpuTexture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
    })
}

struct PipelineSpec<'a> {
    label: &'a str,
    shader: &'a wgpu::ShaderModule,
    vs: &'a str,
    fs: &'a str,
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    blend: wgpu::BlendState,
    depth_write: bool,
}

fn scene_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    spec: PipelineSpec<'_>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: spec.shader,
            entry_point: Some(spec.vs),
            compilation_options: Default::default(),
            buffers: &[TexturedVertex::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: spec.shader,
            entry_point: Some(spec.fs),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(spec.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: spec.topology,
            cull_mode: spec.cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: spec.depth_write,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: SAMPLE_COUNT,
            ..Default::default()
        },
        multiview: None,
        cache: None,
    })
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        buffer: BufferSize,
    ) -> Self {
        let model_layout = textured_layout(device, "model_bind_group_layout");
        let smoke_layout = textured_layout(device, "smoke_bind_group_layout");
        let blit_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        // Model pipeline
        let model_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("model_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MODEL_SHADER.into()),
        });
        let model_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("model_pipeline_layout"),
            bind_group_layouts: &[&model_layout],
            push_constant_ranges: &[],
        });
        let model_pipeline = scene_pipeline(
            device,
            &model_pipeline_layout,
            surface_format,
            PipelineSpec {
                label: "model_pipeline",
                shader: &model_shader,
                vs: "vs_model",
                fs: "fs_model",
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                blend: wgpu::BlendState::REPLACE,
                depth_write: true,
            },
        );

        // Smoke pipelines: filled and wireframe
        let smoke_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("smoke_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SMOKE_SHADER.into()),
        });
        let smoke_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("smoke_pipeline_layout"),
            bind_group_layouts: &[&smoke_layout],
            push_constant_ranges: &[],
        });
        let smoke_pipeline = scene_pipeline(
            device,
            &smoke_pipeline_layout,
            surface_format,
            PipelineSpec {
                label: "smoke_pipeline",
                shader: &smoke_shader,
                vs: "vs_smoke",
                fs: "fs_smoke",
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                blend: wgpu::BlendState::ALPHA_BLENDING,
                depth_write: false,
            },
        );
        let smoke_wire_pipeline = scene_pipeline(
            device,
            &smoke_pipeline_layout,
            surface_format,
            PipelineSpec {
                label: "smoke_wire_pipeline",
                shader: &smoke_shader,
                vs: "vs_smoke",
                fs: "fs_smoke",
                topology: wgpu::PrimitiveTopology::LineList,
                cull_mode: None,
                blend: wgpu::BlendState::ALPHA_BLENDING,
                depth_write: false,
            },
        );

        // Blit pipeline
        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BLIT_SHADER.into()),
        });
        let blit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit_pipeline_layout"),
            bind_group_layouts: &[&blit_layout],
            push_constant_ranges: &[],
        });
        let blit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blit_pipeline"),
            layout: Some(&blit_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &blit_shader,
                entry_point: Some("vs_blit"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &blit_shader,
                entry_point: Some("fs_blit"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: Default::default(),
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });
        let blit_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blit_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let targets =
            RenderTargets::new(device, surface_format, buffer, &blit_layout, &blit_sampler);
        let white = GpuTexture::solid(device, queue, "white", [255; 4], TextureKind::Color);
        // Mid-grey noise until perlin.png arrives.
        let placeholder_noise = GpuTexture::solid(
            device,
            queue,
            "placeholder_noise",
            [128, 128, 128, 255],
            TextureKind::Data,
        );

        tracing::info!(
            format = ?surface_format,
            width = targets.size.width,
            height = targets.size.height,
            samples = SAMPLE_COUNT,
            "renderer initialized"
        );

        Self {
            surface_format,
            model_layout,
            smoke_layout,
            blit_layout,
            model_pipeline,
            smoke_pipeline,
            smoke_wire_pipeline,
            blit_pipeline,
            blit_sampler,
            targets,
            white,
            placeholder_noise,
            models: BTreeMap::new(),
            smokes: BTreeMap::new(),
        }
    }

    /// Recreate the offscreen targets for a new draw-buffer size.
    pub fn resize(&mut self, device: &wgpu::Device, buffer: BufferSize) {
        if buffer == self.targets.size {
            return;
        }
        self.targets = RenderTargets::new(
            device,
            self.surface_format,
            buffer,
            &self.blit_layout,
            &self.blit_sampler,
        );
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn buffer_size(&self) -> BufferSize {
        self.targets.size
    }

    fn upload_model(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        model: &LoadedModel,
    ) -> GpuModel {
        let textures: Vec<GpuTexture> = model
            .textures
            .iter()
            .map(|t| GpuTexture::upload(device, queue, t, TextureKind::Color))
            .collect();

        let mut primitives = Vec::new();
        for object in &model.objects {
            for primitive in &object.primitives {
                if primitive.positions.is_empty() {
                    continue;
                }
                let vertices = mesh::primitive_vertices(primitive);
                let indices: Vec<u32> = if primitive.indices.is_empty() {
                    (0..vertices.len() as u32).collect()
                } else {
                    primitive.indices.clone()
                };

                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(object.name.as_str()),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(object.name.as_str()),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("model_uniforms"),
                    contents: bytemuck::bytes_of(&ModelUniformBlock::new(
                        Mat4::IDENTITY,
                        object.world_transform,
                        primitive.base_color,
                    )),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let texture = primitive
                    .texture
                    .and_then(|i| textures.get(i))
                    .unwrap_or(&self.white);
                let bind_group = textured_bind_group(
                    device,
                    "model_bind_group",
                    &self.model_layout,
                    &uniform_buffer,
                    texture,
                );

                primitives.push(GpuPrimitive {
                    world_transform: object.world_transform,
                    base_color: primitive.base_color,
                    vertex_buffer,
                    index_buffer,
                    index_count: indices.len() as u32,
                    uniform_buffer,
                    bind_group,
                });
            }
        }

        tracing::info!(
            objects = model.objects.len(),
            primitives = primitives.len(),
            textures = textures.len(),
            "model uploaded"
        );
        GpuModel {
            primitives,
            _textures: textures,
        }
    }

    fn upload_smoke(&self, device: &wgpu::Device, smoke: &SmokeMesh) -> GpuSmoke {
        let vertices = mesh::plane_vertices(&smoke.geometry);
        let lines = smoke.geometry.wireframe_indices();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("smoke_vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let triangle_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("smoke_indices"),
            contents: bytemuck::cast_slice(&smoke.geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let line_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("smoke_line_indices"),
            contents: bytemuck::cast_slice(&lines),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("smoke_uniforms"),
            size: std::mem::size_of::<SmokeUniformBlock>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = textured_bind_group(
            device,
            "smoke_bind_group",
            &self.smoke_layout,
            &uniform_buffer,
            &self.placeholder_noise,
        );

        GpuSmoke {
            vertex_buffer,
            triangle_indices,
            triangle_index_count: smoke.geometry.indices.len() as u32,
            line_indices,
            line_index_count: lines.len() as u32,
            uniform_buffer,
            bind_group,
            noise_source: None,
            _noise: None,
        }
    }

    /// Create GPU resources for nodes seen for the first time and pick up a
    /// newly bound noise texture.
    fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &Scene) {
        for node in scene.children() {
            match &node.kind {
                NodeKind::Model(model) if !self.models.contains_key(&node.id) => {
                    let gpu = self.upload_model(device, queue, model);
                    self.models.insert(node.id, gpu);
                }
                NodeKind::Smoke(smoke) => {
                    if !self.smokes.contains_key(&node.id) {
                        let gpu = self.upload_smoke(device, smoke);
                        self.smokes.insert(node.id, gpu);
                    }
                    let Some(gpu) = self.smokes.get_mut(&node.id) else {
                        continue;
                    };
                    let source = &smoke.material.uniforms.perlin_texture;
                    let changed = match (source, &gpu.noise_source) {
                        (Some(new), Some(old)) => !Arc::ptr_eq(new, old),
                        (Some(_), None) => true,
                        _ => false,
                    };
                    if let (true, Some(data)) = (changed, source) {
                        let noise = GpuTexture::upload(device, queue, data, TextureKind::Data);
                        gpu.bind_group = textured_bind_group(
                            device,
                            "smoke_bind_group",
                            &self.smoke_layout,
                            &gpu.uniform_buffer,
                            &noise,
                        );
                        gpu.noise_source = Some(Arc::clone(data));
                        gpu._noise = Some(noise);
                    }
                }
                _ => {}
            }
        }
    }

    /// Render one frame of `scene` through `camera` onto `view`.
    pub fn render_scene(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &Scene,
        camera: NodeId,
    ) -> FrameStats {
        let mut stats = FrameStats {
            buffer: self.targets.size,
            ..FrameStats::default()
        };
        let Some(cam) = scene.camera(camera) else {
            tracing::warn!(camera = %camera.short(), "camera node missing; frame skipped");
            return stats;
        };
        let view_proj = cam.view_projection();

        self.sync(device, queue, scene);

        // Uniform uploads
        for node in scene.children() {
            match &node.kind {
                NodeKind::Model(_) => {
                    if let Some(gpu) = self.models.get(&node.id) {
                        let node_matrix = node.transform.matrix();
                        for p in &gpu.primitives {
                            let model = node_matrix * p.world_transform;
                            let block = ModelUniformBlock::new(view_proj, model, p.base_color);
                            queue.write_buffer(&p.uniform_buffer, 0, bytemuck::bytes_of(&block));
                        }
                    }
                }
                NodeKind::Smoke(smoke) => {
                    if let Some(gpu) = self.smokes.get(&node.id) {
                        let block = SmokeUniformBlock::new(
                            view_proj,
                            node.transform.matrix(),
                            &smoke.material.uniforms,
                        );
                        queue.write_buffer(&gpu.uniform_buffer, 0, bytemuck::bytes_of(&block));
                    }
                }
                NodeKind::Camera(_) => {}
            }
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.msaa,
                    resolve_target: Some(&self.targets.resolve),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Discard,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            // Opaque model first
            pass.set_pipeline(&self.model_pipeline);
            for node in scene.children() {
                let Some(gpu) = self.models.get(&node.id) else {
                    continue;
                };
                for p in &gpu.primitives {
                    pass.set_bind_group(0, &p.bind_group, &[]);
                    pass.set_vertex_buffer(0, p.vertex_buffer.slice(..));
                    pass.set_index_buffer(p.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..p.index_count, 0, 0..1);
                    stats.draw_calls += 1;
                    stats.triangles += p.index_count / 3;
                }
            }

            // Transparent smoke last
            for node in scene.children() {
                let NodeKind::Smoke(smoke) = &node.kind else {
                    continue;
                };
                let Some(gpu) = self.smokes.get(&node.id) else {
                    continue;
                };
                pass.set_bind_group(0, &gpu.bind_group, &[]);
                pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                if smoke.material.wireframe {
                    pass.set_pipeline(&self.smoke_wire_pipeline);
                    pass.set_index_buffer(
                        gpu.line_indices.slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    pass.draw_indexed(0..gpu.line_index_count, 0, 0..1);
                } else {
                    pass.set_pipeline(&self.smoke_pipeline);
                    pass.set_index_buffer(
                        gpu.triangle_indices.slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    pass.draw_indexed(0..gpu.triangle_index_count, 0, 0..1);
                    stats.triangles += gpu.triangle_index_count / 3;
                }
                stats.draw_calls += 1;
            }
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("blit_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
            pass.set_pipeline(&self.blit_pipeline);
            pass.set_bind_group(0, &self.targets.blit_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
        stats
    }
}

/// A [`WgpuRenderer`] bound to this frame's device, queue and surface view,
/// so the sketch can drive it through the [`Renderer`] trait.
pub struct FrameTarget<'a> {
    pub renderer: &'a mut WgpuRenderer,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub view: &'a wgpu::TextureView,
}

impl Renderer for FrameTarget<'_> {
    type Output = FrameStats;

    fn render(&mut self, scene: &Scene, camera: NodeId) -> FrameStats {
        self.renderer
            .render_scene(self.device, self.queue, self.view, scene, camera)
    }
}
