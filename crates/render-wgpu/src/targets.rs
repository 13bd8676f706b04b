use smoke_common::BufferSize;

/// Multisample count of the scene pass.
pub const SAMPLE_COUNT: u32 = 4;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Offscreen attachments at draw-buffer size.
///
/// The scene renders into `msaa`, resolves into `resolve`, and `blit_bind_group`
/// samples `resolve` when stretching it over the surface.
pub(crate) struct RenderTargets {
    pub size: BufferSize,
    pub msaa: wgpu::TextureView,
    pub depth: wgpu::TextureView,
    pub resolve: wgpu::TextureView,
    pub blit_bind_group: wgpu::BindGroup,
}

impl RenderTargets {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: BufferSize,
        blit_layout: &wgpu::BindGroupLayout,
        blit_sampler: &wgpu::Sampler,
    ) -> Self {
        let size = BufferSize {
            width: size.width.max(1),
            height: size.height.max(1),
        };
        let msaa = attachment(
            device,
            "msaa_color",
            size,
            format,
            SAMPLE_COUNT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        let depth = attachment(
            device,
            "depth_texture",
            size,
            DEPTH_FORMAT,
            SAMPLE_COUNT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        let resolve = attachment(
            device,
            "resolve_color",
            size,
            format,
            1,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );

        let blit_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit_bind_group"),
            layout: blit_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&resolve),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(blit_sampler),
                },
            ],
        });

        tracing::debug!(width = size.width, height = size.height, "render targets created");
        Self {
            size,
            msaa,
            depth,
            resolve,
            blit_bind_group,
        }
    }
}

fn attachment(
    device: &wgpu::Device,
    label: &str,
    size: BufferSize,
    format: wgpu::TextureFormat,
    sample_count: u32,
    usage: wgpu::TextureUsages,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
