use smoke_assets::{SamplerSettings, TextureData, WrapMode};
use wgpu::util::DeviceExt;

/// A sampled texture on the GPU.
pub(crate) struct GpuTexture {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Whether texel values are color (gamma encoded) or raw data such as noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextureKind {
    Color,
    Data,
}

impl TextureKind {
    fn format(self) -> wgpu::TextureFormat {
        match self {
            Self::Color => wgpu::TextureFormat::Rgba8UnormSrgb,
            Self::Data => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

pub(crate) fn address_mode(mode: WrapMode) -> wgpu::AddressMode {
    match mode {
        WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
        WrapMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
    }
}

/// Sampler for `settings`. Filtering is linear throughout, which wgpu
/// requires whenever `anisotropy_clamp` is above 1.
pub(crate) fn sampler_descriptor(settings: &SamplerSettings) -> wgpu::SamplerDescriptor<'static> {
    wgpu::SamplerDescriptor {
        label: Some("texture_sampler"),
        address_mode_u: address_mode(settings.wrap_u),
        address_mode_v: address_mode(settings.wrap_v),
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        anisotropy_clamp: settings.anisotropy.clamp(1, 16),
        ..Default::default()
    }
}

impl GpuTexture {
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &TextureData,
        kind: TextureKind,
    ) -> Self {
        let width = data.width.max(1);
        let height = data.height.max(1);
        let expected = (width * height * 4) as usize;

        // Short or empty pixel data falls back to opaque white.
        let white;
        let pixels: &[u8] = if data.rgba.len() >= expected {
            &data.rgba[..expected]
        } else {
            tracing::warn!(
                name = %data.name,
                got = data.rgba.len(),
                expected,
                "texture data too short; using white"
            );
            white = vec![255u8; expected];
            &white
        };

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(data.name.as_str()),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: kind.format(),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            pixels,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&sampler_descriptor(&data.sampler));

        tracing::debug!(
            name = %data.name,
            width,
            height,
            anisotropy = data.sampler.anisotropy,
            "texture uploaded"
        );
        Self { view, sampler }
    }

    /// 1x1 texture of a single color, bound until real data arrives.
    pub fn solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        rgba: [u8; 4],
        kind: TextureKind,
    ) -> Self {
        let mut data = TextureData::new(name, 1, 1, rgba.to_vec());
        data.set_wrap(WrapMode::Repeat);
        Self::upload(device, queue, &data, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_modes_map_to_address_modes() {
        assert_eq!(address_mode(WrapMode::Repeat), wgpu::AddressMode::Repeat);
        assert_eq!(address_mode(WrapMode::ClampToEdge), wgpu::AddressMode::ClampToEdge);
        assert_eq!(address_mode(WrapMode::MirroredRepeat), wgpu::AddressMode::MirrorRepeat);
    }

    #[test]
    fn anisotropic_sampler_uses_linear_filters() {
        let mut data = TextureData::new("baked", 1, 1, vec![0; 4]);
        data.set_anisotropy(8);
        let desc = sampler_descriptor(&data.sampler);
        assert_eq!(desc.anisotropy_clamp, 8);
        assert_eq!(desc.mag_filter, wgpu::FilterMode::Linear);
        assert_eq!(desc.min_filter, wgpu::FilterMode::Linear);
        assert_eq!(desc.mipmap_filter, wgpu::FilterMode::Linear);
    }

    #[test]
    fn noise_sampler_repeats_both_axes() {
        let mut data = TextureData::new("perlin", 1, 1, vec![0; 4]);
        data.set_wrap(WrapMode::Repeat);
        let desc = sampler_descriptor(&data.sampler);
        assert_eq!(desc.address_mode_u, wgpu::AddressMode::Repeat);
        assert_eq!(desc.address_mode_v, wgpu::AddressMode::Repeat);
        assert_eq!(desc.anisotropy_clamp, 1);
    }

    #[test]
    fn data_and_color_formats_differ() {
        assert_eq!(TextureKind::Data.format(), wgpu::TextureFormat::Rgba8Unorm);
        assert!(TextureKind::Color.format().is_srgb());
    }
}
