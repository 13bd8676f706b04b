use std::path::{Path, PathBuf};

use glam::Mat4;

use crate::AssetError;
use crate::texture::{TextureData, WrapMode};

/// One triangle list from a glTF mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub base_color: [f32; 4],
    /// Index into [`LoadedModel::textures`] for the base color map.
    pub texture: Option<usize>,
}

/// A named mesh node with its transform flattened to model space.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelObject {
    pub name: String,
    pub world_transform: Mat4,
    pub primitives: Vec<Primitive>,
}

/// A fully decoded glTF scene, ready to be attached to the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModel {
    pub source: PathBuf,
    pub objects: Vec<ModelObject>,
    pub textures: Vec<TextureData>,
}

impl LoadedModel {
    /// Find a mesh object by node name.
    pub fn object_by_name(&self, name: &str) -> Option<&ModelObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// Raise the anisotropic filtering level of every texture used by the
    /// named object. Returns how many textures were changed.
    pub fn set_object_anisotropy(&mut self, name: &str, level: u16) -> Result<usize, AssetError> {
        let object = self
            .object_by_name(name)
            .ok_or_else(|| AssetError::ObjectNotFound(name.to_string()))?;

        let mut targets: Vec<usize> = object.primitives.iter().filter_map(|p| p.texture).collect();
        targets.sort_unstable();
        targets.dedup();

        let mut changed = 0;
        for index in targets {
            if let Some(texture) = self.textures.get_mut(index) {
                texture.set_anisotropy(level);
                changed += 1;
            }
        }
        Ok(changed)
    }

    pub fn vertex_count(&self) -> usize {
        self.primitives().map(|p| p.positions.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.primitives().map(|p| p.indices.len() / 3).sum()
    }

    fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.objects.iter().flat_map(|o| o.primitives.iter())
    }
}

/// Load a glTF or GLB file, flattening the default scene into mesh objects.
pub fn load_gltf(path: impl AsRef<Path>) -> Result<LoadedModel, AssetError> {
    let path = path.as_ref();
    let (document, buffers, images) = gltf::import(path)?;

    let mut textures = Vec::new();
    for texture in document.textures() {
        let context = format!("{} texture #{}", path.display(), texture.index());
        let Some(image) = images.get(texture.source().index()) else {
            return Err(AssetError::UnsupportedImageFormat {
                context,
                format: "missing image source".into(),
            });
        };
        let mut data = TextureData::new(
            texture.name().unwrap_or(context.as_str()).to_string(),
            image.width,
            image.height,
            to_rgba8(image, &context)?,
        );
        let sampler = texture.sampler();
        data.sampler.wrap_u = wrap_mode(sampler.wrap_s());
        data.sampler.wrap_v = wrap_mode(sampler.wrap_t());
        textures.push(data);
    }

    let mut objects = Vec::new();
    if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
        for node in scene.nodes() {
            collect_node(&node, Mat4::IDENTITY, &buffers, &mut objects);
        }
    }

    let model = LoadedModel {
        source: path.to_path_buf(),
        objects,
        textures,
    };
    tracing::info!(
        path = %path.display(),
        objects = model.objects.len(),
        vertices = model.vertex_count(),
        textures = model.textures.len(),
        "loaded model"
    );
    Ok(model)
}

fn collect_node(
    node: &gltf::Node<'_>,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<ModelObject>,
) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let primitives = mesh
            .primitives()
            .filter_map(|p| read_primitive(&p, buffers))
            .collect();
        out.push(ModelObject {
            name: node.name().unwrap_or_default().to_string(),
            world_transform: world,
            primitives,
        });
    }

    for child in node.children() {
        collect_node(&child, world, buffers, out);
    }
}

fn read_primitive(
    primitive: &gltf::Primitive<'_>,
    buffers: &[gltf::buffer::Data],
) -> Option<Primitive> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        tracing::warn!(mode = ?primitive.mode(), "skipping non-triangle primitive");
        return None;
    }

    let reader = primitive.reader(|b| buffers.get(b.index()).map(|data| data.0.as_slice()));
    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();

    let pbr = primitive.material().pbr_metallic_roughness();
    let color_map = pbr.base_color_texture();
    let uv_set = color_map.as_ref().map(|info| info.tex_coord()).unwrap_or(0);

    let uvs = reader
        .read_tex_coords(uv_set)
        .map(|tc| tc.into_f32().collect())
        .unwrap_or_else(|| vec![[0.0, 0.0]; positions.len()]);
    let indices = reader
        .read_indices()
        .map(|i| i.into_u32().collect())
        .unwrap_or_else(|| (0..positions.len() as u32).collect());

    Some(Primitive {
        positions,
        uvs,
        indices,
        base_color: pbr.base_color_factor(),
        texture: color_map.map(|info| info.texture().index()),
    })
}

fn wrap_mode(mode: gltf::texture::WrappingMode) -> WrapMode {
    match mode {
        gltf::texture::WrappingMode::ClampToEdge => WrapMode::ClampToEdge,
        gltf::texture::WrappingMode::MirroredRepeat => WrapMode::MirroredRepeat,
        gltf::texture::WrappingMode::Repeat => WrapMode::Repeat,
    }
}

fn to_rgba8(image: &gltf::image::Data, context: &str) -> Result<Vec<u8>, AssetError> {
    use gltf::image::Format;

    let px = &image.pixels;
    let rgba = match image.format {
        Format::R8G8B8A8 => px.clone(),
        Format::R8G8B8 => px.chunks_exact(3).flat_map(|c| [c[0], c[1], c[2], 255]).collect(),
        Format::R8G8 => px.chunks_exact(2).flat_map(|c| [c[0], c[0], c[0], c[1]]).collect(),
        Format::R8 => px.iter().flat_map(|&l| [l, l, l, 255]).collect(),
        other => {
            return Err(AssetError::UnsupportedImageFormat {
                context: context.to_string(),
                format: format!("{other:?}"),
            });
        }
    };
    Ok(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    // One textured triangle under a "baked" node, parented to a translated root.
    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [
            { "name": "root", "translation": [1.0, 0.0, 0.0], "children": [1] },
            { "name": "baked", "mesh": 0, "translation": [0.0, 2.0, 0.0] }
        ],
        "meshes": [{
            "primitives": [{
                "attributes": { "POSITION": 0, "TEXCOORD_0": 1 },
                "indices": 2,
                "material": 0
            }]
        }],
        "materials": [{
            "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } }
        }],
        "textures": [{ "source": 0, "sampler": 0 }],
        "samplers": [{ "wrapS": 10497, "wrapT": 33071 }],
        "images": [{
            "uri": "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAIAAAABCAYAAAD0In+KAAAADklEQVR4nGP4z8DwHwQBEPgD/U6VwW8AAAAASUVORK5CYII="
        }],
        "buffers": [{
            "byteLength": 68,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAIA/AAAAAAAAAAAAAIA/AAABAAIAAAA="
        }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 24, "target": 34962 },
            { "buffer": 0, "byteOffset": 60, "byteLength": 6, "target": 34963 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC2" },
            { "bufferView": 2, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ]
    }"#;

    fn write_fixture() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.gltf");
        std::fs::write(&path, TRIANGLE_GLTF).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_named_object_with_flattened_transform() {
        let (_dir, path) = write_fixture();
        let model = load_gltf(&path).unwrap();

        assert_eq!(model.objects.len(), 1);
        let baked = model.object_by_name("baked").unwrap();
        let origin = baked.world_transform.transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(1.0, 2.0, 0.0));

        let prim = &baked.primitives[0];
        assert_eq!(prim.positions[1], [1.0, 0.0, 0.0]);
        assert_eq!(prim.uvs[2], [0.0, 1.0]);
        assert_eq!(prim.indices, vec![0, 1, 2]);
        assert_eq!(prim.texture, Some(0));
        assert_eq!(model.vertex_count(), 3);
        assert_eq!(model.triangle_count(), 1);
    }

    #[test]
    fn decodes_embedded_texture_and_sampler() {
        let (_dir, path) = write_fixture();
        let model = load_gltf(&path).unwrap();

        let tex = &model.textures[0];
        assert_eq!((tex.width, tex.height), (2, 1));
        assert_eq!(&tex.rgba[..4], &[255, 0, 0, 255]);
        assert_eq!(tex.sampler.wrap_u, WrapMode::Repeat);
        assert_eq!(tex.sampler.wrap_v, WrapMode::ClampToEdge);
        assert_eq!(tex.sampler.anisotropy, 1);
    }

    #[test]
    fn anisotropy_targets_named_object() {
        let (_dir, path) = write_fixture();
        let mut model = load_gltf(&path).unwrap();

        assert_eq!(model.set_object_anisotropy("baked", 8).unwrap(), 1);
        assert_eq!(model.textures[0].sampler.anisotropy, 8);

        let err = model.set_object_anisotropy("missing", 8).unwrap_err();
        assert!(matches!(err, AssetError::ObjectNotFound(name) if name == "missing"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_gltf(dir.path().join("bakedModel.glb")).is_err());
    }
}
