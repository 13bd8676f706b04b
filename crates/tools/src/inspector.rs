use std::fmt;

use serde::Serialize;
use smoke_assets::LoadedModel;
use smoke_common::{BufferSize, NodeId};
use smoke_scene::{NodeTag, Scene};
use smoke_sketch::Sketch;
use smoke_sketch::sketch::BAKED_OBJECT;

/// Sketch inspector for developer tooling.
///
/// Provides read-only queries against the sketch for the debug panel and
/// the CLI.
pub struct SketchInspector;

impl SketchInspector {
    /// Produce a summary of the sketch state.
    pub fn summary(sketch: &Sketch) -> SketchSummary {
        let uniforms = sketch.uniforms();
        SketchSummary {
            frames: sketch.frames(),
            node_count: sketch.scene().len(),
            model_attached: sketch.model_attached(),
            texture_loaded: uniforms.is_some_and(|u| u.perlin_texture.is_some()),
            assets_pending: sketch.assets_pending(),
            time: uniforms.map_or(0.0, |u| u.time),
            buffer: sketch.viewport().buffer_size(),
            camera_distance: sketch
                .camera()
                .map_or(0.0, |c| c.position.distance(sketch.controls().target)),
        }
    }

    /// Describe one node of the scene.
    pub fn inspect_node(scene: &Scene, id: NodeId) -> Option<NodeInfo> {
        scene.get(id).map(|node| {
            let p = node.transform.position;
            let s = node.transform.scale;
            NodeInfo {
                id,
                name: node.name.clone(),
                tag: node.kind.tag(),
                position: [p.x, p.y, p.z],
                scale: [s.x, s.y, s.z],
            }
        })
    }

    /// All node ids in draw order.
    pub fn list_nodes(scene: &Scene) -> Vec<NodeId> {
        scene.children().iter().map(|n| n.id).collect()
    }

    /// Describe a loaded model file.
    pub fn model_report(model: &LoadedModel) -> ModelReport {
        let objects: Vec<ObjectReport> = model
            .objects
            .iter()
            .map(|o| ObjectReport {
                name: o.name.clone(),
                primitives: o.primitives.len(),
                vertices: o.primitives.iter().map(|p| p.positions.len()).sum(),
                textured: o.primitives.iter().any(|p| p.texture.is_some()),
            })
            .collect();
        ModelReport {
            source: model.source.display().to_string(),
            baked_found: model.object_by_name(BAKED_OBJECT).is_some(),
            textures: model.textures.len(),
            vertices: model.vertex_count(),
            triangles: model.triangle_count(),
            objects,
        }
    }
}

/// Summary of sketch state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct SketchSummary {
    pub frames: u64,
    pub node_count: usize,
    pub model_attached: bool,
    pub texture_loaded: bool,
    pub assets_pending: bool,
    pub time: f32,
    pub buffer: BufferSize,
    pub camera_distance: f32,
}

impl fmt::Display for SketchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sketch: frames={} nodes={} model={} texture={}",
            self.frames,
            self.node_count,
            if self.model_attached { "attached" } else { "pending" },
            if self.texture_loaded { "loaded" } else { "pending" },
        )?;
        write!(
            f,
            " uTime={:.2} buffer={}x{} distance={:.2}",
            self.time, self.buffer.width, self.buffer.height, self.camera_distance,
        )
    }
}

/// Detailed info about a single scene node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub tag: NodeTag,
    pub position: [f32; 3],
    pub scale: [f32; 3],
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Node [{}] {} ({:?}) pos=({:.2}, {:.2}, {:.2})",
            self.id.short(),
            self.name,
            self.tag,
            self.position[0],
            self.position[1],
            self.position[2],
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectReport {
    pub name: String,
    pub primitives: usize,
    pub vertices: usize,
    pub textured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub source: String,
    pub baked_found: bool,
    pub textures: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub objects: Vec<ObjectReport>,
}

impl fmt::Display for ModelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Model {}: {} objects, {} textures, {} vertices, {} triangles",
            self.source,
            self.objects.len(),
            self.textures,
            self.vertices,
            self.triangles
        )?;
        for o in &self.objects {
            writeln!(
                f,
                "  {} primitives={} vertices={}{}",
                o.name,
                o.primitives,
                o.vertices,
                if o.textured { " textured" } else { "" }
            )?;
        }
        let baked = if self.baked_found { "found" } else { "missing" };
        write!(f, "baked object: {baked}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;
    use smoke_assets::{ModelObject, Primitive, TextureData};
    use smoke_common::Viewport;

    fn model(name: &str) -> LoadedModel {
        LoadedModel {
            source: "bakedModel.glb".into(),
            objects: vec![ModelObject {
                name: name.to_string(),
                world_transform: Mat4::IDENTITY,
                primitives: vec![Primitive {
                    positions: vec![[0.0; 3]; 4],
                    uvs: vec![[0.0; 2]; 4],
                    indices: vec![0, 1, 2, 0, 2, 3],
                    base_color: [1.0; 4],
                    texture: Some(0),
                }],
            }],
            textures: vec![TextureData::new("baked", 1, 1, vec![0; 4])],
        }
    }

    #[test]
    fn summary_fresh_sketch() {
        let sketch = Sketch::new(Viewport::new(800.0, 600.0, 2.0));
        let summary = SketchInspector::summary(&sketch);
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.node_count, 2);
        assert!(!summary.model_attached);
        assert!(!summary.texture_loaded);
        assert_eq!(
            summary.buffer,
            BufferSize {
                width: 1600,
                height: 1200
            }
        );
        assert!(summary.camera_distance > 20.0);
    }

    #[test]
    fn summary_after_ticks_and_model() {
        let mut sketch = Sketch::new(Viewport::default());
        sketch.on_model_loaded(Ok(model("baked")));
        sketch.tick(0.5);
        sketch.tick(1.0);

        let summary = SketchInspector::summary(&sketch);
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.node_count, 3);
        assert!(summary.model_attached);
        assert_eq!(summary.time, 1.0);
        assert!(format!("{summary}").contains("model=attached"));
    }

    #[test]
    fn inspect_smoke_node() {
        let sketch = Sketch::new(Viewport::default());
        let info = SketchInspector::inspect_node(sketch.scene(), sketch.smoke_id()).unwrap();
        assert_eq!(info.tag, NodeTag::Smoke);
        assert_eq!(info.position, [0.0, 1.83, 0.0]);
        assert!(format!("{info}").contains("smoke"));
    }

    #[test]
    fn inspect_unknown_node() {
        let sketch = Sketch::new(Viewport::default());
        assert!(SketchInspector::inspect_node(sketch.scene(), NodeId::new()).is_none());
    }

    #[test]
    fn list_nodes_in_draw_order() {
        let sketch = Sketch::new(Viewport::default());
        assert_eq!(
            SketchInspector::list_nodes(sketch.scene()),
            vec![sketch.camera_id(), sketch.smoke_id()]
        );
    }

    #[test]
    fn model_report_flags_baked_object() {
        let report = SketchInspector::model_report(&model("baked"));
        assert!(report.baked_found);
        assert_eq!(report.vertices, 4);
        assert_eq!(report.triangles, 2);
        assert!(report.objects[0].textured);
        assert!(format!("{report}").ends_with("baked object: found"));

        assert!(!SketchInspector::model_report(&model("table")).baked_found);
    }
}
