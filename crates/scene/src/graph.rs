use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smoke_assets::LoadedModel;
use smoke_common::{NodeId, Transform};

use crate::camera::PerspectiveCamera;
use crate::material::SmokeMesh;

/// What a scene node holds.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Camera(PerspectiveCamera),
    /// Root of a loaded glTF subtree.
    Model(Arc<LoadedModel>),
    Smoke(SmokeMesh),
}

impl NodeKind {
    pub fn tag(&self) -> NodeTag {
        match self {
            Self::Camera(_) => NodeTag::Camera,
            Self::Model(_) => NodeTag::Model,
            Self::Smoke(_) => NodeTag::Smoke,
        }
    }
}

/// Payload-free discriminant of [`NodeKind`], used in summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeTag {
    Camera,
    Model,
    Smoke,
}

/// A direct child of the scene root.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
}

/// Errors from scene graph operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("a model is already attached as node {0:?}")]
    ModelAlreadyAttached(NodeId),
}

/// The live scene graph.
///
/// Children are kept in insertion order, which is also draw order: the model
/// is drawn before the transparent smoke regardless of when it finished
/// loading, because the renderer sorts transparent nodes last.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    children: Vec<SceneNode>,
    model: Option<NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node under the root. Returns its id.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
        kind: NodeKind,
    ) -> NodeId {
        let id = NodeId::new();
        let name = name.into();
        tracing::debug!(id = %id.short(), %name, tag = ?kind.tag(), "scene node added");
        self.children.push(SceneNode {
            id,
            name,
            transform,
            kind,
        });
        id
    }

    /// Insert a loaded model subtree. A second model is rejected so a
    /// repeated completion can never duplicate the geometry.
    pub fn attach_model(
        &mut self,
        name: impl Into<String>,
        model: Arc<LoadedModel>,
    ) -> Result<NodeId, SceneError> {
        if let Some(existing) = self.model {
            return Err(SceneError::ModelAlreadyAttached(existing));
        }
        let id = self.add(name, Transform::default(), NodeKind::Model(model));
        self.model = Some(id);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Children of the root in insertion order.
    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.children.iter().find(|n| n.id == id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.children.iter_mut().find(|n| n.id == id)
    }

    pub fn camera(&self, id: NodeId) -> Option<&PerspectiveCamera> {
        match &self.get(id)?.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn camera_mut(&mut self, id: NodeId) -> Option<&mut PerspectiveCamera> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn smoke(&self, id: NodeId) -> Option<&SmokeMesh> {
        match &self.get(id)?.kind {
            NodeKind::Smoke(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn smoke_mut(&mut self, id: NodeId) -> Option<&mut SmokeMesh> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::Smoke(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// The attached model node, if loading has completed.
    pub fn model(&self) -> Option<&SceneNode> {
        self.get(self.model?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PlaneGeometry;
    use crate::material::SmokeMaterial;
    use std::path::PathBuf;

    fn empty_model() -> Arc<LoadedModel> {
        Arc::new(LoadedModel {
            source: PathBuf::from("bakedModel.glb"),
            objects: Vec::new(),
            textures: Vec::new(),
        })
    }

    #[test]
    fn scene_starts_empty() {
        let scene = Scene::new();
        assert!(scene.is_empty());
        assert!(scene.model().is_none());
    }

    #[test]
    fn typed_accessors_match_kind() {
        let mut scene = Scene::new();
        let cam = scene.add(
            "camera",
            Transform::default(),
            NodeKind::Camera(PerspectiveCamera::default()),
        );
        let smoke = scene.add(
            "smoke",
            Transform::default(),
            NodeKind::Smoke(SmokeMesh::new(
                PlaneGeometry::new(1.0, 1.0, 1, 1),
                SmokeMaterial::default(),
            )),
        );

        assert!(scene.camera(cam).is_some());
        assert!(scene.smoke(cam).is_none());
        assert!(scene.smoke_mut(smoke).is_some());
        assert!(scene.camera_mut(smoke).is_none());
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn model_attaches_once() {
        let mut scene = Scene::new();
        let first = scene.attach_model("model", empty_model()).unwrap();
        let second = scene.attach_model("model", empty_model());

        assert_eq!(second, Err(SceneError::ModelAlreadyAttached(first)));
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.model().map(|n| n.id), Some(first));
        let models = scene
            .children()
            .iter()
            .filter(|n| n.kind.tag() == NodeTag::Model)
            .count();
        assert_eq!(models, 1);
    }

    #[test]
    fn children_keep_insertion_order() {
        let mut scene = Scene::new();
        let a = scene.add(
            "a",
            Transform::default(),
            NodeKind::Camera(PerspectiveCamera::default()),
        );
        let b = scene.attach_model("b", empty_model()).unwrap();
        let ids: Vec<NodeId> = scene.children().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![a, b]);
    }
}
