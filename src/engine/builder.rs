//! Declarative scene descriptions and the factory that turns them into a
//! [`Scene`].
//!
//! A description is usually authored in RON:
//!
//! ```ron
//! #![enable(implicit_some)]
//! (
//!     nodes: [
//!         (type: "camera", translation: (0.0, 1.0, 5.0), max_speed: 4.0),
//!         (type: "floor", mesh: "plane", texture: "grass", scale: (10.0, 1.0, 10.0)),
//!     ],
//!     meshes: { "plane": (vertices: [...], indices: [...]) },
//!     textures: { "grass": "textures/grass.png" },
//! )
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::resources::{AssetTable, Image, Mesh, MeshData, MeshError};
use crate::engine::scene::{Node, NodeKind, Scene, Transform, Visual};
use crate::game::camera::{Camera, CameraConfig};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSpec {
    pub nodes: Vec<NodeSpec>,
    pub meshes: HashMap<String, MeshData>,
    /// Texture key to image source.
    pub textures: HashMap<String, String>,
}

impl SceneSpec {
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).context("failed to parse scene description")
    }

    pub fn from_ron_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scene {}", path.display()))?;
        Self::from_ron_str(&source).with_context(|| format!("in {}", path.display()))
    }
}

/// One entry of [`SceneSpec::nodes`].
///
/// Every field besides `type` is optional. Transform fields apply to all
/// node types; `mesh`/`texture` are read by visual types and the camera
/// fields by `"camera"` nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: Option<String>,
    pub translation: Option<[f32; 3]>,
    pub rotation: Option<[f32; 3]>,
    pub scale: Option<[f32; 3]>,
    pub mesh: Option<String>,
    pub texture: Option<String>,
    pub aspect: Option<f32>,
    pub fov: Option<f32>,
    pub near: Option<f32>,
    pub far: Option<f32>,
    pub velocity: Option<[f32; 3]>,
    pub mouse_sensitivity: Option<f32>,
    pub max_speed: Option<f32>,
    pub friction: Option<f32>,
    pub acceleration: Option<f32>,
    pub sprint_max_speed: Option<f32>,
    pub sprint_acceleration: Option<f32>,
    pub gravity: Option<f32>,
    pub jump_speed: Option<f32>,
    pub ground_height: Option<f32>,
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn transform(&self) -> Transform {
        let defaults = Transform::default();
        Transform {
            translation: self.translation.map_or(defaults.translation, Vec3::from),
            rotation: self.rotation.map_or(defaults.rotation, Vec3::from),
            scale: self.scale.map_or(defaults.scale, Vec3::from),
        }
    }

    /// Camera defaults with this node's overrides applied.
    pub fn camera_config(&self) -> CameraConfig {
        let mut config = CameraConfig::default();
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    config.$field = value;
                })*
            };
        }
        merge!(
            aspect,
            fov,
            near,
            far,
            mouse_sensitivity,
            max_speed,
            friction,
            acceleration,
            sprint_max_speed,
            sprint_acceleration,
            gravity,
            jump_speed,
            ground_height
        );
        if let Some(velocity) = self.velocity {
            config.velocity = Vec3::from(velocity);
        }
        config
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("{node} ({kind}) references unknown mesh `{key}`")]
    UnknownMesh {
        node: String,
        kind: String,
        key: String,
    },
    #[error("{node} ({kind}) references unknown texture `{key}`")]
    UnknownTexture {
        node: String,
        kind: String,
        key: String,
    },
    #[error("{node} ({kind}) has no `{field}` field")]
    MissingAsset {
        node: String,
        kind: String,
        field: &'static str,
    },
    #[error("{node} uses malformed mesh `{key}`")]
    InvalidMesh {
        node: String,
        key: String,
        #[source]
        source: MeshError,
    },
}

/// Builds a [`Scene`] from a [`SceneSpec`].
///
/// The first unresolvable asset reference aborts the whole build; no
/// partially populated scene is ever returned.
pub struct SceneBuilder {
    nodes: Vec<NodeSpec>,
    assets: AssetTable,
}

impl SceneBuilder {
    pub fn new(spec: SceneSpec) -> Self {
        Self {
            nodes: spec.nodes,
            assets: AssetTable::new(spec.meshes, spec.textures),
        }
    }

    pub fn build(mut self) -> Result<Scene, BuildError> {
        let specs = std::mem::take(&mut self.nodes);
        let mut scene = Scene::new();
        for (index, spec) in specs.iter().enumerate() {
            let node = self.create_node(spec, &format!("nodes[{index}]"))?;
            scene.add_node(node);
        }
        tracing::info!(
            target: "scene",
            roots = scene.len(),
            nodes = scene.node_count(),
            meshes = self.assets.mesh_count(),
            textures = self.assets.texture_count(),
            "scene built"
        );
        Ok(scene)
    }

    fn create_node(&mut self, spec: &NodeSpec, path: &str) -> Result<Node, BuildError> {
        let kind = match spec.kind.as_str() {
            "camera" => NodeKind::Camera(Box::new(Camera::new(spec.camera_config()))),
            "model" => NodeKind::Model(self.resolve_visual(spec, path)?),
            "bouncer" => NodeKind::Bouncer(self.resolve_visual(spec, path)?),
            "floor" => NodeKind::Floor(self.resolve_visual(spec, path)?),
            other => {
                tracing::debug!(target: "scene", node = path, kind = other, "unrecognized node type, using a bare node");
                NodeKind::Empty
            }
        };

        let mut node = Node::new(kind).with_transform(spec.transform());
        node.name = spec.name.clone();
        for (index, child) in spec.children.iter().enumerate() {
            let child = self.create_node(child, &format!("{path}.children[{index}]"))?;
            node.children.push(child);
        }
        tracing::debug!(target: "scene", node = path, id = %node.id(), kind = node.kind_name(), "node created");
        Ok(node)
    }

    fn resolve_visual(&mut self, spec: &NodeSpec, path: &str) -> Result<Visual, BuildError> {
        let mesh = self.resolve_mesh(spec, path)?;
        let texture = self.resolve_texture(spec, path)?;
        Ok(Visual { mesh, texture })
    }

    fn resolve_mesh(&mut self, spec: &NodeSpec, path: &str) -> Result<Arc<Mesh>, BuildError> {
        let key = spec.mesh.as_deref().ok_or_else(|| BuildError::MissingAsset {
            node: path.to_string(),
            kind: spec.kind.clone(),
            field: "mesh",
        })?;
        match self.assets.mesh(key) {
            Ok(Some(mesh)) => Ok(mesh),
            Ok(None) => Err(BuildError::UnknownMesh {
                node: path.to_string(),
                kind: spec.kind.clone(),
                key: key.to_string(),
            }),
            Err(source) => Err(BuildError::InvalidMesh {
                node: path.to_string(),
                key: key.to_string(),
                source,
            }),
        }
    }

    fn resolve_texture(&self, spec: &NodeSpec, path: &str) -> Result<Arc<Image>, BuildError> {
        let key = spec.texture.as_deref().ok_or_else(|| BuildError::MissingAsset {
            node: path.to_string(),
            kind: spec.kind.clone(),
            field: "texture",
        })?;
        self.assets
            .texture(key)
            .ok_or_else(|| BuildError::UnknownTexture {
                node: path.to_string(),
                kind: spec.kind.clone(),
                key: key.to_string(),
            })
    }
}
