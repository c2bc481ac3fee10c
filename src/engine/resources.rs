use std::collections::HashMap;
use std::sync::Arc;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw geometry as it appears in a scene description: flat attribute arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub texcoords: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("vertex array length {0} is not a multiple of 3")]
    RaggedVertices(usize),
    #[error("expected {expected} texcoord floats, found {found}")]
    TexcoordCount { expected: usize, found: usize },
    #[error("expected {expected} normal floats, found {found}")]
    NormalCount { expected: usize, found: usize },
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

/// Validated geometry. Immutable once built; shared between nodes by `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    positions: Vec<Vec3>,
    texcoords: Vec<Vec2>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
}

impl Mesh {
    pub fn new(data: &MeshData) -> Result<Self, MeshError> {
        if data.vertices.len() % 3 != 0 {
            return Err(MeshError::RaggedVertices(data.vertices.len()));
        }
        let vertex_count = data.vertices.len() / 3;

        if !data.texcoords.is_empty() && data.texcoords.len() != vertex_count * 2 {
            return Err(MeshError::TexcoordCount {
                expected: vertex_count * 2,
                found: data.texcoords.len(),
            });
        }
        if !data.normals.is_empty() && data.normals.len() != vertex_count * 3 {
            return Err(MeshError::NormalCount {
                expected: vertex_count * 3,
                found: data.normals.len(),
            });
        }
        if let Some(&index) = data.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }

        Ok(Self {
            positions: data.vertices.chunks_exact(3).map(Vec3::from_slice).collect(),
            texcoords: data.texcoords.chunks_exact(2).map(Vec2::from_slice).collect(),
            normals: data.normals.chunks_exact(3).map(Vec3::from_slice).collect(),
            indices: data.indices.clone(),
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn texcoords(&self) -> &[Vec2] {
        &self.texcoords
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

/// A texture entry. Decoding the source is left to the render collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub key: String,
    pub source: String,
}

/// Owns every mesh and texture a scene may reference.
///
/// Meshes are validated lazily, once per name, so an unused malformed entry
/// does not fail a build. Entities only ever receive `Arc` clones.
#[derive(Default, Debug)]
pub struct AssetTable {
    mesh_sources: HashMap<String, MeshData>,
    meshes: HashMap<String, Arc<Mesh>>,
    textures: HashMap<String, Arc<Image>>,
}

impl AssetTable {
    pub fn new(
        mesh_sources: HashMap<String, MeshData>,
        textures: HashMap<String, String>,
    ) -> Self {
        let mut table = Self {
            mesh_sources,
            ..Self::default()
        };
        for (key, source) in textures {
            table.register_texture(key, source);
        }
        table
    }

    pub fn register_mesh(&mut self, key: impl Into<String>, data: MeshData) {
        let key = key.into();
        tracing::debug!(%key, "registering mesh source");
        self.meshes.remove(&key);
        self.mesh_sources.insert(key, data);
    }

    pub fn register_texture(&mut self, key: impl Into<String>, source: impl Into<String>) {
        let key = key.into();
        let source = source.into();
        tracing::debug!(%key, %source, "registering texture");
        let image = Arc::new(Image {
            key: key.clone(),
            source,
        });
        self.textures.insert(key, image);
    }

    /// `Ok(None)` means the key is unknown; `Err` means the entry is malformed.
    pub fn mesh(&mut self, key: &str) -> Result<Option<Arc<Mesh>>, MeshError> {
        if let Some(mesh) = self.meshes.get(key) {
            return Ok(Some(Arc::clone(mesh)));
        }
        let Some(data) = self.mesh_sources.get(key) else {
            return Ok(None);
        };
        let mesh = Arc::new(Mesh::new(data)?);
        tracing::trace!(%key, vertices = mesh.vertex_count(), "mesh constructed");
        self.meshes.insert(key.to_string(), Arc::clone(&mesh));
        Ok(Some(mesh))
    }

    pub fn texture(&self, key: &str) -> Option<Arc<Image>> {
        self.textures.get(key).cloned()
    }

    pub fn mesh_count(&self) -> usize {
        self.mesh_sources.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}
