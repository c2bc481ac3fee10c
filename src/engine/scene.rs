use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::engine::resources::{Image, Mesh};
use crate::game::camera::Camera;

static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Stable, process-unique node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    fn next() -> Self {
        Self(NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Local transform, relative to the parent node.
///
/// `rotation` holds Euler angles in radians: `x` is pitch, `y` is yaw and
/// `z` is roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    pub fn pitch(&self) -> f32 {
        self.rotation.x
    }

    pub fn yaw(&self) -> f32 {
        self.rotation.y
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.rotation.y, self.rotation.x, self.rotation.z)
    }

    /// `T * R * S`
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.orientation(), self.translation)
    }
}

/// Geometry plus texture shared with the asset table.
#[derive(Debug, Clone)]
pub struct Visual {
    pub mesh: Arc<Mesh>,
    pub texture: Arc<Image>,
}

#[derive(Debug, Clone, Default)]
pub enum NodeKind {
    #[default]
    Empty,
    Camera(Box<Camera>),
    Model(Visual),
    Bouncer(Visual),
    Floor(Visual),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Empty => "node",
            NodeKind::Camera(_) => "camera",
            NodeKind::Model(_) => "model",
            NodeKind::Bouncer(_) => "bouncer",
            NodeKind::Floor(_) => "floor",
        }
    }

    pub fn visual(&self) -> Option<&Visual> {
        match self {
            NodeKind::Model(visual) | NodeKind::Bouncer(visual) | NodeKind::Floor(visual) => {
                Some(visual)
            }
            NodeKind::Empty | NodeKind::Camera(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    pub name: Option<String>,
    pub transform: Transform,
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::next(),
            name: None,
            transform: Transform::default(),
            kind,
            children: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(NodeKind::Empty)
    }

    pub fn camera(camera: Camera) -> Self {
        Self::new(NodeKind::Camera(Box::new(camera)))
    }

    pub fn model(mesh: Arc<Mesh>, texture: Arc<Image>) -> Self {
        Self::new(NodeKind::Model(Visual { mesh, texture }))
    }

    pub fn bouncer(mesh: Arc<Mesh>, texture: Arc<Image>) -> Self {
        Self::new(NodeKind::Bouncer(Visual { mesh, texture }))
    }

    pub fn floor(mesh: Arc<Mesh>, texture: Arc<Image>) -> Self {
        Self::new(NodeKind::Floor(Visual { mesh, texture }))
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn visual(&self) -> Option<&Visual> {
        self.kind.visual()
    }

    pub fn camera_ref(&self) -> Option<&Camera> {
        match &self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    /// Splits a camera node into its transform and controller so both can be
    /// mutated together.
    pub fn camera_parts_mut(&mut self) -> Option<(&mut Transform, &mut Camera)> {
        match &mut self.kind {
            NodeKind::Camera(camera) => Some((&mut self.transform, camera.as_mut())),
            _ => None,
        }
    }
}

/// Root container. Insertion order is traversal and draw order.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Node>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> NodeId {
        tracing::debug!(id = %node.id, kind = node.kind_name(), "adding scene node");
        let id = node.id;
        self.nodes.push(node);
        id
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of root nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes at every depth.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.visit(|_, _| count += 1);
        count
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        find(&self.nodes, id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        find_mut(&mut self.nodes, id)
    }

    /// Pre-order walk; the closure also receives the node's world matrix.
    pub fn visit<F>(&self, mut f: F)
    where
        F: FnMut(&Node, Mat4),
    {
        fn walk<F: FnMut(&Node, Mat4)>(nodes: &[Node], parent: Mat4, f: &mut F) {
            for node in nodes {
                let world = parent * node.transform.matrix();
                f(node, world);
                walk(&node.children, world, f);
            }
        }
        walk(&self.nodes, Mat4::IDENTITY, &mut f);
    }

    pub fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Node),
    {
        fn walk<F: FnMut(&mut Node)>(nodes: &mut [Node], f: &mut F) {
            for node in nodes {
                f(node);
                walk(&mut node.children, f);
            }
        }
        walk(&mut self.nodes, &mut f);
    }

    pub fn cameras(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.visit(|node, _| {
            if node.camera_ref().is_some() {
                ids.push(node.id);
            }
        });
        ids
    }
}

fn find(nodes: &[Node], id: NodeId) -> Option<&Node> {
    nodes
        .iter()
        .find_map(|node| if node.id == id { Some(node) } else { find(&node.children, id) })
}

fn find_mut(nodes: &mut [Node], id: NodeId) -> Option<&mut Node> {
    for node in nodes.iter_mut() {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_are_unique() {
        let a = Node::empty();
        let b = Node::empty();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn scene_keeps_insertion_order_and_finds_children() {
        let child = Node::empty().with_name("child");
        let child_id = child.id();
        let mut scene = Scene::new();
        let first = scene.add_node(Node::empty().with_name("first").with_child(child));
        let second = scene.add_node(Node::empty().with_name("second"));

        assert_eq!(scene.len(), 2);
        assert_eq!(scene.node_count(), 3);
        assert_eq!(scene.nodes()[0].id(), first);
        assert_eq!(scene.nodes()[1].id(), second);
        assert_eq!(scene.node(child_id).and_then(|n| n.name.as_deref()), Some("child"));

        scene.node_mut(child_id).unwrap().transform.translation = Vec3::X;
        assert_eq!(scene.node(child_id).unwrap().transform.translation, Vec3::X);
    }

    #[test]
    fn visit_composes_parent_transforms() {
        let child = Node::empty().with_transform(Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)));
        let child_id = child.id();
        let parent = Node::empty()
            .with_transform(Transform {
                translation: Vec3::new(2.0, 0.0, 0.0),
                scale: Vec3::splat(2.0),
                ..Default::default()
            })
            .with_child(child);
        let mut scene = Scene::new();
        scene.add_node(parent);

        let mut child_origin = None;
        scene.visit(|node, world| {
            if node.id() == child_id {
                child_origin = Some(world.transform_point3(Vec3::ZERO));
            }
        });
        let origin = child_origin.unwrap();
        assert!((origin - Vec3::new(2.0, 2.0, 0.0)).length() < 1e-5);
    }
}
