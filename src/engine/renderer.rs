use std::sync::Arc;

use glam::Mat4;

use crate::engine::resources::{Image, Mesh};
use crate::engine::scene::{NodeId, Scene};

/// One visual node, flattened for the draw pipeline.
#[derive(Debug, Clone)]
pub struct DrawItem {
    pub node: NodeId,
    pub kind: &'static str,
    pub world: Mat4,
    pub mesh: Arc<Mesh>,
    pub texture: Arc<Image>,
}

/// Collects what the GPU side needs each frame. Issuing the actual draw
/// calls belongs to the platform renderer.
#[derive(Debug, Default)]
pub struct Renderer {
    frame_count: u64,
    draw_list: Vec<DrawItem>,
    view_projection: Option<Mat4>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_frame(&mut self) {
        tracing::trace!(frame = self.frame_count, "begin frame");
        self.draw_list.clear();
        self.view_projection = None;
    }

    pub fn submit(&mut self, scene: &Scene, active_camera: Option<NodeId>) {
        scene.visit(|node, world| {
            if let Some(visual) = node.visual() {
                self.draw_list.push(DrawItem {
                    node: node.id(),
                    kind: node.kind_name(),
                    world,
                    mesh: Arc::clone(&visual.mesh),
                    texture: Arc::clone(&visual.texture),
                });
            } else if let Some(camera) = node.camera_ref() {
                if active_camera == Some(node.id()) {
                    self.view_projection = Some(camera.view_projection(world));
                }
            }
        });
    }

    pub fn end_frame(&mut self) {
        self.frame_count += 1;
        tracing::trace!(frame = self.frame_count, draws = self.draw_list.len(), "end frame");
    }

    pub fn draw_list(&self) -> &[DrawItem] {
        &self.draw_list
    }

    pub fn view_projection(&self) -> Option<Mat4> {
        self.view_projection
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
