use crate::engine::scene::Scene;

/// Moves every camera by its velocity. Explicit Euler; there is no collision
/// beyond the ground plane the camera itself enforces.
pub fn integrate(scene: &mut Scene, dt: f32) {
    let dt = dt.max(0.0);
    scene.for_each_mut(|node| {
        if let Some((transform, camera)) = node.camera_parts_mut() {
            transform.translation += camera.velocity * dt;
        }
    });
}
