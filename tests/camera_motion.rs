use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec3;
use scenery::{AirState, Camera, CameraConfig, InputState, Transform};

const MOVEMENT_KEYS: [&str; 6] = ["KeyW", "KeyS", "KeyD", "KeyA", "ShiftLeft", "Space"];

fn grounded() -> (Camera, Transform) {
    let camera = Camera::new(CameraConfig::default());
    let transform = Transform::from_translation(Vec3::new(0.0, 1.0, 0.0));
    (camera, transform)
}

fn planar_speed(camera: &Camera) -> f32 {
    (camera.velocity.x * camera.velocity.x + camera.velocity.z * camera.velocity.z).sqrt()
}

fn held(keys: &[&str]) -> InputState {
    let mut input = InputState::new();
    for key in keys {
        input.key_down(*key);
    }
    input
}

#[test]
fn test_defaults_match_reference_tuning() {
    let config = CameraConfig::default();
    assert_eq!(config.aspect, 1.0);
    assert_eq!(config.fov, 1.5);
    assert_eq!(config.near, 0.01);
    assert_eq!(config.far, 100.0);
    assert_eq!(config.velocity, Vec3::ZERO);
    assert_eq!(config.mouse_sensitivity, 0.002);
    assert_eq!(config.max_speed, 3.0);
    assert_eq!(config.friction, 0.2);
    assert_eq!(config.acceleration, 20.0);
    assert_eq!(config.gravity, 9.81);

    let camera = Camera::default();
    assert!(camera.on_ground);
    assert!(!camera.jumping);
    assert_eq!(camera.air_state(), AirState::Grounded);
}

#[test]
fn test_forward_follows_yaw() {
    let (mut camera, mut transform) = grounded();
    let input = held(&["KeyW"]);

    camera.update(&mut transform, &input, 0.1);
    assert!((camera.velocity - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);

    // A quarter turn to the left points forward along -X.
    let (mut camera, mut transform) = grounded();
    transform.rotation.y = FRAC_PI_2;
    camera.update(&mut transform, &input, 0.1);
    assert!((camera.velocity - Vec3::new(-2.0, 0.0, 0.0)).length() < 1e-5);
}

#[test]
fn test_strafe_right_and_left_cancel() {
    let (mut camera, mut transform) = grounded();
    camera.update(&mut transform, &held(&["KeyD"]), 0.1);
    assert!((camera.velocity - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);

    let (mut camera, mut transform) = grounded();
    camera.update(&mut transform, &held(&["KeyD", "KeyA"]), 0.1);
    assert_eq!(camera.velocity, Vec3::ZERO);
}

#[test]
fn test_friction_only_decay() {
    let (mut camera, mut transform) = grounded();
    camera.velocity = Vec3::new(2.0, 0.0, 3.0);

    camera.update(&mut transform, &InputState::new(), 1.0);

    assert!((camera.velocity.x - 1.6).abs() < 1e-5);
    assert!((camera.velocity.z - 2.4).abs() < 1e-5);
    assert_eq!(camera.velocity.y, 0.0);
}

#[test]
fn test_friction_leaves_vertical_untouched_while_airborne() {
    let (mut camera, mut transform) = grounded();
    transform.translation.y = 3.0;
    camera.jumping = true;
    camera.velocity = Vec3::new(1.0, 2.0, 1.0);

    camera.update(&mut transform, &InputState::new(), 0.0);

    assert!((camera.velocity.x - 0.8).abs() < 1e-6);
    assert!((camera.velocity.z - 0.8).abs() < 1e-6);
    assert_eq!(camera.velocity.y, 2.0);
}

#[test]
fn test_planar_speed_never_exceeds_cap() {
    let dts = [0.0, 0.001, 1.0 / 60.0, 0.1, 1.0, 10.0];
    for mask in 0u32..(1 << MOVEMENT_KEYS.len()) {
        let keys: Vec<&str> = MOVEMENT_KEYS
            .iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1 << bit) != 0)
            .map(|(_, key)| *key)
            .collect();
        let input = held(&keys);
        let cap = if keys.contains(&"ShiftLeft") { 6.0 } else { 3.0 };

        for &dt in &dts {
            let (mut camera, mut transform) = grounded();
            transform.rotation.y = 0.7;
            camera.velocity = Vec3::new(40.0, 0.0, -25.0);
            for _ in 0..5 {
                camera.update(&mut transform, &input, dt);
                assert!(
                    planar_speed(&camera) <= cap + 1e-4,
                    "keys {keys:?} dt {dt}: speed {}",
                    planar_speed(&camera)
                );
            }
        }
    }
}

#[test]
fn test_diagonal_reaches_cap_exactly() {
    let (mut camera, mut transform) = grounded();
    let input = held(&["KeyW", "KeyD"]);
    for _ in 0..120 {
        camera.update(&mut transform, &input, 1.0 / 60.0);
    }
    assert!((planar_speed(&camera) - 3.0).abs() < 1e-4);
    assert!(camera.velocity.x > 0.0 && camera.velocity.z < 0.0);
}

#[test]
fn test_sprint_raises_cap_each_frame() {
    let (mut camera, mut transform) = grounded();
    let sprint = held(&["KeyW", "ShiftLeft"]);
    assert_eq!(camera.tuning(&sprint).acceleration, 40.0);
    assert_eq!(camera.tuning(&sprint).max_speed, 6.0);

    for _ in 0..60 {
        camera.update(&mut transform, &sprint, 1.0 / 60.0);
    }
    assert!((planar_speed(&camera) - 6.0).abs() < 1e-4);

    // Releasing sprint drops back to the baseline cap on the next update.
    let walk = held(&["KeyW"]);
    assert_eq!(camera.tuning(&walk).max_speed, 3.0);
    camera.update(&mut transform, &walk, 1.0 / 60.0);
    assert!((planar_speed(&camera) - 3.0).abs() < 1e-4);
}

#[test]
fn test_zero_dt_and_zero_velocity_are_absorbed() {
    let (mut camera, mut transform) = grounded();
    camera.update(&mut transform, &held(&["KeyW", "KeyD"]), 0.0);
    assert_eq!(camera.velocity, Vec3::ZERO);

    camera.update(&mut transform, &InputState::new(), -1.0);
    assert_eq!(camera.velocity, Vec3::ZERO);
    assert!(camera.velocity.is_finite());
}

#[test]
fn test_jump_sets_launch_speed_once() {
    let (mut camera, mut transform) = grounded();
    let jump = held(&["Space"]);

    camera.update(&mut transform, &jump, 0.0);
    assert_eq!(camera.velocity.y, 5.0);
    assert!(camera.jumping);
    assert!(!camera.on_ground);
    assert_eq!(camera.air_state(), AirState::Airborne);

    // Still airborne: holding jump again must not re-launch.
    transform.translation.y = 1.5;
    camera.update(&mut transform, &jump, 0.1);
    let expected = 5.0 - 0.1 * 9.81;
    assert!((camera.velocity.y - expected).abs() < 1e-5);
    assert!(camera.jumping);
}

#[test]
fn test_landing_snaps_to_ground() {
    let (mut camera, mut transform) = grounded();
    let dt = 1.0 / 60.0;

    camera.update(&mut transform, &held(&["Space"]), dt);
    transform.translation += camera.velocity * dt;

    let idle = InputState::new();
    let mut peak: f32 = 1.0;
    let mut frames = 0;
    while camera.jumping {
        camera.update(&mut transform, &idle, dt);
        transform.translation += camera.velocity * dt;
        peak = peak.max(transform.translation.y);
        frames += 1;
        assert!(frames < 1000, "camera never landed");
    }

    assert_eq!(camera.velocity.y, 0.0);
    assert_eq!(transform.translation.y, 1.0);
    assert!(camera.on_ground);
    assert_eq!(camera.air_state(), AirState::Grounded);
    // v^2 / 2g above the ground, give or take integration error.
    assert!((peak - (1.0 + 25.0 / (2.0 * 9.81))).abs() < 0.1);
}

#[test]
fn test_vertical_stop_lands_even_above_ground() {
    let mut camera = Camera::new(CameraConfig {
        gravity: 10.0,
        jump_speed: 5.0,
        ..Default::default()
    });
    let mut transform = Transform::from_translation(Vec3::new(0.0, 3.0, 0.0));
    camera.velocity.y = 5.0;
    camera.jumping = true;
    camera.on_ground = false;

    // gravity * dt cancels the upward speed exactly.
    camera.update(&mut transform, &InputState::new(), 0.5);

    assert_eq!(camera.velocity.y, 0.0);
    assert_eq!(transform.translation.y, 1.0);
    assert!(!camera.jumping);
    assert!(camera.on_ground);
}

#[test]
fn test_ground_height_is_configurable() {
    let mut camera = Camera::new(CameraConfig {
        ground_height: 0.0,
        jump_speed: 2.0,
        ..Default::default()
    });
    let mut transform = Transform::default();
    transform.translation.y = -0.5;
    camera.jumping = true;

    camera.update(&mut transform, &InputState::new(), 0.01);

    assert!(!camera.jumping);
    assert_eq!(transform.translation.y, 0.0);
}

#[test]
fn test_rotation_stays_in_range() {
    let camera = Camera::default();
    let mut transform = Transform::default();
    let mut seed: u32 = 0x2545_f491;
    for _ in 0..5_000 {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        let dx = (seed % 4001) as f32 - 2000.0;
        let dy = ((seed >> 12) % 4001) as f32 - 2000.0;
        camera.mousemove_handler(&mut transform, dx, dy);

        assert!(transform.pitch() >= -FRAC_PI_2 && transform.pitch() <= FRAC_PI_2);
        assert!(transform.yaw() >= 0.0 && transform.yaw() < TAU);
    }
}

#[test]
fn test_mouse_look_directions() {
    let camera = Camera::default();
    let mut transform = Transform::default();

    // Moving right turns right, which decreases yaw and wraps below zero.
    camera.mousemove_handler(&mut transform, 10.0, 0.0);
    assert!((transform.yaw() - (TAU - 0.02)).abs() < 1e-5);

    camera.mousemove_handler(&mut transform, 0.0, 10_000.0);
    assert_eq!(transform.pitch(), -FRAC_PI_2);
    camera.mousemove_handler(&mut transform, 0.0, -20_000.0);
    assert_eq!(transform.pitch(), FRAC_PI_2);

    camera.mousemove_handler(&mut transform, -(PI / 0.002), 0.0);
    assert!(transform.yaw() >= 0.0 && transform.yaw() < TAU);
}

#[test]
fn test_key_handlers_track_codes() {
    let camera = Camera::default();
    let mut input = InputState::new();
    camera.keydown_handler(&mut input, "KeyW");
    camera.keydown_handler(&mut input, "Numpad7");
    assert!(input.is_held("KeyW"));
    assert!(input.is_held("Numpad7"));
    camera.keyup_handler(&mut input, "KeyW");
    assert!(!input.is_held("KeyW"));
    assert!(!input.is_held("KeyQ"));
}

#[test]
fn test_custom_bindings() {
    let mut camera = Camera::default();
    camera.bindings_mut().forward = "ArrowUp".to_string();
    let mut transform = Transform::from_translation(Vec3::Y);

    camera.update(&mut transform, &held(&["KeyW"]), 0.1);
    assert_eq!(camera.velocity, Vec3::ZERO);

    camera.update(&mut transform, &held(&["ArrowUp"]), 0.1);
    assert!(camera.velocity.z < 0.0);
}

#[test]
fn test_projection_tracks_aspect() {
    let mut camera = Camera::default();
    let square = camera.projection();
    camera.set_aspect(2.0);
    let wide = camera.projection();
    assert!((wide.x_axis.x * 2.0 - square.x_axis.x).abs() < 1e-5);
    assert_eq!(wide.y_axis.y, square.y_axis.y);
}

#[test]
fn test_view_matrix_inverts_world() {
    let camera = Camera::default();
    let world = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0)).matrix();
    let view = camera.view_matrix(world);
    assert!(view.transform_point3(Vec3::new(1.0, 2.0, 3.0)).length() < 1e-6);
    assert!(camera
        .view_projection(world)
        .abs_diff_eq(camera.projection() * view, 1e-6));
}
