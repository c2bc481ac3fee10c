use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Mat4, Vec2, Vec3};

use crate::engine::input::{InputEvent, InputState};
use crate::engine::scene::Transform;
use crate::game::states::AirState;

/// Which platform key codes drive the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub right: String,
    pub left: String,
    pub sprint: String,
    pub jump: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "KeyW".to_string(),
            backward: "KeyS".to_string(),
            right: "KeyD".to_string(),
            left: "KeyA".to_string(),
            sprint: "ShiftLeft".to_string(),
            jump: "Space".to_string(),
        }
    }
}

/// Projection and movement parameters of a [`Camera`].
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub aspect: f32,
    /// Vertical field of view, radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Velocity the camera starts with.
    pub velocity: Vec3,
    /// Radians of rotation per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    pub max_speed: f32,
    /// Fraction of horizontal velocity removed per update while no movement
    /// key is held. Kept within `[0, 1]`.
    pub friction: f32,
    pub acceleration: f32,
    pub sprint_max_speed: f32,
    pub sprint_acceleration: f32,
    pub gravity: f32,
    pub jump_speed: f32,
    /// Height of the ground plane the camera lands on.
    pub ground_height: f32,
    pub bindings: KeyBindings,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            aspect: 1.0,
            fov: 1.5,
            near: 0.01,
            far: 100.0,
            velocity: Vec3::ZERO,
            mouse_sensitivity: 0.002,
            max_speed: 3.0,
            friction: 0.2,
            acceleration: 20.0,
            sprint_max_speed: 6.0,
            sprint_acceleration: 40.0,
            gravity: 9.81,
            jump_speed: 5.0,
            ground_height: 1.0,
            bindings: KeyBindings::default(),
        }
    }
}

/// Acceleration and speed cap in effect for a single update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionTuning {
    pub acceleration: f32,
    pub max_speed: f32,
}

/// First-person camera controller.
///
/// The camera's position and orientation live in the owning node's
/// [`Transform`]; this type holds projection, velocity and jump state.
#[derive(Debug, Clone)]
pub struct Camera {
    config: CameraConfig,
    projection: Mat4,
    pub velocity: Vec3,
    pub jumping: bool,
    pub on_ground: bool,
}

impl Camera {
    pub fn new(mut config: CameraConfig) -> Self {
        config.friction = config.friction.clamp(0.0, 1.0);
        let mut camera = Self {
            velocity: config.velocity,
            config,
            projection: Mat4::IDENTITY,
            jumping: false,
            on_ground: true,
        };
        camera.update_projection();
        camera
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.config.bindings
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn update_projection(&mut self) {
        let c = &self.config;
        self.projection = Mat4::perspective_rh_gl(c.fov, c.aspect, c.near, c.far);
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.config.aspect = aspect;
        self.update_projection();
    }

    /// Inverse of the camera's composed world matrix.
    pub fn view_matrix(&self, world: Mat4) -> Mat4 {
        world.inverse()
    }

    pub fn view_projection(&self, world: Mat4) -> Mat4 {
        self.projection * self.view_matrix(world)
    }

    pub fn air_state(&self) -> AirState {
        if self.jumping {
            AirState::Airborne
        } else {
            AirState::Grounded
        }
    }

    pub fn tuning(&self, input: &InputState) -> MotionTuning {
        if input.is_held(&self.config.bindings.sprint) {
            MotionTuning {
                acceleration: self.config.sprint_acceleration,
                max_speed: self.config.sprint_max_speed,
            }
        } else {
            MotionTuning {
                acceleration: self.config.acceleration,
                max_speed: self.config.max_speed,
            }
        }
    }

    /// Advances velocity and jump state by `dt` seconds. Negative `dt` is
    /// treated as zero. Does not move the camera; see `engine::physics`.
    pub fn update(&mut self, transform: &mut Transform, input: &InputState, dt: f32) {
        let dt = dt.max(0.0);
        let keys = &self.config.bindings;

        let yaw = transform.yaw();
        let forward = Vec3::new(-yaw.sin(), 0.0, -yaw.cos());
        let right = Vec3::new(yaw.cos(), 0.0, -yaw.sin());

        let forward_held = input.is_held(&keys.forward);
        let backward_held = input.is_held(&keys.backward);
        let right_held = input.is_held(&keys.right);
        let left_held = input.is_held(&keys.left);

        let mut intent = Vec3::ZERO;
        if forward_held {
            intent += forward;
        }
        if backward_held {
            intent -= forward;
        }
        if right_held {
            intent += right;
        }
        if left_held {
            intent -= right;
        }

        let tuning = self.tuning(input);

        // Diagonal intent is not normalized.
        self.velocity += intent * (dt * tuning.acceleration);

        if !(forward_held || backward_held || right_held || left_held) {
            let keep = 1.0 - self.config.friction;
            self.velocity.x *= keep;
            self.velocity.z *= keep;
        }

        if input.is_held(&keys.jump) && !self.jumping {
            self.velocity.y = self.config.jump_speed;
            self.jumping = true;
            self.on_ground = false;
            tracing::debug!(target: "camera", y = transform.translation.y, "jump");
        }

        if self.jumping {
            self.velocity.y -= dt * self.config.gravity;
            // The exact-zero branch only fires when gravity cancels the
            // velocity on a step boundary; landing is in practice driven by
            // the height test.
            let below_ground = transform.translation.y < self.config.ground_height;
            if below_ground || self.velocity.y == 0.0 {
                self.velocity.y = 0.0;
                transform.translation.y = self.config.ground_height;
                self.jumping = false;
                self.on_ground = true;
                tracing::debug!(target: "camera", "landed");
            }
        }

        let planar = Vec2::new(self.velocity.x, self.velocity.z);
        let speed = planar.length();
        if speed > tuning.max_speed && speed > 0.0 {
            let scale = tuning.max_speed / speed;
            self.velocity.x *= scale;
            self.velocity.z *= scale;
        }

        tracing::trace!(
            target: "camera",
            vx = self.velocity.x,
            vy = self.velocity.y,
            vz = self.velocity.z,
            "camera updated"
        );
    }

    pub fn mousemove_handler(&self, transform: &mut Transform, dx: f32, dy: f32) {
        let sensitivity = self.config.mouse_sensitivity;
        let pitch = transform.rotation.x - dy * sensitivity;
        transform.rotation.x = pitch.clamp(-FRAC_PI_2, FRAC_PI_2);

        let yaw = (transform.rotation.y - dx * sensitivity).rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs.
        transform.rotation.y = if yaw >= TAU { 0.0 } else { yaw };
    }

    pub fn keydown_handler(&self, input: &mut InputState, code: &str) {
        input.key_down(code);
    }

    pub fn keyup_handler(&self, input: &mut InputState, code: &str) {
        input.key_up(code);
    }

    pub fn handle_event(&self, transform: &mut Transform, input: &mut InputState, event: &InputEvent) {
        match event {
            InputEvent::MouseMove { dx, dy } => self.mousemove_handler(transform, *dx, *dy),
            InputEvent::KeyDown(code) => self.keydown_handler(input, code),
            InputEvent::KeyUp(code) => self.keyup_handler(input, code),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}
