pub mod builder;
pub mod core;
pub mod input;
pub mod physics;
#[cfg(feature = "winit")]
pub mod platform;
pub mod renderer;
pub mod resources;
pub mod scene;

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use self::builder::{SceneBuilder, SceneSpec};
use self::core::{EngineConfig, FixedTimestep, FrameTiming};
use self::input::{InputBinding, InputEvent, InputRouter};
use self::renderer::Renderer;
use self::scene::{NodeId, Scene};

/// Headless frame driver: routes input, steps cameras at a fixed rate and
/// prepares one draw list per tick.
pub struct EngineApp {
    config: EngineConfig,
    scene: Scene,
    router: InputRouter,
    renderer: Renderer,
    timestep: FixedTimestep,
    binding: Option<InputBinding>,
}

impl EngineApp {
    pub fn new(config: EngineConfig, scene: Scene) -> Self {
        Self {
            timestep: FixedTimestep::from_fps(config.target_fps),
            router: InputRouter::new(),
            renderer: Renderer::new(),
            binding: None,
            scene,
            config,
        }
    }

    pub fn from_spec(config: EngineConfig, spec: SceneSpec) -> Result<Self> {
        let scene = SceneBuilder::new(spec)
            .build()
            .context("failed to build scene")?;
        Ok(Self::new(config, scene))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn active_camera(&self) -> Option<NodeId> {
        self.binding.as_ref().map(InputBinding::target)
    }

    /// Hands input to the first camera in traversal order. A previously
    /// active camera is released first.
    pub fn activate_camera(&mut self) -> Result<NodeId> {
        let id = self
            .scene
            .cameras()
            .first()
            .copied()
            .ok_or_else(|| anyhow!("scene has no camera node"))?;
        self.binding = None;
        self.binding = Some(self.router.enable(id));

        let aspect = self.config.aspect_ratio();
        if let Some((_, camera)) = self.scene.node_mut(id).and_then(|n| n.camera_parts_mut()) {
            camera.set_aspect(aspect);
        }
        tracing::info!(target: "engine", camera = %id, "camera activated");
        Ok(id)
    }

    pub fn deactivate_camera(&mut self) {
        if let Some(binding) = self.binding.take() {
            tracing::info!(target: "engine", camera = %binding.target(), "camera deactivated");
        }
    }

    /// Returns how many cameras received the event.
    pub fn handle_event(&mut self, event: &InputEvent) -> usize {
        self.router.dispatch(&mut self.scene, event)
    }

    /// Translates and routes a winit window event. Returns how many cameras
    /// received it; events with no input meaning reach none.
    #[cfg(feature = "winit")]
    pub fn handle_window_event(&mut self, event: &winit::event::WindowEvent) -> usize {
        platform::translate_window_event(event).map_or(0, |event| self.handle_event(&event))
    }

    #[cfg(feature = "winit")]
    pub fn handle_device_event(&mut self, event: &winit::event::DeviceEvent) -> usize {
        platform::translate_device_event(event).map_or(0, |event| self.handle_event(&event))
    }

    pub fn tick(&mut self, delta: Duration) -> FrameTiming {
        let delta_seconds = delta.as_secs_f32();
        self.timestep.accumulate(delta_seconds);

        let step = self.timestep.step_seconds();
        let mut steps = 0;
        while steps < self.config.max_steps_per_tick && self.timestep.should_step() {
            self.step(step);
            steps += 1;
        }
        if steps == self.config.max_steps_per_tick {
            let dropped = self.timestep.discard();
            if dropped > 0.0 {
                tracing::warn!(target: "engine", dropped_ms = dropped * 1000.0, "falling behind, dropping simulation time");
            }
        }

        let active = self.active_camera();
        self.renderer.begin_frame();
        self.renderer.submit(&self.scene, active);
        self.renderer.end_frame();

        let timing = FrameTiming {
            delta_seconds,
            fps: if delta_seconds > 0.0 { 1.0 / delta_seconds } else { 0.0 },
            steps,
        };
        tracing::debug!(
            target: "engine",
            frame_delta_ms = %delta.as_millis(),
            steps,
            draws = self.renderer.draw_list().len(),
            "frame tick"
        );
        timing
    }

    fn step(&mut self, dt: f32) {
        let router = &self.router;
        self.scene.for_each_mut(|node| {
            let id = node.id();
            if let Some((transform, camera)) = node.camera_parts_mut() {
                router.with_input(id, |input| camera.update(transform, input, dt));
            }
        });
        physics::integrate(&mut self.scene, dt);
    }
}
