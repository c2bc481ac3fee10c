use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub app_name: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_fps: u32,
    /// Upper bound on fixed steps run by a single `tick`; leftover time is dropped.
    pub max_steps_per_tick: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_name: "Scenery".to_string(),
            window_width: 1280,
            window_height: 720,
            target_fps: 60,
            max_steps_per_tick: 8,
        }
    }
}

impl EngineConfig {
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).context("failed to parse engine config")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config {}", path.display()))?;
        Self::from_ron_str(&source)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height.max(1) as f32
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FrameTiming {
    pub delta_seconds: f32,
    pub fps: f32,
    pub steps: u32,
}

pub struct FixedTimestep {
    frame_duration: f32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn from_fps(fps: u32) -> Self {
        let frame_duration = 1.0 / fps.max(1) as f32;
        Self {
            frame_duration,
            accumulator: 0.0,
        }
    }

    pub fn step_seconds(&self) -> f32 {
        self.frame_duration
    }

    pub fn accumulate(&mut self, delta: f32) {
        self.accumulator += delta.max(0.0);
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.frame_duration {
            self.accumulator -= self.frame_duration;
            true
        } else {
            false
        }
    }

    /// Drops whatever time is still pending; returns how much was discarded.
    pub fn discard(&mut self) -> f32 {
        std::mem::take(&mut self.accumulator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestep_emits_whole_steps_only() {
        let mut step = FixedTimestep::from_fps(10);
        step.accumulate(0.25);
        assert!(step.should_step());
        assert!(step.should_step());
        assert!(!step.should_step());
        assert!((step.discard() - 0.05).abs() < 1e-5);
        assert!(!step.should_step());
    }

    #[test]
    fn timestep_ignores_negative_delta_and_zero_fps() {
        let mut step = FixedTimestep::from_fps(0);
        assert_eq!(step.step_seconds(), 1.0);
        step.accumulate(-3.0);
        assert!(!step.should_step());
    }

    #[test]
    fn config_missing_fields_fall_back_to_defaults() {
        let config = EngineConfig::from_ron_str("(app_name: \"demo\", target_fps: 30)").unwrap();
        assert_eq!(config.app_name, "demo");
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.max_steps_per_tick, 8);
        assert_eq!(config.window_width, 1280);
    }
}
