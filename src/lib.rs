pub mod engine;
pub mod game;

pub use engine::builder::{BuildError, NodeSpec, SceneBuilder, SceneSpec};
pub use engine::input::{InputBinding, InputEvent, InputRouter, InputState};
pub use engine::scene::{Node, NodeId, NodeKind, Scene, Transform, Visual};
pub use engine::EngineApp;
pub use game::{AirState, Camera, CameraConfig};
