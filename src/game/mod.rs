pub mod camera;
pub mod states;

pub use camera::{Camera, CameraConfig, KeyBindings, MotionTuning};
pub use states::AirState;
