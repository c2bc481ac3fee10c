use std::time::Duration;

use anyhow::{Context, Result};
use scenery::engine::core::EngineConfig;
use scenery::{EngineApp, InputEvent, SceneSpec};

const DEMO_SCENE: &str = include_str!("../assets/scene.ron");
const DEMO_FRAMES: u32 = 240;

/// Usage: `scenery [scene.ron] [engine.ron]`
fn main() -> Result<()> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let spec = match args.next() {
        Some(path) => SceneSpec::from_ron_file(path)?,
        None => SceneSpec::from_ron_str(DEMO_SCENE).context("built-in demo scene")?,
    };
    let config = match args.next() {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let mut app = EngineApp::from_spec(config, spec)?;
    tracing::info!(target: "engine", app = %app.config().app_name, "Engine starting");
    app.activate_camera()?;
    walkthrough(&mut app);
    app.deactivate_camera();
    tracing::info!(target: "engine", "Engine shutdown complete");
    Ok(())
}

/// Plays a fixed input script so the controller can be watched in the logs
/// without a window.
fn walkthrough(app: &mut EngineApp) {
    let frame = Duration::from_secs_f32(1.0 / app.config().target_fps.max(1) as f32);
    for index in 0..DEMO_FRAMES {
        for event in scripted_events(index) {
            app.handle_event(&event);
        }
        app.tick(frame);

        if index % 30 == 0 {
            if let Some(node) = app.active_camera().and_then(|id| app.scene().node(id)) {
                let camera = node.camera_ref();
                tracing::info!(
                    target: "demo",
                    frame = index,
                    position = ?node.transform.translation,
                    yaw = node.transform.yaw(),
                    velocity = ?camera.map(|c| c.velocity),
                    state = ?camera.map(|c| c.air_state()),
                    "camera"
                );
            }
        }
    }
}

fn scripted_events(frame: u32) -> Vec<InputEvent> {
    let key_down = |code: &str| InputEvent::KeyDown(code.to_string());
    let key_up = |code: &str| InputEvent::KeyUp(code.to_string());
    match frame {
        0 => vec![key_down("KeyW")],
        30 => vec![InputEvent::MouseMove { dx: -400.0, dy: 50.0 }],
        60 => vec![key_down("Space")],
        62 => vec![key_up("Space")],
        90 => vec![key_down("ShiftLeft"), key_down("KeyD")],
        150 => vec![key_up("KeyW"), key_up("KeyD"), key_up("ShiftLeft")],
        _ => Vec::new(),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already set");
    }
}
