use std::any::Any;
use std::env;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::{info, warn};
use pollster::block_on;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::keyboard::{Key, NamedKey};
use winit::platform::run_on_demand::EventLoopExtRunOnDemand;
use winit::window::WindowBuilder;

use orbit_scene::{
    scene_summary, AssetLoader, DragMode, GateTransition, LoadOutcome, LoadRequest, Renderer,
    SceneConfig, SceneState, WheelOutcome,
};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let config = match &options.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load scene {}", path.display()))?,
        None => SceneConfig::default(),
    };

    if options.summary_only {
        print_summary(&config);
        return Ok(());
    }

    match run_interactive(&config) {
        Ok(()) => Ok(()),
        Err(err) if err.downcast_ref::<WindowInitError>().is_some() => {
            eprintln!(
                "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
            );
            print_summary(&config);
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn print_summary(config: &SceneConfig) {
    for line in scene_summary(config) {
        println!("{line}");
    }
}

fn run_interactive(config: &SceneConfig) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let mut event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Orbit Scene")
            .with_inner_size(LogicalSize::new(1280.0, 720.0))
            .build(&event_loop)
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let renderer = block_on(Renderer::new(Arc::clone(&window), config))?;
    let size = renderer.size();
    let scene = SceneState::new(config, size.width, size.height);

    let mut loader = AssetLoader::new();
    let requests = LoadRequest::for_scene(config);
    let launched = loader.start(requests);
    info!("started {launched} asset loader(s)");

    let mut app = AppState {
        renderer,
        scene,
        loader,
        started: Instant::now(),
        last_error: None,
    };

    event_loop
        .run_on_demand(|event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);
            if let Err(err) = app.process_event(&event, elwt) {
                app.last_error = Some(err);
                elwt.exit();
            }
        })
        .context("event loop terminated abnormally")?;

    if let Some(err) = app.last_error.take() {
        return Err(err);
    }

    Ok(())
}

struct AppState {
    renderer: Renderer,
    scene: SceneState,
    loader: AssetLoader,
    started: Instant,
    last_error: Option<anyhow::Error>,
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

impl AppState {
    fn process_event(&mut self, event: &Event<()>, elwt: &EventLoopWindowTarget<()>) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(size) => {
                        self.renderer.resize(*size);
                        self.scene.on_resize(size.width, size.height);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if event.state == ElementState::Pressed
                            && event.logical_key == Key::Named(NamedKey::Escape)
                        {
                            elwt.exit();
                        }
                    }
                    WindowEvent::MouseWheel { delta, .. } => self.wheel_moved(*delta),
                    WindowEvent::MouseInput { state, button, .. } => {
                        let mode = match button {
                            MouseButton::Left => Some(DragMode::Rotate),
                            MouseButton::Right => Some(DragMode::Pan),
                            _ => None,
                        };
                        if let Some(mode) = mode {
                            self.scene
                                .on_pointer_button(mode, *state == ElementState::Pressed);
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let pos = Vec2::new(position.x as f32, position.y as f32);
                        self.scene
                            .on_pointer_moved(pos, self.renderer.size().height);
                    }
                    WindowEvent::RedrawRequested => self.redraw()?,
                    _ => {}
                }
            }
            Event::AboutToWait => {
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn wheel_moved(&mut self, delta: MouseScrollDelta) {
        let amount = match delta {
            MouseScrollDelta::LineDelta(x, y) => x.abs() + y.abs(),
            MouseScrollDelta::PixelDelta(pos) => (pos.x.abs() + pos.y.abs()) as f32,
        };
        if amount == 0.0 {
            return;
        }
        if let WheelOutcome::Advanced { index, wrapped } =
            self.scene.on_wheel(self.started.elapsed())
        {
            info!("showing planet {index}{}", if wrapped { " (wrapped)" } else { "" });
        }
    }

    fn redraw(&mut self) -> Result<()> {
        for outcome in self.loader.drain() {
            self.apply_asset(outcome);
        }

        let frame = self.scene.tick(self.started.elapsed());
        if let Err(err) = self.renderer.render(&frame) {
            match err {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    let size = self.renderer.window().inner_size();
                    self.renderer.resize(size);
                }
                wgpu::SurfaceError::OutOfMemory => {
                    return Err(anyhow!("GPU is out of memory"));
                }
                wgpu::SurfaceError::Timeout => {
                    info!("Surface timeout; retrying next frame");
                }
            }
        }
        Ok(())
    }

    fn apply_asset(&mut self, outcome: LoadOutcome) {
        let LoadOutcome { key, path, result } = outcome;
        let settled = result
            .map_err(|err| err.to_string())
            .and_then(|texture| {
                self.renderer
                    .set_texture(key, &texture)
                    .map_err(|err| format!("unable to upload {}: {err:#}", path.display()))
            });
        if self.scene.on_asset(key, settled) == GateTransition::Opened {
            info!(
                "all assets settled ({} failed); revealing scene",
                self.scene.gate().failures().len()
            );
        }
    }
}

impl Drop for AppState {
    fn drop(&mut self) {
        let pending = self.scene.gate().pending();
        if !pending.is_empty() {
            warn!("exiting with {} asset(s) still loading", pending.len());
        }
    }
}

struct CliOptions {
    config: Option<PathBuf>,
    summary_only: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut config = None;
        let mut summary_only = false;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let Some(path) = args.next() else {
                        return Err(anyhow!(
                            "Usage: orbit-scene [--config <scene.xml>] [--summary-only]"
                        ));
                    };
                    config = Some(PathBuf::from(path));
                }
                "--summary-only" => summary_only = true,
                other => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Expected --config <scene.xml> or --summary-only"
                    ));
                }
            }
        }
        Ok(Self {
            config,
            summary_only,
        })
    }
}
