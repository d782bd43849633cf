use std::time::Duration;

use glam::Vec2;
use log::info;

use crate::animation::{AnimationTarget, Animator};
use crate::asset_gate::{AssetGate, AssetKey, GateTransition};
use crate::camera::{Camera, DragMode, OrbitControls};
use crate::config::SceneConfig;
use crate::hud::{overlay_quad, HeadingColumn};
use crate::overlay::LoadingOverlay;
use crate::scene::{FrameSnapshot, OrbitLayout};
use crate::scroll::{ScrollStateMachine, WheelOutcome};

/// Window-independent state of the running scene.
///
/// Every input arrives on the event loop thread; the struct is driven by the
/// windowing glue and read back as a [`FrameSnapshot`] once per frame.
#[derive(Debug)]
pub struct SceneState {
    layout: OrbitLayout,
    headings: HeadingColumn,
    gate: AssetGate,
    scroll: ScrollStateMachine,
    animator: Animator,
    overlay: LoadingOverlay,
    camera: Camera,
    controls: OrbitControls,
    elapsed: Duration,
}

impl SceneState {
    pub fn new(config: &SceneConfig, width: u32, height: u32) -> Self {
        let mut animator = Animator::new();
        animator.set(AnimationTarget::OverlayOpacity, 1.0);
        Self {
            layout: OrbitLayout::from_config(config),
            headings: HeadingColumn::new(config.planets.iter().map(|p| p.color).collect()),
            gate: AssetGate::new(config.positions()).with_timeout(config.loading.timeout),
            scroll: ScrollStateMachine::new(
                config.positions(),
                config.scroll.throttle,
                config.scroll.duration,
            ),
            animator,
            overlay: LoadingOverlay::new(config.loading.fade),
            camera: Camera::new(&config.camera, width, height),
            controls: OrbitControls::new(config.camera.damping),
            elapsed: Duration::ZERO,
        }
    }

    pub fn gate(&self) -> &AssetGate {
        &self.gate
    }

    pub fn scroll(&self) -> &ScrollStateMachine {
        &self.scroll
    }

    pub fn overlay(&self) -> &LoadingOverlay {
        &self.overlay
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    /// Wheel input stamped with the time since startup.
    pub fn on_wheel(&mut self, at: Duration) -> WheelOutcome {
        self.scroll.on_wheel_event(at, &mut self.animator)
    }

    /// Returns false for zero-area sizes, which leave the camera untouched.
    pub fn on_resize(&mut self, width: u32, height: u32) -> bool {
        self.camera.set_viewport(width, height)
    }

    pub fn on_pointer_button(&mut self, mode: DragMode, pressed: bool) {
        if pressed {
            self.controls.pointer_down(mode);
        } else {
            self.controls.pointer_up(mode);
        }
    }

    pub fn on_pointer_moved(&mut self, position: Vec2, viewport_height: u32) {
        self.controls.pointer_moved(position, viewport_height);
    }

    /// Feeds a settled asset into the gate; failures carry their message.
    pub fn on_asset(&mut self, key: AssetKey, result: Result<(), String>) -> GateTransition {
        let transition = match result {
            Ok(()) => self.gate.record_asset_loaded(key),
            Err(message) => self.gate.record_asset_failed(key, message),
        };
        if transition == GateTransition::Opened {
            self.overlay.begin_fade(&mut self.animator);
        }
        transition
    }

    /// Advances animations to `elapsed` and returns the frame to draw.
    pub fn tick(&mut self, elapsed: Duration) -> FrameSnapshot {
        let dt = elapsed.saturating_sub(self.elapsed);
        self.elapsed = elapsed.max(self.elapsed);

        if self.gate.expire(self.elapsed) == GateTransition::Opened {
            self.overlay.begin_fade(&mut self.animator);
        }
        self.animator.advance(dt);
        self.overlay.update(&self.animator);
        self.controls.update(&mut self.camera);

        let rotation = self.animator.value(AnimationTarget::OrbitRotation);
        let mut quads = self
            .headings
            .quads(self.animator.value(AnimationTarget::HeadingOffset));
        if self.overlay.is_drawn() {
            quads.push(overlay_quad(
                self.animator.value(AnimationTarget::OverlayOpacity),
            ));
        }

        FrameSnapshot {
            camera: self.camera.params(),
            items: self.layout.draw_items(rotation, self.elapsed),
            quads,
        }
    }
}

/// Human-readable description of the resolved scene, one line per entry.
pub fn scene_summary(config: &SceneConfig) -> Vec<String> {
    let layout = OrbitLayout::from_config(config);
    let scroll = ScrollStateMachine::new(
        config.positions(),
        config.scroll.throttle,
        config.scroll.duration,
    );
    let mut lines = vec![format!(
        "Scene with {} planets ({} assets)",
        config.positions(),
        config.positions() + 2
    )];
    lines.extend(config.planets.iter().enumerate().map(|(index, planet)| {
        let position = layout.planet_position(index);
        format!(
            " - {} pos=({:.2}, {:.2}, {:.2}) texture={}",
            planet.name,
            printable(position.x),
            printable(position.y),
            printable(position.z),
            config.resolve(&planet.texture).display()
        )
    }));
    lines.push(format!(
        " - environment={}",
        config.resolve(&config.environment).display()
    ));
    lines.push(format!(
        " - starfield={}",
        config.resolve(&config.starfield.texture).display()
    ));
    lines.push(format!(
        "Scroll: throttle {} ms, tween {} ms, step {:.1} deg",
        config.scroll.throttle.as_millis(),
        config.scroll.duration.as_millis(),
        scroll.rotation_step().to_degrees()
    ));
    info!("summarized scene with {} planets", config.positions());
    lines
}

/// Flushes float noise so that values like `-1e-7` print as `0.00`.
fn printable(value: f32) -> f32 {
    if value.abs() < 5e-3 {
        0.0
    } else {
        value
    }
}
