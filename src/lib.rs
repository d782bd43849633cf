//! Building blocks for the orbit scene viewer.
//!
//! The scene state machines (asset gate, scroll stepping, tweens and the
//! loading overlay) are plain data driven by timestamps, so they can be
//! exercised without a window.  Only [`render`] touches the GPU.

pub mod animation;
pub mod app;
pub mod asset_gate;
pub mod assets;
pub mod camera;
pub mod config;
pub mod hud;
pub mod mesh;
pub mod overlay;
pub mod render;
pub mod scene;
pub mod scroll;

pub use animation::{AnimationRequest, AnimationSink, AnimationTarget, Animator, Easing, Motion};
pub use app::{scene_summary, SceneState};
pub use asset_gate::{AssetGate, AssetKey, GateState, GateTransition};
pub use assets::{AssetError, AssetLoader, LoadOutcome, LoadRequest, TextureData};
pub use camera::{Camera, CameraParams, DragMode, OrbitControls};
pub use config::SceneConfig;
pub use overlay::{LoadingOverlay, OverlayState};
pub use render::Renderer;
pub use scene::{DrawItem, FrameSnapshot, MeshKind, OrbitLayout};
pub use scroll::{ScrollStateMachine, Throttle, WheelOutcome};
