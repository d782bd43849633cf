//! Perspective camera orbiting a movable target.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Mat4, Vec2, Vec3};

use crate::config::CameraConfig;

/// Camera parameters consumed by the renderer's uniform buffer.
#[derive(Clone, Copy, Debug)]
pub struct CameraParams {
    pub view_proj: Mat4,
    pub position: Vec3,
}

/// Orbital camera looking at `target` from `distance` away.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Vertical field of view, degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
    pub target: Vec3,
    pub distance: f32,
    /// Rotation around the Y axis, radians.
    pub azimuth: f32,
    /// Angle above the XZ plane, radians.
    pub elevation: f32,
}

impl Camera {
    pub fn new(config: &CameraConfig, width: u32, height: u32) -> Self {
        let mut camera = Self {
            fov: config.fov,
            near: config.near,
            far: config.far,
            aspect: 1.0,
            target: Vec3::ZERO,
            distance: config.distance,
            azimuth: 0.0,
            elevation: 0.0,
        };
        camera.set_viewport(width, height);
        camera
    }

    /// Updates the aspect ratio for a new viewport. Zero-area sizes are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.aspect = width as f32 / height as f32;
        true
    }

    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.elevation.cos() * self.azimuth.sin();
        let y = self.distance * self.elevation.sin();
        let z = self.distance * self.elevation.cos() * self.azimuth.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn params(&self) -> CameraParams {
        CameraParams {
            view_proj: self.projection_matrix() * self.view_matrix(),
            position: self.position(),
        }
    }
}

/// Pointer drag gestures understood by [`OrbitControls`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Orbit around the target.
    Rotate,
    /// Slide the target in the view plane.
    Pan,
}

/// Drag-to-orbit controller with inertial damping.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    damping: f32,
    /// Azimuth and elevation still to apply, radians.
    pending: Vec2,
    /// Pan still to apply, in viewport heights.
    pending_pan: Vec2,
    drag: Option<DragMode>,
    last_cursor: Option<Vec2>,
}

impl OrbitControls {
    pub fn new(damping: f32) -> Self {
        Self {
            damping: damping.clamp(0.0, 1.0),
            pending: Vec2::ZERO,
            pending_pan: Vec2::ZERO,
            drag: None,
            last_cursor: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn pointer_down(&mut self, mode: DragMode) {
        self.drag = Some(mode);
    }

    /// Ends the drag started with `mode`; releasing another button is ignored.
    pub fn pointer_up(&mut self, mode: DragMode) {
        if self.drag == Some(mode) {
            self.drag = None;
        }
    }

    /// Feeds a cursor position in physical pixels. A full viewport height of
    /// rotate drag turns the camera once around; dragging down raises it.
    pub fn pointer_moved(&mut self, position: Vec2, viewport_height: u32) {
        let Some(last) = self.last_cursor.replace(position) else {
            return;
        };
        if viewport_height == 0 {
            return;
        }
        let delta = (position - last) / viewport_height as f32;
        match self.drag {
            Some(DragMode::Rotate) => {
                self.pending.x -= delta.x * TAU;
                self.pending.y += delta.y * TAU;
            }
            Some(DragMode::Pan) => self.pending_pan += delta,
            None => {}
        }
    }

    /// Applies a damped share of the pending motion to the camera.
    pub fn update(&mut self, camera: &mut Camera) {
        let share = if self.damping <= 0.0 { 1.0 } else { self.damping };
        let rotation = self.pending * share;
        let pan = self.pending_pan * share;
        self.pending -= rotation;
        self.pending_pan -= pan;

        camera.azimuth += rotation.x;
        camera.elevation =
            (camera.elevation + rotation.y).clamp(-FRAC_PI_2 + 0.01, FRAC_PI_2 - 0.01);

        if pan != Vec2::ZERO {
            let forward = (camera.target - camera.position()).normalize_or_zero();
            let right = forward.cross(Vec3::Y).normalize_or_zero();
            let up = right.cross(forward);
            // World units spanned by one viewport height at the target.
            let span = 2.0 * camera.distance * (camera.fov.to_radians() * 0.5).tan();
            camera.target += (up * pan.y - right * pan.x) * span;
        }
    }
}
