use std::f32::consts::TAU;
use std::time::Duration;

use glam::{Mat4, Vec3};

use crate::asset_gate::AssetKey;
use crate::camera::CameraParams;
use crate::config::{OrbitConfig, SceneConfig};
use crate::hud::Quad;

/// Geometry a draw item uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshKind {
    /// Unit sphere, scaled per planet.
    Planet,
    /// Unit sphere facing inward.
    Starfield,
}

/// One mesh draw for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshKind,
    pub model: Mat4,
    pub texture: AssetKey,
}

/// Everything the renderer needs to draw one frame.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub camera: CameraParams,
    pub items: Vec<DrawItem>,
    pub quads: Vec<Quad>,
}

/// Placement of the planets on their shared orbit.
#[derive(Debug, Clone)]
pub struct OrbitLayout {
    orbit: OrbitConfig,
    radii: Vec<f32>,
    starfield_radius: f32,
}

impl OrbitLayout {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            orbit: config.orbit,
            radii: config.planets.iter().map(|p| p.radius).collect(),
            starfield_radius: config.starfield.radius,
        }
    }

    pub fn planet_count(&self) -> usize {
        self.radii.len()
    }

    /// Position of planet `index` inside the orbit group, evenly spaced on
    /// the circle.
    pub fn planet_position(&self, index: usize) -> Vec3 {
        let angle = index as f32 / self.planet_count() as f32 * TAU;
        Vec3::new(
            self.orbit.radius * angle.cos(),
            0.0,
            self.orbit.radius * angle.sin(),
        )
    }

    /// Transform of the orbit group for the animated Y rotation.
    pub fn group_transform(&self, rotation: f32) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, self.orbit.height, 0.0))
            * Mat4::from_rotation_x(self.orbit.tilt)
            * Mat4::from_rotation_y(rotation)
    }

    pub fn planet_model(&self, index: usize, rotation: f32, elapsed: Duration) -> Mat4 {
        let spin = elapsed.as_secs_f32() * self.orbit.spin_rate;
        self.group_transform(rotation)
            * Mat4::from_translation(self.planet_position(index))
            * Mat4::from_rotation_y(spin)
            * Mat4::from_scale(Vec3::splat(self.radii[index]))
    }

    pub fn starfield_model(&self) -> Mat4 {
        Mat4::from_scale(Vec3::splat(self.starfield_radius))
    }

    /// Draw list with the starfield first, then every planet.
    pub fn draw_items(&self, rotation: f32, elapsed: Duration) -> Vec<DrawItem> {
        let mut items = Vec::with_capacity(self.planet_count() + 1);
        items.push(DrawItem {
            mesh: MeshKind::Starfield,
            model: self.starfield_model(),
            texture: AssetKey::Starfield,
        });
        items.extend((0..self.planet_count()).map(|index| DrawItem {
            mesh: MeshKind::Planet,
            model: self.planet_model(index, rotation, elapsed),
            texture: AssetKey::Planet(index),
        }));
        items
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    fn layout() -> OrbitLayout {
        OrbitLayout::from_config(&SceneConfig::default())
    }

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn planets_are_spaced_evenly_on_the_orbit() {
        let layout = layout();
        assert_close(layout.planet_position(0), Vec3::new(4.5, 0.0, 0.0));
        assert_close(layout.planet_position(1), Vec3::new(0.0, 0.0, 4.5));
        assert_close(layout.planet_position(2), Vec3::new(-4.5, 0.0, 0.0));
        assert_close(layout.planet_position(3), Vec3::new(0.0, 0.0, -4.5));
    }

    #[test]
    fn quarter_turn_moves_each_planet_to_the_next_slot() {
        let layout = OrbitLayout {
            orbit: OrbitConfig {
                tilt: 0.0,
                height: 0.0,
                ..OrbitConfig::default()
            },
            ..layout()
        };
        let group = layout.group_transform(-FRAC_PI_2);
        let moved = group.transform_point3(layout.planet_position(0));
        assert_close(moved, layout.planet_position(1));
    }

    #[test]
    fn group_is_lowered_and_tilted() {
        let layout = layout();
        let center = layout.group_transform(0.0).transform_point3(Vec3::ZERO);
        assert_close(center, Vec3::new(0.0, -0.7, 0.0));
        let front = layout.group_transform(0.0).transform_point3(Vec3::new(0.0, 0.0, 4.5));
        assert!(front.y < -0.7);
    }

    #[test]
    fn draw_list_starts_with_the_starfield() {
        let items = layout().draw_items(0.0, Duration::ZERO);
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].mesh, MeshKind::Starfield);
        assert_eq!(items[0].texture, AssetKey::Starfield);
        assert_eq!(items[3].texture, AssetKey::Planet(2));
    }

    #[test]
    fn planets_spin_slowly_in_place() {
        let layout = layout();
        let model = layout.planet_model(0, 0.0, Duration::from_secs(100));
        let center = model.transform_point3(Vec3::ZERO);
        let resting = layout.planet_model(0, 0.0, Duration::ZERO).transform_point3(Vec3::ZERO);
        assert_close(center, resting);
        let surface = model.transform_point3(Vec3::X);
        assert!((surface - center).length() > 1.29);
    }
}
