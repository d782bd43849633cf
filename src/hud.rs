//! Screen-space quads drawn over the 3D scene.

use glam::{Vec2, Vec3, Vec4};

/// Axis-aligned rectangle in normalized device coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub min: Vec2,
    pub max: Vec2,
    pub color: Vec4,
}

/// Column of heading panels, one per orbit position, seen through a window
/// one panel tall.
#[derive(Debug, Clone)]
pub struct HeadingColumn {
    colors: Vec<Vec3>,
    left: f32,
    right: f32,
    top: f32,
    height: f32,
}

impl HeadingColumn {
    pub fn new(colors: Vec<Vec3>) -> Self {
        Self {
            colors,
            left: -0.92,
            right: -0.42,
            top: 0.88,
            height: 0.18,
        }
    }

    /// Visible panel slices for a column shifted by `offset` panel heights
    /// (negative moves the column up).
    pub fn quads(&self, offset: f32) -> Vec<Quad> {
        let window_top = self.top;
        let window_bottom = self.top - self.height;

        self.colors
            .iter()
            .enumerate()
            .filter_map(|(index, color)| {
                let panel_top = self.top - (index as f32 + offset) * self.height;
                let top = panel_top.min(window_top);
                let bottom = (panel_top - self.height).max(window_bottom);
                (top - bottom > 1e-4).then(|| Quad {
                    min: Vec2::new(self.left, bottom),
                    max: Vec2::new(self.right, top),
                    color: color.extend(0.85),
                })
            })
            .collect()
    }
}

/// Full-screen cover for the loading state.
pub fn overlay_quad(opacity: f32) -> Quad {
    Quad {
        min: Vec2::splat(-1.0),
        max: Vec2::splat(1.0),
        color: Vec4::new(0.02, 0.02, 0.05, opacity.clamp(0.0, 1.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column() -> HeadingColumn {
        HeadingColumn::new(vec![Vec3::X, Vec3::Y, Vec3::Z, Vec3::ONE])
    }

    #[test]
    fn resting_column_shows_the_first_heading() {
        let quads = column().quads(0.0);
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].color.truncate(), Vec3::X);
        assert!((quads[0].max.y - quads[0].min.y - 0.18).abs() < 1e-6);
    }

    #[test]
    fn whole_step_shows_the_next_heading() {
        let quads = column().quads(-2.0);
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].color.truncate(), Vec3::Z);
    }

    #[test]
    fn half_step_splits_the_window_between_two_headings() {
        let quads = column().quads(-0.5);
        assert_eq!(quads.len(), 2);
        let total: f32 = quads.iter().map(|q| q.max.y - q.min.y).sum();
        assert!((total - 0.18).abs() < 1e-5);
    }

    #[test]
    fn overlay_opacity_is_clamped() {
        assert_eq!(overlay_quad(1.5).color.w, 1.0);
        assert_eq!(overlay_quad(-0.1).color.w, 0.0);
    }
}
