//! UV sphere geometry shared by the planets and the starfield.

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Interleaved vertex consumed by the mesh pipeline.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// CPU-side mesh ready for upload.
#[derive(Debug, Clone, Default)]
pub struct SphereMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

/// Which side of the sphere faces the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Outward,
    /// Normals point at the center, for skies seen from inside.
    Inward,
}

impl SphereMesh {
    /// Generates a sphere of `radius` with `segments` slices around the Y
    /// axis and `rings` stacks from pole to pole.
    pub fn uv_sphere(radius: f32, segments: u32, rings: u32, facing: Facing) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);

        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            let y = phi.cos();
            let ring_radius = phi.sin();

            for seg in 0..=segments {
                let theta = TAU * seg as f32 / segments as f32;
                let unit = Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin());
                let normal = match facing {
                    Facing::Outward => unit,
                    Facing::Inward => -unit,
                };

                vertices.push(MeshVertex {
                    position: (unit * radius).to_array(),
                    normal: normal.to_array(),
                    uv: [seg as f32 / segments as f32, ring as f32 / rings as f32],
                });
            }
        }

        for ring in 0..rings {
            for seg in 0..segments {
                let current = ring * (segments + 1) + seg;
                let next = current + segments + 1;
                let quad = [current, next, current + 1, current + 1, next, next + 1];
                match facing {
                    Facing::Outward => indices.extend_from_slice(&quad),
                    Facing::Inward => indices.extend(quad.chunks(3).flat_map(|t| [t[0], t[2], t[1]])),
                }
            }
        }

        Self { vertices, indices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_has_expected_counts() {
        let mesh = SphereMesh::uv_sphere(1.0, 8, 4, Facing::Outward);
        assert_eq!(mesh.vertices.len(), 9 * 5);
        assert_eq!(mesh.indices.len(), 8 * 4 * 6);
        let max = *mesh.indices.iter().max().unwrap() as usize;
        assert!(max < mesh.vertices.len());
    }

    #[test]
    fn vertices_lie_on_the_radius() {
        let mesh = SphereMesh::uv_sphere(1.3, 16, 16, Facing::Outward);
        for vertex in &mesh.vertices {
            let length = Vec3::from(vertex.position).length();
            assert!((length - 1.3).abs() < 1e-4);
            let normal = Vec3::from(vertex.normal);
            assert!((normal.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn inward_sphere_flips_normals_and_winding() {
        let outward = SphereMesh::uv_sphere(50.0, 8, 8, Facing::Outward);
        let inward = SphereMesh::uv_sphere(50.0, 8, 8, Facing::Inward);
        for (a, b) in outward.vertices.iter().zip(&inward.vertices) {
            assert_eq!(a.position, b.position);
            assert_eq!(Vec3::from(a.normal), -Vec3::from(b.normal));
        }
        assert_eq!(&outward.indices[..3], &[inward.indices[0], inward.indices[2], inward.indices[1]]);
    }
}
