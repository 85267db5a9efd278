//! Subdivided plane mesh the surface is displaced from.

use crate::params::SurfaceParams;

use super::Vertex;

/// Flat plane in the XY plane (z = 0), built once and never mutated
///
/// Row 0 is the top edge (y = +size/2, v = 1), columns run along +X.
pub struct PlaneMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    segments: usize,
}

impl PlaneMesh {
    /// Create a new plane with the extent and subdivision in `params`
    pub fn new(params: &SurfaceParams) -> Self {
        let segments = params.segments;
        let side = params.vertices_per_side();
        let half_size = params.plane_size / 2.0;
        let segment_size = params.plane_size / segments as f32;

        let mut vertices = Vec::with_capacity(side * side);
        let mut indices = Vec::with_capacity(segments * segments * 6);

        for iy in 0..side {
            let y = iy as f32 * segment_size - half_size;
            for ix in 0..side {
                let x = ix as f32 * segment_size - half_size;

                vertices.push(Vertex {
                    position: [x, -y, 0.0],
                    uv: [
                        ix as f32 / segments as f32,
                        1.0 - iy as f32 / segments as f32,
                    ],
                });
            }
        }

        // Two triangles per cell, split along the (ix, iy+1)-(ix+1, iy) diagonal
        for iy in 0..segments {
            for ix in 0..segments {
                let a = (ix + side * iy) as u32;
                let b = (ix + side * (iy + 1)) as u32;
                let c = (ix + 1 + side * (iy + 1)) as u32;
                let d = (ix + 1 + side * iy) as u32;

                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self {
            vertices,
            indices,
            segments,
        }
    }

    /// Subdivisions per side
    pub fn segments(&self) -> usize {
        self.segments
    }

    /// Index of the vertex at column `ix`, row `iy`
    pub fn vertex_index(&self, ix: usize, iy: usize) -> usize {
        iy * (self.segments + 1) + ix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_mesh_creation() {
        let params = SurfaceParams::default();
        let mesh = PlaneMesh::new(&params);

        // Check vertex count: (segments + 1)^2
        assert_eq!(mesh.vertices.len(), (params.segments + 1).pow(2));

        // Check triangle count: segments^2 * 2 triangles * 3 indices
        assert_eq!(mesh.indices.len(), params.segments.pow(2) * 6);
    }

    #[test]
    fn test_plane_corners() {
        let params = SurfaceParams {
            segments: 4,
            ..SurfaceParams::default()
        };
        let mesh = PlaneMesh::new(&params);

        let top_left = mesh.vertices[mesh.vertex_index(0, 0)];
        assert_eq!(top_left.position, [-2.5, 2.5, 0.0]);
        assert_eq!(top_left.uv, [0.0, 1.0]);

        let bottom_right = mesh.vertices[mesh.vertex_index(4, 4)];
        assert_eq!(bottom_right.position, [2.5, -2.5, 0.0]);
        assert_eq!(bottom_right.uv, [1.0, 0.0]);

        assert!(mesh.vertices.iter().all(|v| v.position[2] == 0.0));
    }

    #[test]
    fn test_indices_in_range() {
        let params = SurfaceParams {
            segments: 3,
            ..SurfaceParams::default()
        };
        let mesh = PlaneMesh::new(&params);
        let count = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));

        // First cell: a=0, b=4, c=5, d=1
        assert_eq!(&mesh.indices[..6], &[0, 4, 1, 4, 5, 1]);
    }
}
