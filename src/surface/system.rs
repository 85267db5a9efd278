//! Frame-level evaluation of the surface over every mesh vertex.

use glam::{Vec2, Vec3};
use rayon::prelude::*;

use super::displace::displace;
use super::mesh::PlaneMesh;
use super::{DisplacedVertex, SurfaceUniforms};
use crate::error::{Error, Result};
use crate::params::SurfaceParams;

/// Summary of one evaluated frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub min_noise: f32,
    pub max_noise: f32,
    pub mean_noise: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl FrameStats {
    fn from_displaced(displaced: &[DisplacedVertex]) -> Self {
        let init = Self {
            min_noise: f32::INFINITY,
            max_noise: f32::NEG_INFINITY,
            mean_noise: 0.0,
            min_z: f32::INFINITY,
            max_z: f32::NEG_INFINITY,
        };

        let mut sum = 0.0f64;
        let mut stats = displaced.iter().fold(init, |acc, v| {
            sum += f64::from(v.noise);
            Self {
                min_noise: acc.min_noise.min(v.noise),
                max_noise: acc.max_noise.max(v.noise),
                mean_noise: 0.0,
                min_z: acc.min_z.min(v.position[2]),
                max_z: acc.max_z.max(v.position[2]),
            }
        });

        if !displaced.is_empty() {
            stats.mean_noise = (sum / displaced.len() as f64) as f32;
        }
        stats
    }
}

/// Surface mesh plus the displaced buffer for the current frame
pub struct SurfaceSystem {
    pub mesh: PlaneMesh,
    uniforms: SurfaceUniforms,
    displaced: Vec<DisplacedVertex>,
    stats: FrameStats,
}

impl SurfaceSystem {
    /// Create a surface evaluated at time zero
    pub fn new(params: &SurfaceParams) -> Result<Self> {
        params.validate()?;

        let mesh = PlaneMesh::new(params);
        let mut system = Self {
            displaced: vec![DisplacedVertex::default(); mesh.vertices.len()],
            mesh,
            uniforms: SurfaceUniforms::new(0.0, params.incline),
            stats: FrameStats::from_displaced(&[]),
        };
        system.update(0.0);
        Ok(system)
    }

    /// Evaluate the displacement stage for every vertex at `time`
    ///
    /// Vertices are independent, so the buffer is filled in parallel.
    pub fn update(&mut self, time: f32) -> FrameStats {
        self.uniforms.time = time;
        let uniforms = self.uniforms;

        self.displaced
            .par_iter_mut()
            .zip(self.mesh.vertices.par_iter())
            .for_each(|(out, vertex)| {
                *out = displace(
                    Vec2::from_array(vertex.uv),
                    Vec3::from_array(vertex.position),
                    &uniforms,
                );
            });

        self.stats = FrameStats::from_displaced(&self.displaced);
        self.stats
    }

    /// Accept a frame evaluated elsewhere (e.g. on the GPU) for `uniforms`
    pub fn load_displaced(
        &mut self,
        uniforms: SurfaceUniforms,
        displaced: Vec<DisplacedVertex>,
    ) -> Result<FrameStats> {
        if displaced.len() != self.mesh.vertices.len() {
            return Err(Error::VertexCountMismatch {
                expected: self.mesh.vertices.len(),
                actual: displaced.len(),
            });
        }
        self.uniforms = uniforms;
        self.displaced = displaced;
        self.stats = FrameStats::from_displaced(&self.displaced);
        Ok(self.stats)
    }

    /// Change the incline, takes effect on the next update
    pub fn set_incline(&mut self, incline: f32) {
        self.uniforms.incline = incline;
    }

    pub fn uniforms(&self) -> SurfaceUniforms {
        self.uniforms
    }

    pub fn displaced(&self) -> &[DisplacedVertex] {
        &self.displaced
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Forwarded noise at `uv`, interpolated over the containing triangle
    pub fn sample_noise(&self, uv: Vec2) -> f32 {
        self.interpolate(uv, |v| v.noise)
    }

    /// Displaced height at `uv`, interpolated over the containing triangle
    pub fn sample_height(&self, uv: Vec2) -> f32 {
        self.interpolate(uv, |v| v.position[2])
    }

    /// Barycentric interpolation matching the mesh triangulation
    fn interpolate(&self, uv: Vec2, value: impl Fn(&DisplacedVertex) -> f32) -> f32 {
        let segments = self.mesh.segments();
        let uv = uv.clamp(Vec2::ZERO, Vec2::ONE);

        // Grid coordinates: columns follow u, rows run from v = 1 down to v = 0
        let gx = uv.x * segments as f32;
        let gy = (1.0 - uv.y) * segments as f32;
        let ix = (gx.floor() as usize).min(segments - 1);
        let iy = (gy.floor() as usize).min(segments - 1);
        let fx = gx - ix as f32;
        let fy = gy - iy as f32;

        let at = |x: usize, y: usize| value(&self.displaced[self.mesh.vertex_index(x, y)]);
        let a = at(ix, iy);
        let b = at(ix, iy + 1);
        let c = at(ix + 1, iy + 1);
        let d = at(ix + 1, iy);

        if fx + fy <= 1.0 {
            // Triangle (a, b, d)
            a + fx * (d - a) + fy * (b - a)
        } else {
            // Triangle (b, c, d)
            c + (1.0 - fx) * (b - c) + (1.0 - fy) * (d - c)
        }
    }
}
