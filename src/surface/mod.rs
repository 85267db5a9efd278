//! Animated surface: plane mesh, per-vertex displacement and frame evaluation.

mod displace;
mod mesh;
mod system;

use bytemuck::{Pod, Zeroable};

// Re-export public types
pub use displace::{
    accumulate_noise, displace, NoiseOctave, BASE_COORD_SCALE, OCTAVE_COUNT, OCTAVE_WEIGHT,
    SCALE_GROWTH,
};
pub use mesh::PlaneMesh;
pub use system::{FrameStats, SurfaceSystem};

/// Vertex data for the plane mesh (position + UV coordinates)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Per-frame values shared read-only by every vertex invocation
///
/// Padded to 16 bytes so it can be written to a uniform buffer as-is.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SurfaceUniforms {
    /// Scaled elapsed time (monotonically non-decreasing)
    pub time: f32,
    /// Strength of the secondary linear ramp along V
    pub incline: f32,
    pub _padding: [f32; 2],
}

impl SurfaceUniforms {
    pub fn new(time: f32, incline: f32) -> Self {
        Self {
            time,
            incline,
            _padding: [0.0; 2],
        }
    }
}

/// Output of the displacement stage for one vertex
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct DisplacedVertex {
    pub position: [f32; 3],
    /// Accumulated octave noise, forwarded to shading
    pub noise: f32,
}
