//! Vertex displacement: layered octave noise plus static tilt and incline ramps.

use glam::{FloatExt, Vec2, Vec3};

use super::{DisplacedVertex, SurfaceUniforms};
use crate::simplex::simplex3;

/// Number of noise layers summed per vertex
pub const OCTAVE_COUNT: usize = 5;

/// Weight applied to each (clamped) octave sample
pub const OCTAVE_WEIGHT: f32 = 0.4;

/// Spatial scale multiplier between consecutive octaves
pub const SCALE_GROWTH: f32 = 1.5;

/// UV to noise-space scale of the first octave
pub const BASE_COORD_SCALE: Vec2 = Vec2::new(10.0, 4.0);

/// Downward ramp along V (world units per unit V)
const TILT_PER_V: f32 = -0.9;

/// Incline ramp endpoints at V = 0 and V = 1
const INCLINE_RANGE: (f32, f32) = (-0.25, 0.25);

/// Parameters of one noise layer
///
/// The first layer's rates are nearly zero, so it drifts very slowly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseOctave {
    /// Time drift along the noise X axis
    pub flow_rate: f32,

    /// Time drift along the noise Z axis (before seeding)
    pub speed_rate: f32,

    /// Multiplier on the Z drift, separates layers in time
    pub seed: f32,

    /// Spatial frequency applied to the scaled UV coordinate
    pub frequency: Vec2,
}

impl NoiseOctave {
    /// Parameters for octave `index` (0-based)
    pub fn new(index: usize) -> Self {
        let i = index as f32;
        Self {
            flow_rate: 0.000_000_05 + i * 0.03,
            speed_rate: 0.000_000_1 + i * 0.03,
            seed: 1.0 + i * 2.0,
            frequency: Vec2::new(0.1, 0.2),
        }
    }

    /// Noise-space sample point for `coord` at `time`
    fn sample_point(&self, coord: Vec2, time: f32) -> Vec3 {
        Vec3::new(
            coord.x * self.frequency.x + time * self.flow_rate,
            coord.y * self.frequency.y,
            time * self.speed_rate * self.seed,
        )
    }
}

/// Sum of all octaves at `uv` for `time`
///
/// Each octave is clamped to be non-negative before weighting, so the
/// result is always >= 0 and the surface only ever rises.
pub fn accumulate_noise(uv: Vec2, time: f32) -> f32 {
    let mut total = 0.0;
    let mut scale = 1.0;

    for index in 0..OCTAVE_COUNT {
        let octave = NoiseOctave::new(index);
        let coord = uv * (BASE_COORD_SCALE * scale);
        let noise = simplex3(octave.sample_point(coord, time)).max(0.0);
        total += noise * OCTAVE_WEIGHT;
        scale *= SCALE_GROWTH;
    }

    total
}

/// Displace one vertex along its local Z axis
///
/// The base position is left untouched, a new position is returned together
/// with the accumulated noise for the shading stage.
pub fn displace(uv: Vec2, base_position: Vec3, uniforms: &SurfaceUniforms) -> DisplacedVertex {
    let noise = accumulate_noise(uv, uniforms.time);

    let tilt = TILT_PER_V * uv.y;
    let incline_offset = uniforms.incline * INCLINE_RANGE.0.lerp(INCLINE_RANGE.1, uv.y);

    let mut position = base_position;
    position.z += tilt;
    position.z += noise;
    position.z += incline_offset;

    DisplacedVertex {
        position: position.to_array(),
        noise,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_octave_table() {
        let first = NoiseOctave::new(0);
        assert_eq!(first.flow_rate, 0.000_000_05);
        assert_eq!(first.speed_rate, 0.000_000_1);
        assert_eq!(first.seed, 1.0);

        let last = NoiseOctave::new(OCTAVE_COUNT - 1);
        assert!((last.flow_rate - 0.12).abs() < 1e-6);
        assert!((last.speed_rate - 0.12).abs() < 1e-6);
        assert_eq!(last.seed, 9.0);
        assert_eq!(last.frequency, Vec2::new(0.1, 0.2));
    }

    #[test]
    fn test_origin_at_time_zero_is_flat() {
        // Every octave samples the lattice origin, which is negative and clamped away
        assert_eq!(accumulate_noise(Vec2::ZERO, 0.0), 0.0);

        let out = displace(Vec2::ZERO, Vec3::ZERO, &SurfaceUniforms::new(0.0, 0.0));
        assert_eq!(out.position, [0.0, 0.0, 0.0]);
        assert_eq!(out.noise, 0.0);
    }

    #[test]
    fn test_accumulated_reference_values() {
        let centre = accumulate_noise(Vec2::new(0.5, 0.5), 0.0);
        assert!((centre - 0.620_688_2).abs() < EPS, "got {centre}");

        // Single-precision reference, matches a GLSL float evaluation
        let later = accumulate_noise(Vec2::new(0.25, 0.75), 1.0);
        assert!((later - 0.638_622_6).abs() < EPS, "got {later}");
    }

    #[test]
    fn test_accumulated_noise_never_negative() {
        for t in [0.0, 0.35, 1.0, 4.2, 12.0] {
            for a in 0..=20 {
                for b in 0..=20 {
                    let uv = Vec2::new(a as f32 / 20.0, b as f32 / 20.0);
                    let n = accumulate_noise(uv, t);
                    assert!(n >= 0.0, "negative noise {n} at {uv} t={t}");
                    assert!(n.is_finite());
                }
            }
        }
    }

    #[test]
    fn test_tilt_and_incline_are_additive() {
        let uv = Vec2::new(0.0, 1.0);
        let base = Vec3::new(-2.5, 2.5, 0.0);
        let uniforms = SurfaceUniforms::new(0.7, 1.0);
        let out = displace(uv, base, &uniforms);

        // tilt = -0.9, incline offset = +0.25
        let ramp = out.position[2] - out.noise;
        assert!((ramp - (-0.65)).abs() < 1e-5, "got {ramp}");
    }

    #[test]
    fn test_incline_independent_of_noise() {
        let uv = Vec2::new(0.4, 0.8);
        let base = Vec3::new(0.3, -0.2, 0.0);
        let flat = displace(uv, base, &SurfaceUniforms::new(2.0, 0.0));
        let steep = displace(uv, base, &SurfaceUniforms::new(2.0, 3.0));

        assert_eq!(flat.noise, steep.noise);
        let expected = 3.0 * (-0.25f32).lerp(0.25, 0.8);
        assert!((steep.position[2] - flat.position[2] - expected).abs() < 1e-5);
    }

    #[test]
    fn test_only_z_moves() {
        let base = Vec3::new(1.25, -0.75, 0.0);
        let out = displace(Vec2::new(0.75, 0.35), base, &SurfaceUniforms::new(3.0, 1.0));
        assert_eq!(out.position[0], base.x);
        assert_eq!(out.position[1], base.y);
    }

    #[test]
    fn test_displacement_is_idempotent() {
        let uv = Vec2::new(0.61, 0.27);
        let base = Vec3::new(0.55, 1.15, 0.0);
        let uniforms = SurfaceUniforms::new(1.7, 1.0);
        assert_eq!(displace(uv, base, &uniforms), displace(uv, base, &uniforms));
    }

    #[test]
    fn test_time_changes_surface() {
        let uv = Vec2::new(0.5, 0.5);
        let a = accumulate_noise(uv, 0.0);
        let b = accumulate_noise(uv, 5.0);
        assert_ne!(a, b);
    }
}
