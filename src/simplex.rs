//! 3D simplex gradient noise.
//!
//! Lattice skewing, corner ordering and a polynomial permutation hash
//! (`((x * 34 + 1) * x) mod 289`) instead of a lookup table, so the same
//! field can be evaluated bit-for-bit by the WGSL port in `gpu/surface.wgsl`.

use glam::{Vec2, Vec3, Vec3Swizzles, Vec4, Vec4Swizzles};
use noise::NoiseFn;

/// Squared kernel radius of each corner contribution
const KERNEL_RADIUS_SQ: f32 = 0.6;

/// Final output scale, brings the sum roughly into [-1, 1]
const OUTPUT_SCALE: f32 = 42.0;

/// Floored modulo (result has the sign of the divisor, like GLSL `mod`)
fn mod289_3(x: Vec3) -> Vec3 {
    x - (x / 289.0).floor() * 289.0
}

fn mod289_4(x: Vec4) -> Vec4 {
    x - (x / 289.0).floor() * 289.0
}

fn permute(x: Vec4) -> Vec4 {
    mod289_4(((x * 34.0) + 1.0) * x)
}

/// First-order Taylor approximation of `1 / sqrt(r)` around r = 0.7
fn taylor_inv_sqrt(r: Vec4) -> Vec4 {
    1.792_842_9 - 0.853_734_73 * r
}

/// `edge <= x` per component, 1.0 or 0.0
fn step3(edge: Vec3, x: Vec3) -> Vec3 {
    Vec3::select(x.cmpge(edge), Vec3::ONE, Vec3::ZERO)
}

fn step4(edge: Vec4, x: Vec4) -> Vec4 {
    Vec4::select(x.cmpge(edge), Vec4::ONE, Vec4::ZERO)
}

/// Sample 3D simplex noise at `v`
///
/// Pure and deterministic. Output is roughly in [-1, 1] but not tightly
/// bounded, callers that need a range must clamp.
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn simplex3(v: Vec3) -> f32 {
    const C: Vec2 = Vec2::new(1.0 / 6.0, 1.0 / 3.0);
    const D: Vec4 = Vec4::new(0.0, 0.5, 1.0, 2.0);

    // First corner
    let i = (v + v.dot(Vec3::splat(C.y))).floor();
    let x0 = v - i + i.dot(Vec3::splat(C.x));

    // Remaining corners, ordered by comparing the offset components
    let g = step3(x0.yzx(), x0);
    let l = Vec3::ONE - g;
    let i1 = g.min(l.zxy());
    let i2 = g.max(l.zxy());

    let x1 = x0 - i1 + C.x;
    let x2 = x0 - i2 + 2.0 * C.x;
    let x3 = x0 - 1.0 + 3.0 * C.x;

    let i = mod289_3(i);
    let p = permute(
        permute(
            permute(i.z + Vec4::new(0.0, i1.z, i2.z, 1.0)) + i.y + Vec4::new(0.0, i1.y, i2.y, 1.0),
        ) + i.x
            + Vec4::new(0.0, i1.x, i2.x, 1.0),
    );

    // Gradients: 7x7 points over a square, mapped onto an octahedron
    let n_: f32 = 1.0 / 7.0;
    let ns = n_ * D.wyz() - D.xzx();

    let j = p - 49.0 * (p * ns.z * ns.z).floor();

    let x_ = (j * ns.z).floor();
    let y_ = (j - 7.0 * x_).floor();

    let x = x_ * ns.x + ns.y;
    let y = y_ * ns.x + ns.y;
    let h = 1.0 - x.abs() - y.abs();

    let b0 = Vec4::new(x.x, x.y, y.x, y.y);
    let b1 = Vec4::new(x.z, x.w, y.z, y.w);

    let s0 = b0.floor() * 2.0 + 1.0;
    let s1 = b1.floor() * 2.0 + 1.0;
    let sh = -step4(h, Vec4::ZERO);

    let a0 = b0.xzyw() + s0.xzyw() * sh.xxyy();
    let a1 = b1.xzyw() + s1.xzyw() * sh.zzww();

    let mut p0 = Vec3::new(a0.x, a0.y, h.x);
    let mut p1 = Vec3::new(a0.z, a0.w, h.y);
    let mut p2 = Vec3::new(a1.x, a1.y, h.z);
    let mut p3 = Vec3::new(a1.z, a1.w, h.w);

    let norm = taylor_inv_sqrt(Vec4::new(p0.dot(p0), p1.dot(p1), p2.dot(p2), p3.dot(p3)));
    p0 *= norm.x;
    p1 *= norm.y;
    p2 *= norm.z;
    p3 *= norm.w;

    // Quartic falloff per corner
    let m = (KERNEL_RADIUS_SQ - Vec4::new(x0.dot(x0), x1.dot(x1), x2.dot(x2), x3.dot(x3)))
        .max(Vec4::ZERO);
    let m = m * m;

    OUTPUT_SCALE * (m * m).dot(Vec4::new(p0.dot(x0), p1.dot(x1), p2.dot(x2), p3.dot(x3)))
}

/// Stateless handle over [`simplex3`] for code written against `noise::NoiseFn`
#[derive(Clone, Copy, Debug, Default)]
pub struct FlowNoise;

impl FlowNoise {
    /// Sample 3D simplex noise at position
    pub fn sample_3d(&self, x: f32, y: f32, z: f32) -> f32 {
        simplex3(Vec3::new(x, y, z))
    }
}

impl NoiseFn<f64, 3> for FlowNoise {
    fn get(&self, point: [f64; 3]) -> f64 {
        f64::from(self.sample_3d(point[0] as f32, point[1] as f32, point[2] as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference values use single-precision rounding throughout, as a GLSL
    // `float` evaluation does. In f64, 1/7 rounds low and some corners pick a
    // different lattice gradient.
    const EPS: f32 = 1e-4;

    #[test]
    fn test_origin_reference_value() {
        let n = simplex3(Vec3::ZERO);
        assert!((n - (-0.412_198_8)).abs() < EPS, "got {n}");
    }

    #[test]
    fn test_reference_values() {
        let cases = [
            (Vec3::new(1.3, -2.7, 4.1), 0.112_952_95),
            (Vec3::new(10.25, 3.5, -1.75), -0.120_632_02),
            (Vec3::new(0.1, 0.2, 0.3), -0.475_501_8),
            (Vec3::new(-5.5, 7.25, 0.0), -0.441_956_2),
        ];
        for (v, expected) in cases {
            let n = simplex3(v);
            assert!((n - expected).abs() < EPS, "noise at {v} = {n}, expected {expected}");
        }
    }

    #[test]
    fn test_deterministic() {
        for k in 0..200 {
            let v = Vec3::new(k as f32 * 0.37, k as f32 * -0.11, k as f32 * 0.053);
            assert_eq!(simplex3(v).to_bits(), simplex3(v).to_bits());
        }
    }

    #[test]
    fn test_bounded_and_finite() {
        for x in -20..20 {
            for y in -20..20 {
                for z in -5..5 {
                    let v = Vec3::new(x as f32 * 0.73, y as f32 * 0.41, z as f32 * 1.17);
                    let n = simplex3(v);
                    assert!(n.is_finite(), "non-finite noise at {v}");
                    assert!(n.abs() <= 1.2, "noise {n} out of range at {v}");
                }
            }
        }
    }

    #[test]
    fn test_varies_across_space() {
        let a = simplex3(Vec3::new(0.3, 0.7, 0.1));
        let b = simplex3(Vec3::new(2.9, -1.4, 0.6));
        assert_ne!(a, b);
    }

    #[test]
    fn test_noise_fn_adapter_matches() {
        let noise = FlowNoise;
        let direct = simplex3(Vec3::new(1.3, -2.7, 4.1));
        let via_trait = noise.get([1.3, -2.7, 4.1]) as f32;
        assert!((direct - via_trait).abs() < 1e-6);
    }
}
