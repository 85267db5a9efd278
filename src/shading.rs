//! Noise-to-colour mapping through a fixed five-stop gradient.

use glam::Vec3;

/// Gradient stops, indexed by `clamp(noise, 0, 1) * 4`
pub const PALETTE: [Vec3; 5] = [
    Vec3::new(1.000, 0.788, 0.910),
    Vec3::new(0.788, 0.910, 1.000),
    Vec3::new(0.824, 0.651, 1.000),
    Vec3::new(0.984, 0.769, 1.000),
    Vec3::new(0.769, 0.914, 1.000),
];

const LAST_STOP: usize = PALETTE.len() - 1;

/// Opaque RGB colour for an accumulated noise value
///
/// Piecewise-linear between neighbouring stops. At `noise >= 1` the upper
/// neighbour index is clamped, so the result is exactly the last stop.
pub fn shade(noise: f32) -> Vec3 {
    let t = noise.clamp(0.0, 1.0) * LAST_STOP as f32;
    let idx = (t.floor() as usize).min(LAST_STOP);
    let frac = t - idx as f32;

    PALETTE[idx].lerp(PALETTE[(idx + 1).min(LAST_STOP)], frac)
}

/// [`shade`] as an 8-bit RGBA pixel, alpha always 255
pub fn shade_rgba8(noise: f32) -> [u8; 4] {
    let c = shade(noise);
    let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    [to_byte(c.x), to_byte(c.y), to_byte(c.z), 255]
}
