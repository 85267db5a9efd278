//! Surface mesh and animation parameters.

use crate::error::{Error, Result};

/// Surface mesh and animation parameters
#[derive(Debug, Clone)]
pub struct SurfaceParams {
    /// Plane extent along X and Y (world units)
    pub plane_size: f32,

    /// Subdivisions per side (300 = 90,601 vertices)
    pub segments: usize,

    /// Strength of the linear incline ramp along V (dimensionless, settable at any time)
    pub incline: f32,

    /// Multiplier applied to host elapsed seconds before use as uniform time
    pub time_scale: f32,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self {
            plane_size: 5.0,
            segments: 300,
            incline: 1.0,
            time_scale: 0.1, // Slow drift, one noise unit every ~10s
        }
    }
}

impl SurfaceParams {
    /// Reject values that would produce an empty or non-finite surface
    pub fn validate(&self) -> Result<()> {
        if self.segments == 0 {
            return Err(Error::InvalidConfig(
                "segments must be at least 1".to_string(),
            ));
        }
        if !self.plane_size.is_finite() || self.plane_size <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "plane size must be positive, got {}",
                self.plane_size
            )));
        }
        if !self.incline.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "incline must be finite, got {}",
                self.incline
            )));
        }
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "time scale must be non-negative, got {}",
                self.time_scale
            )));
        }
        Ok(())
    }

    /// Vertices per side of the grid
    pub fn vertices_per_side(&self) -> usize {
        self.segments + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = SurfaceParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.vertices_per_side(), 301);
        assert_eq!(params.incline, 1.0);
        assert_eq!(params.time_scale, 0.1);
    }

    #[test]
    fn test_rejects_bad_values() {
        let zero_segments = SurfaceParams {
            segments: 0,
            ..SurfaceParams::default()
        };
        assert!(matches!(
            zero_segments.validate(),
            Err(Error::InvalidConfig(_))
        ));

        let nan_incline = SurfaceParams {
            incline: f32::NAN,
            ..SurfaceParams::default()
        };
        assert!(nan_incline.validate().is_err());

        let negative_size = SurfaceParams {
            plane_size: -1.0,
            ..SurfaceParams::default()
        };
        assert!(negative_size.validate().is_err());

        let backwards_time = SurfaceParams {
            time_scale: -0.1,
            ..SurfaceParams::default()
        };
        assert!(backwards_time.validate().is_err());
    }
}
