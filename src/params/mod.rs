//! Parameter definitions with units and documented semantics.
//!
//! All tunable numbers live here with:
//! - Units (world units, seconds, pixels)
//! - Documented ranges and meanings
//! - Validation for values the rest of the crate relies on

mod render;
mod surface;

// Re-export all types
pub use render::{RecordingConfig, RenderConfig};
pub use surface::SurfaceParams;
