//! Flowsurface library - animated noise-displaced surface

pub mod cli;
pub mod error;
pub mod gpu;
pub mod params;
pub mod render;
pub mod shading;
pub mod simplex;
pub mod surface;
pub mod time;
