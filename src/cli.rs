//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::error::Result;
use crate::params::{RecordingConfig, RenderConfig, SurfaceParams};

/// What each output image shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputView {
    /// Palette-shaded surface
    Shaded,
    /// Displaced height as grayscale
    Height,
    /// Raw simplex noise slice
    Noise,
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "flowsurface")]
#[command(about = "Procedural flowing surface renderer", long_about = None)]
pub struct Args {
    /// Host elapsed time for a still frame (seconds, before time scaling)
    #[arg(long, value_name = "SECONDS", default_value = "0")]
    pub time: f32,

    /// Incline ramp strength
    #[arg(long, default_value = "1.0", allow_negative_numbers = true)]
    pub incline: f32,

    /// Plane subdivisions per side
    #[arg(long, default_value = "300")]
    pub segments: usize,

    /// Output view: shaded (default), height, noise
    #[arg(long, value_name = "VIEW", default_value = "shaded")]
    pub view: String,

    /// Image width (pixels)
    #[arg(long, default_value = "512")]
    pub width: u32,

    /// Image height (pixels)
    #[arg(long, default_value = "512")]
    pub height: u32,

    /// Output image path for a still frame
    #[arg(long, value_name = "PATH", default_value = "surface.png")]
    pub output: PathBuf,

    /// Record an animation to PNG frames (duration in seconds)
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,

    /// Recording frame rate
    #[arg(long, default_value = "30")]
    pub fps: u32,

    /// Run this many frames on the wall clock and report timings
    #[arg(long, value_name = "FRAMES")]
    pub bench: Option<u32>,

    /// Evaluate displacement with the GPU compute path
    #[arg(long)]
    pub gpu: bool,
}

impl Args {
    /// Parse output view from command-line arguments
    pub fn parse_view(&self) -> OutputView {
        match self.view.to_lowercase().as_str() {
            "shaded" => OutputView::Shaded,
            "height" => OutputView::Height,
            "noise" => OutputView::Noise,
            other => {
                log::warn!("Unknown view '{}', using shaded", other);
                OutputView::Shaded
            }
        }
    }

    /// Surface parameters with command-line overrides applied
    pub fn surface_params(&self) -> Result<SurfaceParams> {
        let params = SurfaceParams {
            segments: self.segments,
            incline: self.incline,
            ..SurfaceParams::default()
        };
        params.validate()?;
        Ok(params)
    }

    pub fn render_config(&self) -> Result<RenderConfig> {
        let config = RenderConfig {
            width: self.width,
            height: self.height,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create recording configuration if recording mode is enabled
    pub fn recording_config(&self) -> Result<Option<RecordingConfig>> {
        self.record
            .map(|duration| RecordingConfig::new(duration, self.fps))
            .transpose()
    }
}
