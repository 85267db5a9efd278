//! Headless per-pixel output: shaded frames, height maps, noise previews.
//!
//! Pixels are laid out in the plane's UV space (top row is v = 1), viewed
//! straight down the surface normal.

use std::path::{Path, PathBuf};

use glam::Vec2;
use image::{GrayImage, Luma, Rgba, RgbaImage};
use noise::NoiseFn;
use rayon::prelude::*;

use crate::error::Result;
use crate::params::{RecordingConfig, RenderConfig};
use crate::shading::shade_rgba8;
use crate::surface::SurfaceSystem;

/// UV coordinate at the centre of pixel (`px`, `py`)
pub fn pixel_uv(px: u32, py: u32, width: u32, height: u32) -> Vec2 {
    Vec2::new(
        (px as f32 + 0.5) / width as f32,
        1.0 - (py as f32 + 0.5) / height as f32,
    )
}

/// Shade every pixel from the noise forwarded by the current frame
///
/// Pixels are independent and shaded in parallel.
pub fn render_shaded(system: &SurfaceSystem, config: &RenderConfig) -> RgbaImage {
    let mut image = RgbaImage::new(config.width, config.height);
    image.par_enumerate_pixels_mut().for_each(|(px, py, pixel)| {
        let uv = pixel_uv(px, py, config.width, config.height);
        *pixel = Rgba(shade_rgba8(system.sample_noise(uv)));
    });
    image
}

/// Displaced height normalized over the frame's range
///
/// A flat frame maps to mid grey.
pub fn render_height(system: &SurfaceSystem, config: &RenderConfig) -> GrayImage {
    let stats = system.stats();
    let range = stats.max_z - stats.min_z;

    let mut image = GrayImage::new(config.width, config.height);
    image.par_enumerate_pixels_mut().for_each(|(px, py, pixel)| {
        let uv = pixel_uv(px, py, config.width, config.height);
        let z = system.sample_height(uv);
        let level = if range > f32::EPSILON {
            (z - stats.min_z) / range
        } else {
            0.5
        };
        *pixel = Luma([(level.clamp(0.0, 1.0) * 255.0).round() as u8]);
    });
    image
}

/// Grayscale slice of a 3D noise field at depth `z`
///
/// Noise from [-1, 1] maps to [0, 255]; values outside are clamped.
pub fn render_noise_slice<N: NoiseFn<f64, 3>>(
    noise: &N,
    config: &RenderConfig,
    frequency: f64,
    z: f64,
) -> GrayImage {
    GrayImage::from_fn(config.width, config.height, |x, y| {
        let value = noise.get([x as f64 * frequency, y as f64 * frequency, z]);
        Luma([((value + 1.0) * 127.5).clamp(0.0, 255.0) as u8])
    })
}

/// One rendered output frame
pub enum FrameImage {
    Rgba(RgbaImage),
    Gray(GrayImage),
}

impl FrameImage {
    pub fn save(&self, path: &Path) -> Result<()> {
        match self {
            Self::Rgba(image) => save_image(image, path),
            Self::Gray(image) => save_image(image, path),
        }
    }
}

/// Writes numbered PNG frames for a recording
pub struct FrameRecorder {
    config: RecordingConfig,
    frames_written: usize,
}

impl FrameRecorder {
    /// Create the frame directory and start at frame 0
    pub fn new(config: RecordingConfig) -> Result<Self> {
        std::fs::create_dir_all(config.frames_dir())?;
        Ok(Self {
            config,
            frames_written: 0,
        })
    }

    pub fn config(&self) -> &RecordingConfig {
        &self.config
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Save the next frame, returns its path
    pub fn save_frame(&mut self, image: &FrameImage) -> Result<PathBuf> {
        let path = self.config.frame_path(self.frames_written);
        image.save(&path)?;
        self.frames_written += 1;
        Ok(path)
    }
}

/// Save an image, creating parent directories as needed
pub fn save_image<P, C>(image: &image::ImageBuffer<P, C>, path: &Path) -> Result<()>
where
    P: image::PixelWithColorType,
    [P::Subpixel]: image::EncodableLayout,
    C: std::ops::Deref<Target = [P::Subpixel]>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    image.save(path)?;
    log::debug!("Saved {}", path.display());
    Ok(())
}
