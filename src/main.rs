//! Flowsurface - a tessellated plane displaced by layered simplex noise
//!
//! Renders still frames, recordings and timing runs headlessly, shading the
//! surface through a fixed five-colour gradient.

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use flowsurface::cli::{Args, OutputView};
use flowsurface::error::Result;
use flowsurface::gpu::GpuDisplacer;
use flowsurface::params::{RecordingConfig, RenderConfig, SurfaceParams};
use flowsurface::render::{
    render_height, render_noise_slice, render_shaded, FrameImage, FrameRecorder,
};
use flowsurface::simplex::FlowNoise;
use flowsurface::surface::{FrameStats, SurfaceSystem, SurfaceUniforms};
use flowsurface::time::{FixedStepClock, FrameTimer, WallClock};

/// Spatial frequency of the raw noise preview (noise units per pixel)
const NOISE_PREVIEW_FREQUENCY: f64 = 0.02;

/// Main application state
struct App {
    // Simulation
    surface: SurfaceSystem,
    gpu: Option<GpuDisplacer>,

    // Configuration
    params: SurfaceParams,
    render_config: RenderConfig,
    view: OutputView,
}

impl App {
    fn new(args: &Args) -> Result<Self> {
        let params = args.surface_params()?;
        let render_config = args.render_config()?;
        let view = args.parse_view();

        let surface = SurfaceSystem::new(&params)?;
        log::info!(
            "Surface: {} segments, {} vertices, {} triangles, incline {}",
            params.segments,
            surface.mesh.vertices.len(),
            surface.mesh.indices.len() / 3,
            params.incline
        );

        let gpu = if args.gpu {
            Some(pollster::block_on(GpuDisplacer::new(&surface.mesh))?)
        } else {
            None
        };

        Ok(Self {
            surface,
            gpu,
            params,
            render_config,
            view,
        })
    }

    /// Advance the surface to uniform time `time`
    fn step(&mut self, time: f32) -> Result<FrameStats> {
        let stats = match &self.gpu {
            Some(gpu) => {
                let uniforms = SurfaceUniforms::new(time, self.params.incline);
                let displaced = pollster::block_on(gpu.displace(&uniforms))?;
                self.surface.load_displaced(uniforms, displaced)?
            }
            None => self.surface.update(time),
        };

        log::debug!(
            "t={:.4} noise {:.3}..{:.3} (mean {:.3}) z {:.3}..{:.3}",
            time,
            stats.min_noise,
            stats.max_noise,
            stats.mean_noise,
            stats.min_z,
            stats.max_z
        );
        Ok(stats)
    }

    /// Render the current frame for the selected view
    fn render(&self, time: f32) -> FrameImage {
        match self.view {
            OutputView::Shaded => {
                FrameImage::Rgba(render_shaded(&self.surface, &self.render_config))
            }
            OutputView::Height => {
                FrameImage::Gray(render_height(&self.surface, &self.render_config))
            }
            OutputView::Noise => FrameImage::Gray(render_noise_slice(
                &FlowNoise,
                &self.render_config,
                NOISE_PREVIEW_FREQUENCY,
                f64::from(time),
            )),
        }
    }

    /// Render a single frame at host time `elapsed_s`
    fn run_still(&mut self, elapsed_s: f32, path: &std::path::Path) -> Result<()> {
        let time = elapsed_s * self.params.time_scale;
        let stats = self.step(time)?;
        self.render(time).save(path)?;

        log::info!(
            "Saved {} (t={:.3}, noise max {:.3})",
            path.display(),
            time,
            stats.max_noise
        );
        Ok(())
    }

    /// Render a fixed-step animation to numbered frames
    fn run_recording(&mut self, config: RecordingConfig) -> Result<()> {
        let total_frames = config.total_frames();
        let mut timer = FrameTimer::new(FixedStepClock::new(config.fps)?, self.params.time_scale);
        let mut recorder = FrameRecorder::new(config)?;

        log::info!(
            "Recording {} frames to {}",
            total_frames,
            recorder.config().frames_dir().display()
        );

        for _ in 0..total_frames {
            let time = timer.tick();
            self.step(time)?;
            recorder.save_frame(&self.render(time))?;
        }

        log::info!("Recording complete: {} frames", recorder.frames_written());
        Ok(())
    }

    /// Evaluate frames back to back on the wall clock
    fn run_bench(&mut self, frames: u32) -> Result<()> {
        let mut timer = FrameTimer::new(WallClock::new(), self.params.time_scale);
        let start = Instant::now();

        for _ in 0..frames {
            let time = timer.tick();
            self.step(time)?;
        }

        let elapsed = start.elapsed().as_secs_f64();
        let per_frame_ms = if frames > 0 {
            elapsed * 1000.0 / f64::from(frames)
        } else {
            0.0
        };
        log::info!(
            "{} frames in {:.2}s ({:.2} ms/frame, {} backend)",
            frames,
            elapsed,
            per_frame_ms,
            if self.gpu.is_some() { "GPU" } else { "CPU" }
        );
        Ok(())
    }
}

fn run(args: &Args) -> Result<()> {
    let mut app = App::new(args)?;

    if let Some(frames) = args.bench {
        return app.run_bench(frames);
    }

    match args.recording_config()? {
        Some(config) => app.run_recording(config),
        None => app.run_still(args.time, &args.output),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
