//! Off-screen runs: render a fixed number of frames without a window.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::SampleConfig;
use crate::samples::{create_renderer, FrameOutcome, Renderer};
use crate::view::{GpuView, OffscreenView};

/// Summary of a headless run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessReport {
    pub submitted: u64,
    pub skipped: u64,
    pub presented: u64,
}

/// Render `config.headless_frames` frames of the configured sample off screen.
///
/// When `config.capture` is set the final frame is written there as a PNG.
pub async fn run_headless(config: &SampleConfig) -> Result<HeadlessReport> {
    let mut view = OffscreenView::new(config.size())
        .await
        .context("failed to create off-screen view")?;
    let mut renderer = create_renderer(config.sample, &view, config)
        .with_context(|| format!("failed to initialize {} sample", config.sample))?;

    let report = render_frames(renderer.as_mut(), &mut view, config.headless_frames);
    log::info!(
        "{}: {} frames submitted, {} skipped",
        config.sample,
        report.submitted,
        report.skipped
    );

    if let Some(path) = &config.capture {
        capture(&view, path)?;
    }
    Ok(report)
}

/// Drive `renderer` for `frames` frames against `view`.
pub fn render_frames(
    renderer: &mut dyn Renderer,
    view: &mut OffscreenView,
    frames: u32,
) -> HeadlessReport {
    renderer.on_resize(view.drawable_size());
    let mut skipped = 0;
    for _ in 0..frames {
        if renderer.render_frame(view) == FrameOutcome::Skipped {
            skipped += 1;
        }
    }
    HeadlessReport {
        submitted: renderer.frames_submitted(),
        skipped,
        presented: view.presented_frames(),
    }
}

fn capture(view: &OffscreenView, path: &Path) -> Result<()> {
    let size = view.drawable_size();
    let pixels = view.read_pixels().context("failed to read back frame")?;
    let image = image::RgbaImage::from_raw(size.width, size.height, pixels)
        .context("frame readback has unexpected size")?;
    image
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("Captured frame to {}", path.display());
    Ok(())
}
