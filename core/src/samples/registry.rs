//! Sample lookup by name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{ClearRenderer, DepthRenderer, GrayscaleRenderer, Renderer, TriangleRenderer};
use crate::config::SampleConfig;
use crate::gpu::InitializationError;
use crate::source::SourceImage;
use crate::view::GpuView;

/// Size of the generated image used when no image file is configured.
pub const TEST_PATTERN_SIZE: (u32, u32) = (512, 384);

/// Frame samples the app shell can host.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum SampleKind {
    Clear,
    #[default]
    Triangle,
    Grayscale,
    Depth,
}

impl SampleKind {
    pub fn all() -> &'static [SampleKind] {
        &[Self::Clear, Self::Triangle, Self::Grayscale, Self::Depth]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Triangle => "triangle",
            Self::Grayscale => "grayscale",
            Self::Depth => "depth",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear the view to a cycling color",
            Self::Triangle => "Draw a colored triangle in pixel coordinates",
            Self::Grayscale => "Convert an image to grayscale in a compute kernel and draw it",
            Self::Depth => "Draw overlapping primitives with depth testing",
        }
    }
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown sample: {s}"))
    }
}

/// Build the renderer for `kind` against `view`.
pub fn create_renderer(
    kind: SampleKind,
    view: &dyn GpuView,
    config: &SampleConfig,
) -> Result<Box<dyn Renderer>, InitializationError> {
    log::info!("Initializing {} sample", kind);
    let renderer: Box<dyn Renderer> = match kind {
        SampleKind::Clear => Box::new(ClearRenderer::new(view)),
        SampleKind::Triangle => Box::new(TriangleRenderer::new(view)?),
        SampleKind::Grayscale => {
            let image = match &config.image {
                Some(path) => SourceImage::load(path)?,
                None => SourceImage::test_pattern(TEST_PATTERN_SIZE.0, TEST_PATTERN_SIZE.1),
            };
            Box::new(GrayscaleRenderer::new(view, &image)?)
        }
        SampleKind::Depth => Box::new(DepthRenderer::new(view)?),
    };
    Ok(renderer)
}
