//! Sample configuration, loadable from JSON and overridable from the command line.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::samples::adder::DEFAULT_ARRAY_LENGTH;
use crate::samples::SampleKind;
use crate::view::ViewportSize;

/// Settings shared by the windowed, headless and compute runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    pub sample: SampleKind,
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Image for the grayscale sample; a generated pattern when unset.
    pub image: Option<PathBuf>,
    pub array_length: usize,
    /// Frames rendered by a headless run.
    pub headless_frames: u32,
    /// PNG written with the last headless frame.
    pub capture: Option<PathBuf>,
    pub vsync: bool,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            sample: SampleKind::default(),
            title: "GPU Essentials".to_string(),
            width: 800,
            height: 600,
            image: None,
            array_length: DEFAULT_ARRAY_LENGTH,
            headless_frames: 1,
            capture: None,
            vsync: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SampleConfig {
    /// Load a config file. Missing keys take their default values.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn size(&self) -> ViewportSize {
        ViewportSize::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: SampleConfig =
            serde_json::from_str(r#"{ "sample": "depth", "width": 320 }"#).unwrap();
        assert_eq!(config.sample, SampleKind::Depth);
        assert_eq!(config.width, 320);
        assert_eq!(config.height, SampleConfig::default().height);
        assert_eq!(config.array_length, DEFAULT_ARRAY_LENGTH);
    }

    #[test]
    fn test_unknown_sample_is_rejected() {
        let result = serde_json::from_str::<SampleConfig>(r#"{ "sample": "teapot" }"#);
        assert!(result.is_err());
    }
}
