//! Source images for texture-processing samples.

use std::path::Path;

use crate::gpu::{Extent3, InitializationError};

/// A decoded image in RGBA8 order, 4 bytes per pixel, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl SourceImage {
    /// Wrap already decoded RGBA8 pixels.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, InitializationError> {
        if width == 0 || height == 0 {
            return Err(InitializationError::EmptyImage);
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(InitializationError::ImageFormat {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Decode an image file (TGA, PNG, ...) and convert it to RGBA8.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, InitializationError> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|source| InitializationError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::info!("Loaded {} ({}x{})", path.display(), width, height);
        Self::from_rgba8(width, height, rgba.into_raw())
    }

    /// Generate a colorful test card: hue bars on top, a gradient below.
    pub fn test_pattern(width: u32, height: u32) -> Self {
        const BARS: [[u8; 3]; 7] = [
            [255, 255, 255],
            [255, 255, 0],
            [0, 255, 255],
            [0, 255, 0],
            [255, 0, 255],
            [255, 0, 0],
            [0, 0, 255],
        ];

        let width = width.max(1);
        let height = height.max(1);
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                let rgb = if y < height * 2 / 3 {
                    BARS[(x as usize * BARS.len()) / width as usize]
                } else {
                    let t = (x * 255 / (width - 1).max(1)) as u8;
                    [t, 255 - t, (y * 255 / height) as u8]
                };
                pixels.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
            }
        }

        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn extent(&self) -> Extent3 {
        Extent3::planar(self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA of the pixel at (`x`, `y`).
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba8_checks_length() {
        let err = SourceImage::from_rgba8(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            InitializationError::ImageFormat {
                expected: 16,
                actual: 15,
                ..
            }
        ));
    }

    #[test]
    fn test_from_rgba8_rejects_empty() {
        assert!(matches!(
            SourceImage::from_rgba8(0, 4, vec![]),
            Err(InitializationError::EmptyImage)
        ));
    }

    #[test]
    fn test_pixel_addressing() {
        let pixels: Vec<u8> = (0..2 * 3 * 4).map(|i| i as u8).collect();
        let image = SourceImage::from_rgba8(2, 3, pixels).unwrap();
        assert_eq!(image.pixel(0, 0), [0, 1, 2, 3]);
        assert_eq!(image.pixel(1, 2), [20, 21, 22, 23]);
    }

    #[test]
    fn test_pattern_is_opaque_and_sized() {
        let image = SourceImage::test_pattern(64, 48);
        assert_eq!(image.pixels().len(), 64 * 48 * 4);
        assert!(image.pixels().chunks(4).all(|p| p[3] == 255));
        assert_eq!(image.pixel(0, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = SourceImage::load("/nonexistent/image.tga").unwrap_err();
        assert!(matches!(err, InitializationError::ImageLoad { .. }));
    }
}
