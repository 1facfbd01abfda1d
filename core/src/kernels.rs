//! CPU reference implementations of the sample kernels.
//!
//! Each GPU invocation is addressed by an implicit grid coordinate. Here the
//! coordinate is an explicit parameter, produced by walking the same
//! [`DispatchGeometry`] the GPU dispatch uses. Invocations that fall outside
//! the resource return without writing, exactly like the WGSL kernels.

use crate::gpu::DispatchGeometry;
use crate::source::SourceImage;

/// Rec. 709 luma weights applied to linear R, G, B.
pub const LUMA_WEIGHTS: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Weighted sum of the three color channels.
pub fn luma(rgb: [f32; 3]) -> f32 {
    rgb[0] * LUMA_WEIGHTS[0] + rgb[1] * LUMA_WEIGHTS[1] + rgb[2] * LUMA_WEIGHTS[2]
}

/// Grayscale one RGBA8 texel, keeping alpha.
pub fn grayscale_texel(texel: [u8; 4]) -> [u8; 4] {
    let rgb = [
        texel[0] as f32 / 255.0,
        texel[1] as f32 / 255.0,
        texel[2] as f32 / 255.0,
    ];
    let gray = (luma(rgb).clamp(0.0, 1.0) * 255.0).round() as u8;
    [gray, gray, gray, texel[3]]
}

/// Every invocation coordinate launched by `geometry`, in no particular order.
pub fn invocations(geometry: &DispatchGeometry) -> impl Iterator<Item = [u32; 3]> {
    let grid = geometry.grid();
    (0..grid.depth).flat_map(move |z| {
        (0..grid.height).flat_map(move |y| (0..grid.width).map(move |x| [x, y, z]))
    })
}

/// Run the luma kernel over `image` using `geometry`'s invocation grid.
pub fn grayscale_image(image: &SourceImage, geometry: &DispatchGeometry) -> Vec<u8> {
    let mut output = vec![0u8; image.pixels().len()];
    for [x, y, _] in invocations(geometry) {
        if x >= image.width() || y >= image.height() {
            continue;
        }
        let i = (y as usize * image.width() as usize + x as usize) * 4;
        output[i..i + 4].copy_from_slice(&grayscale_texel(image.pixel(x, y)));
    }
    output
}

/// Run the array-sum kernel over `a` and `b` using a linear `geometry`.
pub fn add_arrays(a: &[f32], b: &[f32], geometry: &DispatchGeometry) -> Vec<f32> {
    let len = a.len().min(b.len());
    let mut output = vec![0.0f32; len];
    for invocation in invocations(geometry) {
        let index = geometry.linear_index(invocation) as usize;
        if index >= len {
            continue;
        }
        output[index] = a[index] + b[index];
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::Extent3;

    #[test]
    fn test_luma_weights_sum_to_one() {
        let sum: f32 = LUMA_WEIGHTS.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!((luma([1.0, 1.0, 1.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_grayscale_texel_is_gray() {
        for texel in [[255, 0, 0, 255], [0, 255, 0, 10], [12, 200, 99, 0], [7, 7, 7, 7]] {
            let out = grayscale_texel(texel);
            assert_eq!(out[0], out[1]);
            assert_eq!(out[1], out[2]);
            assert_eq!(out[3], texel[3]);
        }
        assert_eq!(grayscale_texel([7, 7, 7, 7]), [7, 7, 7, 7]);
    }

    #[test]
    fn test_grayscale_texel_matches_weights() {
        let texel = [200, 100, 50, 255];
        let expected = 0.2126 * 200.0 + 0.7152 * 100.0 + 0.0722 * 50.0;
        let out = grayscale_texel(texel);
        assert!((out[0] as f32 - expected).abs() <= 0.5 + 1e-3);
    }

    #[test]
    fn test_invocations_cover_grid() {
        let geometry =
            DispatchGeometry::covering(Extent3::planar(20, 10), Extent3::planar(16, 16));
        assert_eq!(invocations(&geometry).count() as u64, geometry.invocations());
    }

    #[test]
    fn test_grayscale_image_writes_every_pixel() {
        let image = SourceImage::test_pattern(37, 19);
        let geometry = DispatchGeometry::covering(image.extent(), Extent3::planar(16, 16));
        let output = grayscale_image(&image, &geometry);
        for (src, dst) in image.pixels().chunks(4).zip(output.chunks(4)) {
            assert_eq!(dst, grayscale_texel([src[0], src[1], src[2], src[3]]));
        }
    }

    #[test]
    fn test_add_arrays_independent_of_partitioning() {
        let a: Vec<f32> = (0..1000).map(|i| i as f32 * 0.5).collect();
        let b: Vec<f32> = (0..1000).map(|i| 1000.0 - i as f32).collect();
        let expected: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x + y).collect();

        for (group, max) in [(1, 65535), (64, 65535), (256, 3), (7, 2)] {
            let geometry = DispatchGeometry::linear(a.len() as u32, group, max);
            assert_eq!(add_arrays(&a, &b, &geometry), expected, "group={group} max={max}");
        }
    }
}
