//! Integration tests running the samples against an off-screen view.
//!
//! Every test returns early when no GPU adapter is available.

use gpu_essentials::gpu::{read_texture, FunctionLibrary, GpuContext, ShaderStage};
use gpu_essentials::kernels;
use gpu_essentials::samples::{
    create_renderer, ArrayAdder, ClearRenderer, DepthRenderer, FrameOutcome, GrayscaleRenderer,
    Renderer, SampleKind, TriangleRenderer,
};
use gpu_essentials::{InitializationError, OffscreenView, SampleConfig, SourceImage, ViewportSize};
use rand::rngs::StdRng;
use rand::SeedableRng;

async fn create_view(width: u32, height: u32) -> Option<OffscreenView> {
    OffscreenView::new(ViewportSize::new(width, height)).await.ok()
}

fn pixel_at(pixels: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}

#[tokio::test]
async fn test_grayscale_kernel_matches_reference() {
    let Some(mut view) = create_view(128, 96).await else {
        return;
    };
    let image = SourceImage::test_pattern(70, 45);
    let mut renderer = match GrayscaleRenderer::new(&view, &image) {
        Ok(r) => r,
        // Storage writes to rgba8unorm are missing on some downlevel backends.
        Err(InitializationError::UnsupportedFormat { .. }) => return,
        Err(e) => panic!("grayscale init failed: {e}"),
    };

    assert_eq!(renderer.render_frame(&mut view), FrameOutcome::Submitted);

    let ctx = gpu_essentials::GpuView::context(&view);
    let gpu = read_texture(&ctx.device, &ctx.queue, renderer.output_texture().texture())
        .expect("readback failed");
    let cpu = kernels::grayscale_image(&image, &renderer.dispatch_geometry());

    assert_eq!(gpu.len(), cpu.len());
    for (i, (g, c)) in gpu.iter().zip(&cpu).enumerate() {
        assert!(
            (*g as i16 - *c as i16).abs() <= 1,
            "byte {} differs: gpu {} cpu {}",
            i,
            g,
            c
        );
    }
    for texel in gpu.chunks_exact(4) {
        assert_eq!(texel[0], texel[1]);
        assert_eq!(texel[1], texel[2]);
    }
}

#[tokio::test]
async fn test_grayscale_geometry_for_small_images() {
    let Some(view) = create_view(64, 64).await else {
        return;
    };
    let image = SourceImage::test_pattern(64, 48);
    let Ok(renderer) = GrayscaleRenderer::new(&view, &image) else {
        return;
    };
    let geometry = renderer.dispatch_geometry();
    assert_eq!(geometry.group_size(), gpu_essentials::Extent3::planar(16, 16));
    assert_eq!(geometry.group_count(), gpu_essentials::Extent3::new(4, 3, 1));
}

#[tokio::test]
async fn test_skipped_frame_submits_nothing() {
    let Some(mut view) = create_view(64, 64).await else {
        return;
    };
    let mut renderer = TriangleRenderer::new(&view).expect("triangle init failed");

    view.set_available(false);
    assert_eq!(renderer.render_frame(&mut view), FrameOutcome::Skipped);
    assert_eq!(renderer.frames_submitted(), 0);
    assert_eq!(view.presented_frames(), 0);

    view.set_available(true);
    assert_eq!(renderer.render_frame(&mut view), FrameOutcome::Submitted);
    assert_eq!(renderer.frames_submitted(), 1);
    assert_eq!(view.presented_frames(), 1);
}

#[tokio::test]
async fn test_clear_sample_fills_first_frame_red() {
    let Some(mut view) = create_view(32, 32).await else {
        return;
    };
    let mut renderer = ClearRenderer::new(&view);
    renderer.render_frame(&mut view);

    let pixels = view.read_pixels().expect("readback failed");
    assert_eq!(pixel_at(&pixels, 32, 16, 16), [255, 0, 0, 255]);
}

#[tokio::test]
async fn test_triangle_covers_center() {
    let Some(mut view) = create_view(256, 256).await else {
        return;
    };
    let mut renderer = TriangleRenderer::new(&view).expect("triangle init failed");
    renderer.render_frame(&mut view);

    let pixels = view.read_pixels().expect("readback failed");
    let center = pixel_at(&pixels, 256, 128, 128);
    assert_ne!(&center[..3], &[0, 0, 0]);
    // Corners stay at the clear color.
    assert_eq!(pixel_at(&pixels, 256, 0, 0), [0, 0, 0, 255]);
}

#[tokio::test]
async fn test_depth_sample_renders_across_resizes() {
    let Some(mut view) = create_view(200, 150).await else {
        return;
    };
    let mut renderer = DepthRenderer::new(&view).expect("depth init failed");
    assert_eq!(renderer.render_frame(&mut view), FrameOutcome::Submitted);

    view.resize(ViewportSize::new(320, 240));
    renderer.on_resize(ViewportSize::new(320, 240));
    assert_eq!(renderer.render_frame(&mut view), FrameOutcome::Submitted);

    let pixels = view.read_pixels().expect("readback failed");
    let center = pixel_at(&pixels, 320, 160, 120);
    assert_ne!(&center[..3], &[0, 0, 0]);
    assert_eq!(renderer.frames_submitted(), 2);
}

#[tokio::test]
async fn test_on_resize_is_idempotent() {
    let Some(view) = create_view(64, 64).await else {
        return;
    };
    let config = SampleConfig::default();
    for kind in SampleKind::all() {
        let Ok(mut renderer) = create_renderer(*kind, &view, &config) else {
            continue;
        };
        assert_eq!(renderer.kind(), *kind);
        renderer.on_resize(ViewportSize::new(300, 200));
        let first = renderer.viewport();
        renderer.on_resize(ViewportSize::new(300, 200));
        assert_eq!(renderer.viewport(), first);
        assert_eq!((first.width, first.height), (300.0, 200.0));
    }
}

#[tokio::test]
async fn test_unknown_function_fails_before_any_frame() {
    let Some(ctx) = GpuContext::new().await.ok() else {
        return;
    };
    let source = "@vertex fn vertex_shader() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0); }";
    let library = FunctionLibrary::from_wgsl(&ctx.device, "lookup", source).expect("valid WGSL");

    match library.function("vertex_main", ShaderStage::Vertex) {
        Err(InitializationError::MissingFunction { library, name }) => {
            assert_eq!(library, "lookup");
            assert_eq!(name, "vertex_main");
        }
        _ => panic!("expected MissingFunction"),
    }
    assert!(matches!(
        library.function("vertex_shader", ShaderStage::Fragment),
        Err(InitializationError::WrongStage { .. })
    ));
}

#[tokio::test]
async fn test_adder_results_verify() {
    let Some(ctx) = GpuContext::new().await.ok() else {
        return;
    };
    let length = (1 << 16) + 3;
    let mut adder = ArrayAdder::new(ctx.device.clone(), ctx.queue.clone(), length)
        .expect("adder init failed");
    adder
        .prepare_data(&mut StdRng::seed_from_u64(7))
        .expect("upload failed");

    let result = adder.send_compute_command().expect("compute failed");
    assert_eq!(result.len(), length);
    adder.verify_results(&result).expect("results differ");

    let (a, b) = adder.inputs();
    assert_eq!(result[length - 1], a[length - 1] + b[length - 1]);
}

#[tokio::test]
async fn test_adder_folded_dispatch_covers_every_index() {
    let Some(ctx) = GpuContext::new().await.ok() else {
        return;
    };
    // 40 groups of 256 in rows of at most 8.
    let length = 10_000;
    let mut adder = ArrayAdder::with_group_limit(ctx.device.clone(), ctx.queue.clone(), length, 8)
        .expect("adder init failed");
    assert_eq!(
        adder.geometry().group_count(),
        gpu_essentials::Extent3::planar(8, 5)
    );

    let a: Vec<f32> = (0..length).map(|i| i as f32).collect();
    let b: Vec<f32> = (0..length).map(|i| (length - i) as f32 * 0.5).collect();
    adder.upload(a, b).expect("upload failed");

    let result = adder.send_compute_command().expect("compute failed");
    adder.verify_results(&result).expect("results differ");
    // First element of the second and last rows.
    assert_eq!(result[8 * 256], (8 * 256) as f32 + (length - 8 * 256) as f32 * 0.5);
    assert_eq!(result[length - 1], (length - 1) as f32 + 0.5);
}

#[tokio::test]
async fn test_malformed_shader_is_initialization_error() {
    let Some(ctx) = GpuContext::new().await.ok() else {
        return;
    };
    let source = "@compute @workgroup_size(64) fn kernel( {";
    match FunctionLibrary::from_wgsl(&ctx.device, "broken", source) {
        Err(InitializationError::ShaderParse { library, .. }) => assert_eq!(library, "broken"),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("malformed source was accepted"),
    }
}

#[tokio::test]
async fn test_adder_rejects_empty_and_mismatched_input() {
    let Some(ctx) = GpuContext::new().await.ok() else {
        return;
    };
    assert!(ArrayAdder::new(ctx.device.clone(), ctx.queue.clone(), 0).is_err());

    let mut adder =
        ArrayAdder::new(ctx.device.clone(), ctx.queue.clone(), 8).expect("adder init failed");
    assert!(adder.upload(vec![0.0; 8], vec![0.0; 7]).is_err());
}
