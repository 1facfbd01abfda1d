//! Benchmarks for the reference kernels and GPU frame encoding.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gpu_essentials::kernels;
use gpu_essentials::samples::{create_renderer, SampleKind};
use gpu_essentials::{DispatchGeometry, Extent3, OffscreenView, SampleConfig, SourceImage, ViewportSize};

fn bench_reference_grayscale(c: &mut Criterion) {
    let mut group = c.benchmark_group("Reference Grayscale");

    for (width, height, name) in [(256, 256, "256"), (640, 480, "480p"), (1280, 720, "720p")] {
        let image = SourceImage::test_pattern(width, height);
        let geometry = DispatchGeometry::covering(image.extent(), Extent3::planar(16, 16));
        group.bench_with_input(BenchmarkId::from_parameter(name), &image, |b, image| {
            b.iter(|| black_box(kernels::grayscale_image(image, &geometry)));
        });
    }

    group.finish();
}

fn bench_reference_add(c: &mut Criterion) {
    let len = 1 << 20;
    let a: Vec<f32> = (0..len).map(|i| i as f32).collect();
    let b: Vec<f32> = (0..len).map(|i| (len - i) as f32).collect();
    let geometry = DispatchGeometry::linear(len as u32, 256, 65535);

    c.bench_function("reference_add_1m", |bench| {
        bench.iter(|| black_box(kernels::add_arrays(&a, &b, &geometry)));
    });
}

fn bench_render_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("Frame Encoding");

    let mut view = match pollster::block_on(OffscreenView::new(ViewportSize::new(640, 480))) {
        Ok(view) => view,
        Err(e) => {
            eprintln!("Skipping GPU benchmarks: {}", e);
            return;
        }
    };
    let config = SampleConfig::default();

    for kind in SampleKind::all() {
        let mut renderer = match create_renderer(*kind, &view, &config) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Skipping {}: {}", kind, e);
                continue;
            }
        };
        group.bench_function(kind.name(), |b| {
            b.iter(|| black_box(renderer.render_frame(&mut view)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_reference_grayscale,
    bench_reference_add,
    bench_render_frame
);
criterion_main!(benches);
