//! Benchmarks for pagination and raster flattening.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::RgbaImage;
use pagesnap::{ExportDocument, PageFormat, RasterImage};

fn bench_paginate(c: &mut Criterion) {
    c.bench_function("paginate_tall_raster", |b| {
        b.iter(|| {
            ExportDocument::paginate(black_box(1080), black_box(250_000), PageFormat::a4())
                .unwrap()
                .page_count()
        })
    });
}

fn bench_flatten(c: &mut Criterion) {
    let raster = RasterImage::new(RgbaImage::new(1080, 4096), 1.0);
    c.bench_function("flatten_rgba_to_rgb", |b| {
        b.iter(|| black_box(&raster).to_rgb8().len())
    });
}

criterion_group!(benches, bench_paginate, bench_flatten);
criterion_main!(benches);
