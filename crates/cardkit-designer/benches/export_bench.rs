//! Export pipeline benchmarks
//!
//! Measures rasterization plus encoding of a populated business card at
//! common print resolutions.

use cardkit_core::{Color, ExportFormat, PrintSpec};
use cardkit_designer::assets::ImageCache;
use cardkit_designer::export::{export_with_images, ExportOptions};
use cardkit_designer::{Background, Document, LayerNode, ShapeKind};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn sample_card() -> Document {
    let mut doc = Document::business_card()
        .with_background(Background::gradient(
            vec![Color::rgb(0x1f, 0x2a, 0x44), Color::rgb(0x1f, 0x6f, 0xeb)],
            135.0,
        ))
        .unwrap();
    let layers = vec![
        LayerNode::shape(ShapeKind::Rectangle { corner_radius: 6.0 }, 12.0, 12.0, 228.0, 120.0),
        LayerNode::shape(ShapeKind::Star { points: 5, inner_ratio: 0.5 }, 200.0, 20.0, 32.0, 32.0),
        LayerNode::icon("phone", 24.0, 90.0),
        LayerNode::icon("mail", 80.0, 90.0),
        LayerNode::text("Jane Doe", 24.0, 24.0),
    ];
    for layer in layers {
        doc = doc.with_layer_added(layer).unwrap().0;
    }
    doc
}

fn bench_export(c: &mut Criterion) {
    let doc = sample_card();
    let images = ImageCache::new();
    let mut group = c.benchmark_group("export");
    group.sample_size(20);

    for dpi in [150.0, 300.0, 600.0] {
        for format in [ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::Pdf] {
            let options = ExportOptions::new(format)
                .with_print_spec(PrintSpec::default().with_dpi(dpi));
            group.bench_with_input(
                BenchmarkId::new(format.to_string(), dpi as u32),
                &options,
                |b, options| b.iter(|| export_with_images(&doc, options, &images).unwrap()),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_export);
criterion_main!(benches);
