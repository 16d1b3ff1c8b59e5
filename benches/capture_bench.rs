use chart_a11y::api::CaptureConfig;
use chart_a11y::core::{AxisId, FigureId, Orientation, PlotType};
use chart_a11y::host::HeadlessHost;
use chart_a11y::host::headless::Candle;
use chart_a11y::plot::PlotFactory;
use chart_a11y::scene::{AxisScene, BarContainer, BarPatch, ColorMesh, SceneElement, TickLabel};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_bar_extraction_10k(c: &mut Criterion) {
    let patches: Vec<BarPatch> = (0..10_000)
        .rev()
        .map(|i| BarPatch::new(i as f64 - 0.4, 0.0, 0.8, (i % 97) as f64))
        .collect();
    let mut scene = AxisScene::new(AxisId::next(), FigureId::next()).with_element(
        SceneElement::Bars(BarContainer::new(Orientation::Vertical, patches)),
    );
    scene.x_ticks = (0..10_000)
        .map(|i| TickLabel::new(i as f64, format!("c{i}")))
        .collect();

    let factory = PlotFactory::standard();
    let config = CaptureConfig::default();

    c.bench_function("bar_extraction_10k", |b| {
        b.iter(|| {
            let model = factory
                .create(PlotType::Bar, black_box(scene.clone()), &config)
                .expect("bar model");
            let _ = model.extract();
        })
    });
}

fn bench_heat_extraction_100x100(c: &mut Criterion) {
    let values: Vec<Vec<f64>> = (0..100)
        .map(|row| (0..100).map(|col| (row * col) as f64).collect())
        .collect();
    let scene = AxisScene::new(AxisId::next(), FigureId::next())
        .with_element(SceneElement::ColorMesh(ColorMesh::new(values)));

    let factory = PlotFactory::standard();
    let config = CaptureConfig::default();

    c.bench_function("heat_extraction_100x100", |b| {
        b.iter(|| {
            let model = factory
                .create(PlotType::Heat, black_box(scene.clone()), &config)
                .expect("heat model");
            let _ = model.extract();
        })
    });
}

fn bench_document_json_2k_candles(c: &mut Criterion) {
    let host = HeadlessHost::standalone(CaptureConfig::default()).expect("host");
    let (figure, axis) = host.figure().expect("figure");

    let candles: Vec<Candle> = (0..2_000)
        .map(|i| {
            let t = i as f64;
            let open = 400.0 + t * 0.03;
            let close = if i % 2 == 0 { open + 2.0 } else { open - 2.0 };
            Candle {
                x: 19_000.0 + t,
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: Some(1_000.0 + t),
            }
        })
        .collect();
    host.candlestick(axis, &candles).expect("candlestick");

    c.bench_function("document_json_2k_candles", |b| {
        b.iter(|| {
            let document = host
                .interceptor()
                .document(black_box(figure))
                .expect("document");
            let _ = document
                .to_json_contract_v1_pretty()
                .expect("document json should succeed");
        })
    });
}

criterion_group!(
    benches,
    bench_bar_extraction_10k,
    bench_heat_extraction_100x100,
    bench_document_json_2k_candles
);
criterion_main!(benches);
