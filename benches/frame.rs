use criterion::{black_box, criterion_group, criterion_main, Criterion};

use flowline::{
    animation::{EndStateDeriver, FrameInterpolator, Gyro, MotionParams},
    art::{GenerationParams, GeometryGenerator},
    render::StaticRenderer,
};

fn frame_benchmarks(c: &mut Criterion) {
    let start = GenerationParams::default();
    let end = GenerationParams {
        amount: 20,
        line_width: 6,
        ..start
    };
    let state = GeometryGenerator::new(start)
        .expect("default parameters are valid")
        .generate(Some(7))
        .state;
    let interpolator = FrameInterpolator::new(start, end, MotionParams::default());
    let targets = EndStateDeriver::new(&start).derive(&state);
    let renderer = StaticRenderer::default();

    c.bench_function("derive_targets", |b| {
        b.iter(|| EndStateDeriver::new(&start).derive(black_box(&state)))
    });

    c.bench_function("interpolate_frame", |b| {
        b.iter(|| interpolator.interpolate_towards(black_box(&state), &targets, black_box(0.37), Gyro::default()))
    });

    c.bench_function("interpolate_and_render", |b| {
        b.iter(|| {
            let frame = interpolator.interpolate_towards(&state, &targets, black_box(0.37), Gyro::default());
            renderer.render(&frame.state, &frame.params)
        })
    });
}

criterion_group!(benches, frame_benchmarks);
criterion_main!(benches);
