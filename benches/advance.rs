//! Benchmarks for the per-frame CPU work.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use kaleido::animation::{advance, AnimationParams, FrameInput, SimState};
use kaleido::camera::TiltMapping;
use kaleido::orientation::OrientationSample;
use kaleido::shader::DiamondInstance;
use kaleido::spawn::{DiamondField, FieldParams, LayerSpeed};

fn field(layers: u32, rings: u32, per_ring: u32) -> DiamondField {
    let params = FieldParams::new(layers, rings, per_ring, 8.0).expect("valid field");
    DiamondField::generate(params, LayerSpeed::default(), 42)
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for &(layers, rings, per_ring) in &[(8, 16, 24), (16, 32, 48)] {
        let params = FieldParams::new(layers, rings, per_ring, 8.0).expect("valid field");
        group.bench_with_input(
            BenchmarkId::from_parameter(params.count()),
            &params,
            |b, &params| {
                b.iter(|| black_box(DiamondField::generate(params, LayerSpeed::default(), 42)))
            },
        );
    }
    group.finish();
}

fn bench_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance");
    let params = AnimationParams::default();
    let tilt = TiltMapping::default();
    let sample = Some(OrientationSample::new(0.0, 20.0, -10.0));

    for &(layers, rings, per_ring) in &[(8, 16, 24), (16, 32, 48)] {
        let field = field(layers, rings, per_ring);
        group.bench_with_input(BenchmarkId::from_parameter(field.len()), &field, |b, field| {
            let mut state = SimState::initial(field, &params, tilt.resting_pose());
            b.iter(|| {
                let input = FrameInput {
                    field,
                    params: &params,
                    tilt: &tilt,
                    sample,
                };
                state = advance(std::mem::take(&mut state), input);
                black_box(state.frame)
            })
        });
    }
    group.finish();
}

fn bench_instances(c: &mut Criterion) {
    let field = field(8, 16, 24);
    let params = AnimationParams::default();
    let state = SimState::initial(&field, &params, TiltMapping::default().resting_pose());
    let mut out: Vec<DiamondInstance> = Vec::with_capacity(field.len());

    c.bench_function("write_instances_3072", |b| {
        b.iter(|| {
            out.clear();
            out.extend(state.transforms.iter().map(DiamondInstance::from));
            black_box(out.len())
        })
    });
}

criterion_group!(benches, bench_generate, bench_advance, bench_instances);
criterion_main!(benches);
