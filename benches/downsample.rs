//! Engine throughput: scalar vs rayon band-parallel mapping.
//! Run: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{Rng, SeedableRng};

use glyphcast::convert::{Converter, EngineKind, SourceFrame};

const SRC_W: usize = 320;
const SRC_H: usize = 200;
const GRID_W: usize = 240;
const GRID_H: usize = 80;

fn random_frame(seed: u64) -> Vec<u32> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..SRC_W * SRC_H)
        .map(|_| rng.random_range(0..0x0100_0000u32))
        .collect()
}

fn bench_engines(c: &mut Criterion) {
    let pixels = random_frame(0xD00D);
    let frame = SourceFrame::new(&pixels, SRC_W, SRC_H).expect("valid frame");

    let mut group = c.benchmark_group("downsample");
    group.sample_size(50);

    for engine in [EngineKind::Scalar, EngineKind::Parallel] {
        let mut converter = Converter::new();
        converter.prepare(SRC_W, SRC_H, GRID_W, GRID_H);

        group.bench_function(engine.name().to_ascii_lowercase(), |b| {
            b.iter(|| {
                converter
                    .convert(black_box(&frame), engine)
                    .expect("convert");
                black_box(converter.cells().len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_engines);
criterion_main!(benches);
