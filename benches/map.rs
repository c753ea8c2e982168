// third-party imports
use criterion::{Criterion, criterion_group, criterion_main};

// local imports
use yaml_source_map::calculate;

fn benchmark(c: &mut Criterion) {
    let mut c = c.benchmark_group("map");

    c.bench_function("flow", |b| {
        let sample = "[alpha, [1, 2, {k: v}], {a: 1, b: [x, y]}]";
        b.iter(|| calculate(sample).unwrap());
    });

    c.bench_function("block", |b| {
        let sample = "name: sample\nitems:\n  - 1\n  - 2\n  - k: v\nnested:\n  a: [x, y]\n  b: 2\n";
        b.iter(|| calculate(sample).unwrap());
    });
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
