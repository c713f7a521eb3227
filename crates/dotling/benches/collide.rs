use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use dotling::{NodeRecord, Simulator, Tunables};
use std::hint::black_box;

fn synthetic_world(n: usize) -> Vec<NodeRecord> {
    (0..n)
        .map(|i| {
            // Deterministic scatter: no RNG so runs are comparable.
            let lon = -175.0 + (i as f64 * 37.0) % 350.0;
            let lat = -85.0 + (i as f64 * 23.0) % 170.0;
            NodeRecord {
                code: format!("N{i}"),
                name: format!("node-{i}"),
                population: 1.0 + (i as f64 * 911.0) % 100_000.0,
                area: 1.0 + (i as f64 * 131.0) % 10_000.0,
                lon,
                lat,
                group: format!("g{}", i % 7),
                continent: format!("c{}", i % 5),
                perimeter: 100.0,
            }
        })
        .collect()
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");
    for &n in &[64usize, 256, 1024] {
        let records = synthetic_world(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &records, |b, records| {
            b.iter_batched(
                || {
                    let mut sim =
                        Simulator::new(records.clone(), Vec::new(), Tunables::default())
                            .expect("simulator");
                    sim.start();
                    sim
                },
                |mut sim| {
                    for _ in 0..10 {
                        sim.step(black_box(0.1));
                    }
                    sim
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_step);
criterion_main!(benches);
