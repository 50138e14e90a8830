use std::f64::consts::TAU;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use tessel_kernel_polygon::{boolean_operation, BooleanOp, BooleanSettings, Polygon};

/// Regular polygon with a wobbling radius, so edges cross often.
fn star(n: usize, cx: f64, cy: f64, radius: f64) -> Polygon {
    let coords: Vec<[f64; 2]> = (0..n)
        .map(|i| {
            let t = TAU * i as f64 / n as f64;
            let r = radius * (1.0 + 0.2 * (7.0 * t).sin());
            [cx + r * t.cos(), cy + r * t.sin()]
        })
        .collect();
    Polygon::from_coords(&coords)
}

pub fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("Polygon Booleans");
    let settings = BooleanSettings::default();

    for n in [16, 128, 1024] {
        let subject = vec![star(n, 0.0, 0.0, 10.0)];
        let clip = vec![star(n, 3.0, 1.0, 9.0)];
        for op in [BooleanOp::Union, BooleanOp::Intersection, BooleanOp::Xor] {
            group.bench_with_input(
                BenchmarkId::new(format!("{op:?}"), n),
                &(&subject, &clip),
                |b, (s, c)| b.iter(|| boolean_operation(s, c, op, &settings)),
            );
        }
    }
}

criterion_group!(benches, bench);
criterion_main!(benches);
