use criterion::{black_box, criterion_group, criterion_main, Criterion};

use nusa_gateway::numeric::{format_percent, RayConverter};

fn bench_convert(c: &mut Criterion) {
    let values: Vec<String> = (0..256u64)
        .map(|i| format!("{}{}", 1_000 + i * 37, "0".repeat(24)))
        .collect();

    c.bench_function("ray_to_number cold", |b| {
        b.iter(|| {
            let conv = RayConverter::new(1024);
            for v in &values {
                black_box(conv.ray_to_number(v));
            }
        })
    });

    let warm = RayConverter::new(1024);
    c.bench_function("ray_to_number warm", |b| {
        b.iter(|| {
            for v in &values {
                black_box(warm.ray_to_number(v));
            }
        })
    });

    c.bench_function("format_percent", |b| {
        b.iter(|| black_box(format_percent(black_box("62500000000000000000000000"))))
    });
}

criterion_group!(benches, bench_convert);
criterion_main!(benches);
