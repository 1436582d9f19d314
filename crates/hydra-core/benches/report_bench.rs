//! Criterion benchmarks for report composition.
//!
//! Every captured key or mouse event goes through one of these functions, so
//! they sit on the bridge's input hot path.
//!
//! Run with:
//! ```bash
//! cargo bench --package hydra-core --bench report_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hydra_core::report::{compose_from_held_keys, compose_mouse, MouseButtons};

fn bench_compose_from_held_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose_from_held_keys");
    // Shift + Ctrl, then letters A, B, C ...
    for held in [1usize, 4, 8] {
        let keys: Vec<u8> = [0xA0u8, 0xA2]
            .into_iter()
            .chain(0x41..0x41 + held as u8)
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(held), &keys, |b, keys| {
            b.iter(|| compose_from_held_keys(black_box(keys)))
        });
    }
    group.finish();
}

fn bench_compose_mouse(c: &mut Criterion) {
    c.bench_function("compose_mouse", |b| {
        b.iter(|| {
            compose_mouse(
                black_box(MouseButtons(MouseButtons::LEFT)),
                black_box(300),
                black_box(-12),
                black_box(1),
            )
        })
    });
}

criterion_group!(benches, bench_compose_from_held_keys, bench_compose_mouse);
criterion_main!(benches);
