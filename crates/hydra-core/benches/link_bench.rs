//! Criterion benchmarks for link command framing.
//!
//! Run with:
//! ```bash
//! cargo bench --package hydra-core --bench link_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hydra_core::protocol::decode_command;
use hydra_core::report::{KeyboardReport, MouseButtons, MouseReport};
use hydra_core::{Command, DeliveryCounters, ReportKind};

fn bench_encode(c: &mut Criterion) {
    let keyboard = Command::Report(KeyboardReport::with_keycode(0x02, 0x17).into());
    let mouse = Command::Report(MouseReport::new(MouseButtons::default(), 10, -10, 0).into());

    c.bench_function("encode_keyboard_frame", |b| b.iter(|| black_box(&keyboard).encode()));
    c.bench_function("encode_mouse_frame", |b| b.iter(|| black_box(&mouse).encode()));
}

fn bench_decode(c: &mut Criterion) {
    let frame = [1u8, 0x02, 0, 0x17, 0, 0, 0, 0, 0];
    c.bench_function("decode_keyboard_frame", |b| {
        b.iter(|| decode_command(black_box(&frame)))
    });
}

fn bench_dashboard_parse(c: &mut Criterion) {
    let mut counters = DeliveryCounters::default();
    for kind in ReportKind::ALL {
        counters.record_sent(kind);
    }
    let text = counters.format();
    c.bench_function("dashboard_parse", |b| {
        b.iter(|| DeliveryCounters::parse(black_box(&text)))
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_dashboard_parse);
criterion_main!(benches);
