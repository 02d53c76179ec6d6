use beacon_core::ManualClock;
use beacon_telemetry::PacketMetrics;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use std::time::Duration;

fn bench_packet_metrics(c: &mut Criterion) {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let metrics = PacketMetrics::with_clock(clock.clone());

    // Ten minutes of traffic at 30 ticks per second.
    for i in 0..18_000u64 {
        metrics.record_event(200 + i % 64);
        clock.advance(Duration::from_millis(33));
    }

    let mut group = c.benchmark_group("Packet Metrics");

    group.bench_function("record_event (full history)", |b| {
        b.iter(|| {
            metrics.record_event(black_box(256));
        });
    });

    group.bench_function("snapshot_all (full history)", |b| {
        b.iter(|| {
            black_box(metrics.snapshot_all());
        });
    });

    group.bench_function("one_minute (full history)", |b| {
        b.iter(|| {
            black_box(metrics.one_minute());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_packet_metrics);
criterion_main!(benches);
