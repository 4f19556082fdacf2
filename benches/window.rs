//! Windowing and offset translation benchmarks.

#![allow(clippy::semicolon_if_nothing_returned)]

use annowindow::unicode::{OffsetIndex, to_internal_index};
use annowindow::window::{
    RenderedMeasurement, ScrollMetrics, ScrollReconciler, Window, compute_window,
};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn windowing(c: &mut Criterion) {
    c.bench_function("compute_window_sweep", |b| {
        b.iter(|| {
            let mut acc = 0;
            for page in 1..=1_000 {
                let w = compute_window(black_box(page), 4_000_000, 4_000, 5, 2);
                acc += w.end_index - w.start_index;
            }
            acc
        })
    });
}

fn reconciliation(c: &mut Criterion) {
    let previous = Window {
        start_page: 3,
        end_page: 7,
        start_index: 8_000,
        end_index: 28_000,
    };
    let next = Window {
        start_page: 5,
        end_page: 9,
        start_index: 16_000,
        end_index: 36_000,
    };
    let metrics = ScrollMetrics::new(3_250.0, 5_000.0, 800.0);
    let measurement = RenderedMeasurement::new(5_100.0, 800.0).with_anchor_top(1_050.0);

    c.bench_function("scroll_reconcile_cycle", |b| {
        let mut reconciler = ScrollReconciler::new(std::time::Duration::ZERO);
        let now = std::time::Instant::now();
        b.iter(|| {
            reconciler.begin(black_box(metrics), previous, next, None);
            reconciler.reconcile(black_box(&measurement));
            reconciler.commit(now)
        })
    });
}

fn offsets(c: &mut Criterion) {
    let text: String = "héllo 世界 👋 ".chars().cycle().take(20_000).collect();

    c.bench_function("to_internal_index_linear_20k", |b| {
        b.iter(|| to_internal_index(black_box(15_000), &text))
    });

    let index = OffsetIndex::new(&text);
    c.bench_function("offset_index_lookup_20k", |b| {
        b.iter(|| index.byte_offset(&text, black_box(15_000)))
    });

    c.bench_function("offset_index_build_20k", |b| {
        b.iter(|| OffsetIndex::new(black_box(&text)))
    });
}

criterion_group!(benches, windowing, reconciliation, offsets);
criterion_main!(benches);
