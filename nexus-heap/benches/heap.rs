//! Benchmarks comparing nexus-heap against std's BinaryHeap.
//!
//! Run with: cargo bench
//!
//! Both heaps are pre-allocated. BinaryHeap has no remove-by-key, so the
//! cancel benchmark only measures nexus-heap.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use nexus_heap::IndexedHeap;

const CAPACITY: usize = 100_000;

fn keys() -> Vec<u64> {
    (0..CAPACITY as u64)
        .map(|i| i.wrapping_mul(0x9e37_79b9_7f4a_7c15) >> 40)
        .collect()
}

// ============================================================================
// Insert
// ============================================================================

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    group.throughput(Throughput::Elements(CAPACITY as u64));
    let keys = keys();

    let mut nexus = IndexedHeap::with_capacity(CAPACITY).unwrap();
    let mut std_heap = BinaryHeap::with_capacity(CAPACITY);

    group.bench_function("nexus-heap", |b| {
        b.iter(|| {
            for &k in &keys {
                black_box(nexus.insert(k));
            }
            nexus.clear();
        });
    });

    group.bench_function("std", |b| {
        b.iter(|| {
            for &k in &keys {
                std_heap.push(Reverse(k));
            }
            std_heap.clear();
        });
    });

    group.finish();
}

// ============================================================================
// Pop
// ============================================================================

fn bench_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("pop");
    group.throughput(Throughput::Elements(CAPACITY as u64));
    let keys = keys();

    let mut nexus = IndexedHeap::with_capacity(CAPACITY).unwrap();
    let mut std_heap = BinaryHeap::with_capacity(CAPACITY);

    group.bench_function("nexus-heap", |b| {
        b.iter(|| {
            for &k in &keys {
                nexus.insert(k);
            }
            while let Some(v) = nexus.try_pop() {
                black_box(v);
            }
        });
    });

    group.bench_function("std", |b| {
        b.iter(|| {
            for &k in &keys {
                std_heap.push(Reverse(k));
            }
            while let Some(v) = std_heap.pop() {
                black_box(v);
            }
        });
    });

    group.finish();
}

// ============================================================================
// Cancel (remove by handle)
// ============================================================================

fn bench_cancel(c: &mut Criterion) {
    let mut group = c.benchmark_group("cancel");
    group.throughput(Throughput::Elements(CAPACITY as u64 / 2));
    let keys = keys();

    let mut nexus = IndexedHeap::with_capacity(CAPACITY).unwrap();
    let mut handles = Vec::with_capacity(CAPACITY);

    group.bench_function("nexus-heap/half", |b| {
        b.iter(|| {
            handles.extend(keys.iter().map(|&k| nexus.insert(k)));
            for &h in handles.iter().step_by(2) {
                black_box(nexus.remove(h).ok());
            }
            handles.clear();
            nexus.clear();
        });
    });

    group.finish();
}

// ============================================================================
// Timer churn: steady-state schedule/cancel/fire
// ============================================================================

fn bench_timer_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("timer_churn");
    const LIVE: usize = 1024;
    const OPS: u64 = 10_000;
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("nexus-heap", |b| {
        let mut heap = IndexedHeap::with_capacity(LIVE * 2).unwrap();
        let mut pending: Vec<_> = (0..LIVE as u64).map(|t| heap.insert(t)).collect();
        let mut now = LIVE as u64;

        b.iter(|| {
            for i in 0..OPS {
                now += 1;
                // Reschedule: cancel one pending timer and arm a new one.
                let slot = (i as usize * 31) % pending.len();
                let _ = heap.remove(pending[slot]);
                pending[slot] = heap.insert(now + (i % 97));
                // Fire whatever is due.
                while heap.try_peek().is_some_and(|&t| t <= now - LIVE as u64) {
                    black_box(heap.try_pop());
                }
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_pop,
    bench_cancel,
    bench_timer_churn
);
criterion_main!(benches);
