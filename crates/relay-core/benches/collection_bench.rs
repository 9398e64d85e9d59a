//! Criterion benchmarks for [`ObservableOrderedCollection`] and endpoint resolution.
//!
//! Reordering a saved-target list happens on the UI path, and resolution runs
//! once per connection attempt; both should stay in the microsecond range even
//! with a subscriber attached.
//!
//! Run with:
//! ```bash
//! cargo bench --package relay-core --bench collection_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use relay_core::{
    DeviceEndpoint, ObservableOrderedCollection, ServiceClass, SocketAddress, SocketEndpoint,
    WirelessEndpoint, SERIAL_PORT_SERVICE,
};

/// Builds a collection of `n` items with one counting subscriber attached.
fn build_collection(n: u32) -> ObservableOrderedCollection<u32> {
    let mut list: ObservableOrderedCollection<u32> = (0..n).collect();
    let mut changes = 0u64;
    list.subscribe(move |_| changes += 1);
    list
}

// ── Benchmarks: move_item ─────────────────────────────────────────────────────

/// Benchmarks moving the first item to the end and back (worst-case shifting).
fn bench_move_item_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("move_item_scaling");

    for &count in &[8u32, 64, 512] {
        let mut list = build_collection(count);
        let last = count as usize - 1;

        group.bench_with_input(BenchmarkId::new("items", count), &last, |b, &last| {
            b.iter(|| {
                list.move_item(black_box(0), black_box(last)).unwrap();
                list.move_item(black_box(last), black_box(0)).unwrap();
            })
        });
    }

    group.finish();
}

/// Benchmarks [`ObservableOrderedCollection::index_of`] for the last item.
fn bench_index_of_last(c: &mut Criterion) {
    let list = build_collection(512);

    c.bench_function("index_of_last_of_512", |b| {
        b.iter(|| list.index_of(black_box(&511)))
    });
}

// ── Benchmarks: resolve_address ───────────────────────────────────────────────

fn bench_resolve_address(c: &mut Criterion) {
    let wireless = DeviceEndpoint::Wireless(WirelessEndpoint::new(
        "tablet",
        ServiceClass::Computer,
        "A4:C1:38:00:11:22".parse().unwrap(),
        SERIAL_PORT_SERVICE,
    ));
    let socket =
        DeviceEndpoint::Socket(SocketEndpoint::bound(SocketAddress::new("10.0.0.5", 4020)));
    let mut group = c.benchmark_group("resolve_address");

    group.bench_function("wireless", |b| {
        b.iter(|| black_box(&wireless).resolve_address())
    });
    group.bench_function("socket", |b| b.iter(|| black_box(&socket).resolve_address()));

    group.finish();
}

criterion_group!(
    benches,
    bench_move_item_scaling,
    bench_index_of_last,
    bench_resolve_address
);
criterion_main!(benches);
