use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use rust_decimal::Decimal;

use resortstock_ledger::{AdjustmentBatch, StockKey, StockLedger};

fn key(item: &str) -> StockKey {
    StockKey::new("KURAMATHI", "MAIN", item)
}

/// Hot-key adjustment: every iteration serializes on one cell mutex.
fn bench_adjust_hot_key(c: &mut Criterion) {
    let ledger = StockLedger::new();

    c.bench_function("ledger/adjust_hot_key", |b| {
        b.iter(|| {
            ledger
                .adjust(black_box(key("RICE")), Decimal::ONE)
                .expect("increment cannot fail")
        })
    });
}

/// Read path: lock-free table snapshot plus one cell lock.
fn bench_read_hot_key(c: &mut Criterion) {
    let ledger = StockLedger::new();
    ledger.adjust(key("RICE"), Decimal::from(1_000)).unwrap();

    c.bench_function("ledger/read_hot_key", |b| {
        b.iter(|| black_box(ledger.read(&key("RICE"))))
    });
}

/// Batch application across a growing key set (sorted multi-key locking).
fn bench_batch_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger/batch_apply");
    for size in [2usize, 8, 32] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let ledger = StockLedger::new();
            let keys: Vec<StockKey> = (0..size).map(|i| key(&format!("ITEM-{i:03}"))).collect();

            b.iter(|| {
                let mut batch = AdjustmentBatch::new();
                for k in &keys {
                    batch.push(k.clone(), Decimal::ONE);
                }
                ledger.apply(black_box(batch)).expect("increments cannot fail")
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_adjust_hot_key,
    bench_read_hot_key,
    bench_batch_apply
);
criterion_main!(benches);
