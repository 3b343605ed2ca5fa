//! Slotted page benchmarks.
//!
//! Benchmarks for:
//! - Filling a page with inserts
//! - Reading every record
//! - In-place and relocating updates
//! - Compacting a fragmented page

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slotdb_page::SlottedPage;

const PAGE_SIZES: [usize; 3] = [4096, 8192, 65536];

/// Generate random records.
fn generate_records(count: usize, min_len: usize, max_len: usize) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| {
            let len = rng.gen_range(min_len..=max_len);
            (0..len).map(|_| rng.gen()).collect()
        })
        .collect()
}

/// Fill a fresh page and return how many records went in.
fn fill_page(buffer: &mut Vec<u8>, records: &[Vec<u8>]) -> usize {
    let mut page = SlottedPage::init(buffer).unwrap();
    records
        .iter()
        .take_while(|record| page.insert(record).is_ok())
        .count()
}

/// Benchmark filling an empty page.
fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("page/insert");
    let records = generate_records(10_000, 16, 128);

    for size in PAGE_SIZES {
        let mut buffer = vec![0u8; size];
        let inserted = fill_page(&mut buffer, &records);

        group.throughput(Throughput::Elements(inserted as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(fill_page(&mut buffer, &records)));
        });
    }

    group.finish();
}

/// Benchmark reading every live record.
fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("page/read");
    let records = generate_records(10_000, 16, 128);

    for size in PAGE_SIZES {
        let mut buffer = vec![0u8; size];
        let inserted = fill_page(&mut buffer, &records);
        let page = SlottedPage::open(&mut buffer).unwrap();

        group.throughput(Throughput::Elements(inserted as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let mut total = 0;
                for slot_id in 0..page.slot_count() {
                    total += page.read(slot_id).unwrap().len();
                }
                black_box(total)
            });
        });
    }

    group.finish();
}

/// Benchmark updates that shrink records in place.
fn bench_update_in_place(c: &mut Criterion) {
    let records = generate_records(10_000, 64, 128);
    let mut buffer = vec![0u8; 8192];
    let inserted = fill_page(&mut buffer, &records) as u32;
    let replacement = vec![0xAB; 32];

    c.bench_function("page/update_in_place", |b| {
        let mut page = SlottedPage::open(&mut buffer).unwrap();
        let mut slot_id = 0;
        b.iter(|| {
            page.update(slot_id, black_box(&replacement)).unwrap();
            slot_id = (slot_id + 1) % inserted;
        });
    });
}

/// Benchmark compacting a page where every other record was deleted.
fn bench_compact(c: &mut Criterion) {
    let mut group = c.benchmark_group("page/compact");
    let records = generate_records(10_000, 16, 128);

    for size in PAGE_SIZES {
        let mut fragmented = vec![0u8; size];
        let inserted = fill_page(&mut fragmented, &records);
        {
            let mut page = SlottedPage::open(&mut fragmented).unwrap();
            for slot_id in (0..inserted as u32).step_by(2) {
                page.delete(slot_id).unwrap();
            }
        }

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter_batched_ref(
                || fragmented.clone(),
                |buffer| {
                    let mut page = SlottedPage::open(buffer).unwrap();
                    black_box(page.compact().unwrap())
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_read,
    bench_update_in_place,
    bench_compact
);
criterion_main!(benches);
