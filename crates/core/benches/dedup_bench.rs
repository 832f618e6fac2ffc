use cleanset_core::{clean_pipeline, remove_duplicates, CleaningConfig, ExactDeduplicator};
use cleanset_filters::LanguageClassifier;
use cleanset_formats::Record;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

const PHRASES: &[&str] = &[
    "saldo saya belum masuk padahal sudah transfer dari tadi pagi!!!",
    "tolong bantu cek transaksi saya kak....",
    "aplikasinya error terus waktu mau bayar tagihan listrik",
    "where is my refund, it has been two weeks already",
    "kenapa kode otp tidak pernah sampai ke nomor saya???",
];

fn dataset(size: usize, distinct: usize) -> Vec<Record> {
    (0..size)
        .map(|i| {
            let n = i % distinct;
            Record::new(i.to_string(), format!("{} #{}", PHRASES[n % PHRASES.len()], n))
        })
        .collect()
}

fn bench_exact_dedup(c: &mut Criterion) {
    let mut group = c.benchmark_group("exact_dedup");
    group.throughput(Throughput::Elements(10_000));

    group.bench_function("10k_unique", |b| {
        b.iter_batched(
            || dataset(10_000, 10_000),
            |records| black_box(remove_duplicates(records)),
            criterion::BatchSize::LargeInput,
        );
    });

    group.bench_function("10k_50pct_dup", |b| {
        b.iter_batched(
            || dataset(10_000, 5_000),
            |records| black_box(remove_duplicates(records)),
            criterion::BatchSize::LargeInput,
        );
    });

    group.bench_function("is_duplicate_10k", |b| {
        let records = dataset(10_000, 5_000);
        b.iter(|| {
            let mut dedup = ExactDeduplicator::with_capacity(10_000);
            for record in &records {
                black_box(dedup.is_duplicate(&record.text));
            }
        });
    });

    group.finish();
}

fn bench_clean_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("clean_pipeline");
    group.sample_size(20);
    group.throughput(Throughput::Elements(5_000));

    let classifier = LanguageClassifier::default();

    group.bench_function("5k_with_language", |b| {
        let config = CleaningConfig::default();
        b.iter_batched(
            || dataset(5_000, 2_500),
            |records| black_box(clean_pipeline(records, &config, &classifier)),
            criterion::BatchSize::LargeInput,
        );
    });

    group.bench_function("5k_without_language", |b| {
        let config = CleaningConfig {
            target_language: None,
            ..CleaningConfig::default()
        };
        b.iter_batched(
            || dataset(5_000, 2_500),
            |records| black_box(clean_pipeline(records, &config, &classifier)),
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_exact_dedup, bench_clean_pipeline);
criterion_main!(benches);
