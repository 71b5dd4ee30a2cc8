use rand::Rng;

use beacon::compact::compact;
use beacon::synchronizer::Synchronizer;
use beacon::{FrameReader, RawFrame, Schema, Telemetry, ThermalRecord, WireValue};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};

fn frames(schema: &Schema, count: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut dat = Vec::with_capacity(count * (RawFrame::wire_len() + 3));
    for _ in 0..count {
        let mut frame = RawFrame::blank(schema);
        frame.platform.rtc_s = WireValue::from_native(rng.gen(), schema.byte_order);
        frame.thermal.cpu_c = WireValue::from_native(rng.gen(), schema.byte_order);
        dat.extend(frame.encode(schema));
    }
    dat
}

fn bench_synchronization(c: &mut Criterion) {
    let mut data = vec![0u8; 1 << 16];
    data.extend_from_slice(&[0xff, 0xff, 0xf0]);
    let mut group = c.benchmark_group("synchronize");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("scan", |b| {
        b.iter(|| {
            let mut sync = Synchronizer::new(&data[..], [0xff, 0xff, 0xf0]);
            let loc = sync.scan().unwrap();
            assert!(loc.is_some());
        });
    });
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let schema = Schema::default();
    let data = frames(&schema, 1000);
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("frames", |b| {
        b.iter(|| {
            let count = FrameReader::new(&data[..], schema.clone())
                .map_while(Result::ok)
                .count();
            assert_eq!(count, 1000);
        });
    });
    group.bench_function("telemetry", |b| {
        b.iter(|| {
            let telemetry = Telemetry::collect(FrameReader::new(&data[..], schema.clone()));
            assert_eq!(telemetry.unwrap().frames(), 1000);
        });
    });
    group.finish();
}

fn bench_compact(c: &mut Criterion) {
    let mut rng = rand::thread_rng();
    let records: Vec<ThermalRecord> = (0..10_000)
        .map(|_| ThermalRecord {
            rtc_s: rng.gen_range(0..5_000),
            ..Default::default()
        })
        .collect();

    let mut group = c.benchmark_group("compact");
    group.throughput(Throughput::Elements(records.len() as u64));
    group.bench_function("thermal", |b| {
        b.iter_batched(
            || records.clone(),
            |mut series| compact(&mut series),
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_synchronization, bench_decode, bench_compact);
criterion_main!(benches);
