use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::{Instant as StdInstant, SystemTime};

fn benchmark(c: &mut Criterion) {
    let counter = tickcal::global().expect("failed to calibrate counter");

    let mut std_group = c.benchmark_group("stdlib");
    std_group.bench_function("instant_now", |b| b.iter(StdInstant::now));
    std_group.bench_function("instant_delta", |b| {
        b.iter(|| {
            let start = StdInstant::now();
            let d = StdInstant::now() - start;
            black_box(d.as_nanos())
        })
    });
    std_group.bench_function("system_time_now", |b| b.iter(SystemTime::now));
    std_group.finish();

    let mut t_group = c.benchmark_group("tickcal");
    t_group.bench_function("now", |b| b.iter(|| counter.now()));
    t_group.bench_function("start", |b| b.iter(|| counter.start()));
    t_group.bench_function("end", |b| b.iter(|| counter.end()));
    t_group.bench_function("now_delta", |b| {
        b.iter(|| {
            let start = counter.now();
            let finish = counter.now();
            black_box(counter.to_nanoseconds(counter.duration(start, finish)))
        })
    });
    t_group.bench_function("start_end_delta", |b| {
        b.iter(|| {
            let start = counter.start();
            let finish = counter.end();
            black_box(counter.to_nanoseconds(counter.duration(start, finish)))
        })
    });
    t_group.bench_function("global", |b| b.iter(|| tickcal::global().map(|c| c.now())));
    t_group.finish();
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
