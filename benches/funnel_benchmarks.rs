//! Criterion benchmarks for cqlog

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use cqlog::core::log_entry::{LogEntry, LogRecord};
use cqlog::prelude::*;
use cqlog::{Backend, Formatter, Handler, LogChannel};

/// Swallows every line so only the funnel itself is measured
struct NullAppender;

impl Appender for NullAppender {
    fn append(&mut self, _record: &LogRecord<'_>, line: &str) -> Result<()> {
        black_box(line);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

fn null_backend(level: LogLevel) -> Backend {
    let mut backend = Backend::new();
    backend.add_root_handler(Handler::new(
        "null",
        level,
        Formatter::default(),
        Box::new(NullAppender),
    ));
    backend
}

fn null_funnel() -> Funnel {
    Funnel::builder()
        .start_with(|| Ok(null_backend(LogLevel::Debug)))
        .expect("funnel")
}

// ============================================================================
// Enqueue Benchmarks
// ============================================================================

fn bench_enqueue(c: &mut Criterion) {
    let mut group = c.benchmark_group("enqueue");
    group.throughput(Throughput::Elements(1));

    let (sender, receiver) = LogChannel::unbounded();
    group.bench_function("channel_only", |b| {
        b.iter_batched(
            || LogEntry::new(Some("bench".into()), LogLevel::Info, "Queued message"),
            |entry| {
                sender.enqueue(entry).unwrap();
                receiver.try_dequeue()
            },
            BatchSize::SmallInput,
        );
    });

    let funnel = null_funnel();
    let log = funnel.logger().child("bench");
    group.bench_function("logger_info", |b| {
        b.iter(|| log.info(black_box("Funnel message")));
    });
    funnel.shutdown().unwrap();

    group.finish();
}

// ============================================================================
// Concurrent Producer Benchmarks
// ============================================================================

fn bench_concurrent_producers(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_producers");

    for producers in [1usize, 4, 8] {
        let per_producer = 1_000;
        group.throughput(Throughput::Elements((producers * per_producer) as u64));
        group.bench_function(format!("producers_{}", producers), |b| {
            b.iter(|| {
                let funnel = null_funnel();
                let handles: Vec<_> = (0..producers)
                    .map(|p| {
                        let log = funnel.logger().child(format!("p{}", p));
                        std::thread::spawn(move || {
                            for i in 0..per_producer {
                                log.info(format!("message {}", i));
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
                funnel.shutdown().unwrap()
            });
        });
    }

    group.finish();
}

// ============================================================================
// Dispatch Benchmarks
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    let entry = LogEntry::new(Some("a.b.c".into()), LogLevel::Warning, "Dispatched message");

    let mut backend = null_backend(LogLevel::Debug);
    group.bench_function("format_and_write", |b| {
        b.iter(|| backend.handle(black_box(&entry)));
    });

    let mut filtered = null_backend(LogLevel::Critical);
    group.bench_function("below_threshold", |b| {
        b.iter(|| filtered.handle(black_box(&entry)));
    });

    let formatter = Formatter::new("{level} {timestamp} [{name}] {message}", "%Y-%m-%d %H:%M:%S%.3f")
        .expect("formatter");
    group.bench_function("formatter_only", |b| {
        let record = LogRecord::stamp(&entry);
        b.iter(|| formatter.format(black_box(&record)));
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(benches, bench_enqueue, bench_concurrent_producers, bench_dispatch);

criterion_main!(benches);
