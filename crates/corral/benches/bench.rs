use core::hint::black_box;
use corral::{Account, Counter, JobRunner, PoolConfig, WorkQueue, WorkerPool};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};
use tokio::runtime::Builder;

// Number of jobs pushed through the pool per benchmark iteration.
const TOTAL_JOBS: usize = 4096;

/// Benchmarks end-to-end pool throughput for trivially cheap tasks.
fn bench_pool(c: &mut Criterion) {
    let rt = Builder::new_multi_thread().enable_all().build().unwrap();
    let mut group = c.benchmark_group("pool");
    group.throughput(Throughput::Elements(TOTAL_JOBS as u64));

    for workers in [1, 4, num_cpus::get()] {
        group.bench_function(format!("run/workers/{workers}"), |b| {
            b.to_async(&rt).iter(|| async move {
                let runner = JobRunner::new(workers, TOTAL_JOBS).unwrap();
                let report = runner
                    .run(|_, job| async move {
                        black_box(job);
                        Ok::<_, core::convert::Infallible>(())
                    })
                    .await
                    .unwrap();
                black_box(report);
            });
        });

        group.bench_function(format!("run_collect/workers/{workers}"), |b| {
            b.to_async(&rt).iter(|| async move {
                let config = PoolConfig::new(workers)
                    .with_queue_capacity(64)
                    .with_result_capacity(64);
                let runner = JobRunner::with_config(config, TOTAL_JOBS).unwrap();
                let (results, _) = runner
                    .run_collect(|_, job| async move { Ok::<_, core::convert::Infallible>(job * 2) })
                    .await
                    .unwrap();
                black_box(results);
            });
        });
    }

    group.finish();
}

/// Benchmarks raw queue push/pop with a single producer and consumer.
fn bench_queue(c: &mut Criterion) {
    let rt = Builder::new_multi_thread().enable_all().build().unwrap();
    let mut group = c.benchmark_group("queue");
    group.throughput(Throughput::Elements(TOTAL_JOBS as u64));

    group.bench_function("push_pop/capacity/64", |b| {
        b.to_async(&rt).iter(|| async {
            let queue = WorkQueue::bounded(64).unwrap();
            let consumer = {
                let queue = queue.clone();
                tokio::spawn(async move {
                    let mut n = 0;
                    while queue.pop().await.is_some() {
                        n += 1;
                    }
                    n
                })
            };
            for i in 0..TOTAL_JOBS {
                queue.push(i).await.unwrap();
            }
            queue.close().unwrap();
            black_box(consumer.await.unwrap());
        });
    });

    group.bench_function("pool_start/workers/8", |b| {
        b.to_async(&rt).iter(|| async {
            let pool = WorkerPool::new(PoolConfig::new(8)).unwrap();
            let queue = WorkQueue::<usize>::bounded(8).unwrap();
            let handle = pool.start(&queue, |_, _| async { Ok::<_, core::convert::Infallible>(()) });
            queue.close().unwrap();
            black_box(handle.await_completion().await);
        });
    });

    group.finish();
}

/// Benchmarks guarded state under thread contention.
fn bench_guarded(c: &mut Criterion) {
    let threads = num_cpus::get();
    let ops_per_thread = TOTAL_JOBS / threads.max(1);
    let mut group = c.benchmark_group("guarded");
    group.throughput(Throughput::Elements((ops_per_thread * threads) as u64));

    group.bench_function(format!("account/threads/{threads}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let account = Account::shared(i64::MAX / 2);
                let barrier = Arc::new(Barrier::new(threads));
                scope(|s| {
                    for _ in 0..threads {
                        let account = Arc::clone(&account);
                        let barrier = Arc::clone(&barrier);
                        s.spawn(move || {
                            barrier.wait();
                            for _ in 0..ops_per_thread {
                                black_box(account.withdraw(1).ok());
                            }
                        });
                    }
                });
            }
            start.elapsed()
        });
    });

    group.bench_function(format!("counter/threads/{threads}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let counter = Counter::new();
                scope(|s| {
                    for _ in 0..threads {
                        s.spawn(|| {
                            for _ in 0..ops_per_thread {
                                black_box(counter.increment());
                            }
                        });
                    }
                });
            }
            start.elapsed()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_pool, bench_queue, bench_guarded);
criterion_main!(benches);
