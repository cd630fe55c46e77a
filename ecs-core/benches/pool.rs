// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Sparse-set pool benchmarks
//!
//! Measures insert, random lookup, dense iteration and swap-removal.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ecs_core::ecs::{Component, Pool};
use ecs_core::Entity;

#[derive(Debug, Clone, Copy)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

impl Component for Position {}

fn entity(id: u32) -> Entity {
    Entity::from_raw(id + 1).expect("id + 1 is never zero")
}

fn filled_pool(count: u32) -> Pool<Position> {
    let mut pool = Pool::new();
    for i in 0..count {
        let f = i as f32;
        pool.add_or_set(entity(i), Position { x: f, y: f * 2.0, z: f * 3.0 });
    }
    pool
}

fn bench_pool_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_insert");

    for count in [100u32, 1000, 10000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| black_box(filled_pool(count)));
        });
    }

    group.finish();
}

fn bench_pool_random_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_random_access");

    for count in [100u32, 1000, 10000] {
        let pool = filled_pool(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut sum = 0.0;
                // stride through the ids to defeat the prefetcher
                for i in 0..count {
                    let id = (i * 7919) % count;
                    if let Some(p) = pool.try_get(entity(id)) {
                        sum += p.x;
                    }
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

fn bench_pool_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_iteration");

    for count in [100u32, 1000, 10000] {
        let mut pool = filled_pool(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("all", count), &count, |b, _| {
            b.iter(|| black_box(pool.all().map(|(_, p)| p.x + p.y + p.z).sum::<f32>()));
        });

        group.bench_with_input(BenchmarkId::new("iter_mut", count), &count, |b, _| {
            b.iter(|| {
                for (_, p) in pool.iter_mut() {
                    p.x += 1.0;
                }
            });
        });
    }

    group.finish();
}

fn bench_pool_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_remove");

    for count in [100u32, 1000, 10000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || filled_pool(count),
                |mut pool| {
                    for i in (0..count).step_by(2) {
                        pool.remove(entity(i));
                    }
                    black_box(pool);
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    pool_benches,
    bench_pool_insert,
    bench_pool_random_access,
    bench_pool_iteration,
    bench_pool_remove
);
criterion_main!(pool_benches);
