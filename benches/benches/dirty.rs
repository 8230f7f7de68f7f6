// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use trellis_dirty::{Channel, DirtyQueues, TraversalScratch};

const STYLE: Channel = Channel::new(0);
const MEASURE: Channel = Channel::new(1);

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }
}

fn bench_queues(c: &mut Criterion) {
    let mut group = c.benchmark_group("dirty_queues");
    for n in [256_u32, 4096] {
        // Keys with plenty of repeats, as when many properties of one element change.
        let mut rng = Lcg(0x5eed);
        let keys: Vec<u32> = (0..n * 4).map(|_| rng.next_u32() % n).collect();
        group.bench_function(format!("push_dedup_drain/{n}"), |b| {
            b.iter_batched(
                || DirtyQueues::<u32>::with_capacity(2, n as usize),
                |mut queues| {
                    for &k in &keys {
                        queues.push(k, STYLE);
                    }
                    let mut drained = 0;
                    while let Some(k) = queues.pop(STYLE) {
                        queues.push(k, MEASURE);
                        drained += 1;
                    }
                    while queues.pop(MEASURE).is_some() {
                        drained += 1;
                    }
                    black_box(drained)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_traversal(c: &mut Criterion) {
    // Complete 4-ary tree.
    let n: u32 = 4096;
    let children = |k: u32, out: &mut Vec<u32>| {
        out.extend((1..=4).map(|i| k * 4 + i).filter(|&c| c < n));
    };
    let mut scratch = TraversalScratch::new();
    let mut out = Vec::new();
    c.bench_function("traversal/preorder_4096", |b| {
        b.iter(|| {
            out.clear();
            scratch.collect_preorder(black_box(0), children, &mut out);
            black_box(out.len())
        });
    });
}

criterion_group!(benches, bench_queues, bench_traversal);
criterion_main!(benches);
