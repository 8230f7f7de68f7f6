// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for the `trellis` layout pipeline.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use kurbo::Size;
use trellis::{ElementId, Leaf, Stack, UiHost};

/// A vertical stack of `rows` horizontal stacks with `cols` leaves each.
fn grid(rows: u32, cols: u32) -> (UiHost, Vec<ElementId>) {
    let mut host = UiHost::new();
    let props = *host.properties();
    let root = host.create_element(props.stack_panel, Stack);
    host.set_root(root).unwrap();
    let mut leaves = Vec::new();
    for _ in 0..rows {
        let row = host.create_element(props.stack_panel, Stack);
        host.set_local(row, props.orientation, trellis::Orientation::Horizontal)
            .unwrap();
        host.add_child(root, row).unwrap();
        for c in 0..cols {
            let leaf = host.create_element(
                props.ui_element,
                Leaf::new(Size::new(10.0 + f64::from(c), 12.0)),
            );
            host.add_child(row, leaf).unwrap();
            leaves.push(leaf);
        }
    }
    host.run_pending_layout().unwrap();
    (host, leaves)
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    for (rows, cols) in [(8_u32, 8_u32), (32, 32)] {
        let label = format!("{rows}x{cols}");

        group.bench_with_input(BenchmarkId::new("initial_layout", &label), &(rows, cols), |b, &(r, c)| {
            b.iter(|| black_box(grid(r, c).0.len()));
        });

        let (mut host, leaves) = grid(rows, cols);
        let width = host.properties().width;
        let mut toggle = false;
        group.bench_function(BenchmarkId::new("single_leaf_relayout", &label), |b| {
            b.iter(|| {
                toggle = !toggle;
                let w = if toggle { Some(40.0) } else { None };
                host.set_local(leaves[leaves.len() / 2], width, w).unwrap();
                host.run_pending_layout().unwrap();
            });
        });

        group.bench_function(BenchmarkId::new("idle_drain", &label), |b| {
            b.iter(|| black_box(host.run_pending_layout().is_ok()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
