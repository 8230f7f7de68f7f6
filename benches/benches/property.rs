// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `trellis_property` + `trellis_style`.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::sync::Once;

use trellis_property::{
    ErasedValue, Layer, Property, PropertyMetadataBuilder, PropertyRegistry, PropertyStore,
};
use trellis_style::{ClassId, Selector, SelectorInputs, StyleBuilder, StyleProvider, StyleSheetBuilder};

fn bench_store(c: &mut Criterion) {
    static PRINT_SIZES: Once = Once::new();
    PRINT_SIZES.call_once(|| {
        eprintln!(
            "sizes: PropertyStore={} ErasedValue={}",
            core::mem::size_of::<PropertyStore>(),
            core::mem::size_of::<ErasedValue>(),
        );
    });

    let mut registry = PropertyRegistry::new();
    let element = registry.register_type("UIElement", None);
    let props: Vec<Property<f64>> = [
        "Width", "Height", "MinWidth", "MinHeight", "MaxWidth", "MaxHeight", "Left", "Top",
    ]
    .into_iter()
    .map(|name| registry.register(element, name, PropertyMetadataBuilder::new(0.0_f64).build()))
    .collect();

    let mut group = c.benchmark_group("property_store");
    group.bench_function("set_local_then_animated", |b| {
        b.iter_batched(
            PropertyStore::new,
            |mut store| {
                for (i, &p) in props.iter().enumerate() {
                    let v = i as f64;
                    let _ = store.set(p, Layer::Local, v, &registry);
                    let _ = store.set(p, Layer::Animated, v + 1.0, &registry);
                }
                store
            },
            BatchSize::SmallInput,
        );
    });

    let mut store = PropertyStore::new();
    for &p in &props[..4] {
        let _ = store.set(p, Layer::Styled, 3.0, &registry);
    }
    group.bench_function("effective_mixed", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for &p in &props {
                sum += *store.effective(black_box(p), &registry);
            }
            black_box(sum)
        });
    });
    group.bench_function("idempotent_set", |b| {
        b.iter(|| black_box(store.set(props[0], Layer::Styled, 3.0, &registry)));
    });
    group.finish();
}

fn bench_style(c: &mut Criterion) {
    let mut registry = PropertyRegistry::new();
    let element = registry.register_type("UIElement", None);
    let width = registry.register(element, "Width", PropertyMetadataBuilder::new(0.0_f64).build());
    let height = registry.register(element, "Height", PropertyMetadataBuilder::new(0.0_f64).build());

    let mut group = c.benchmark_group("style_resolve");
    for rules in [8_u32, 64, 256] {
        let mut builder = StyleSheetBuilder::new();
        for i in 0..rules {
            builder = builder.rule(
                Selector::of_type(element).class(ClassId(i % 16)),
                StyleBuilder::new()
                    .set(width, f64::from(i))
                    .set(height, f64::from(i) * 2.0)
                    .build(),
            );
        }
        let sheet = builder.build();
        let classes = [ClassId(1), ClassId(5), ClassId(9)];
        let inputs = SelectorInputs::new(None, Some(element), &classes, &[]);
        let mut scratch = Vec::new();
        let mut out = Vec::new();
        group.bench_with_input(BenchmarkId::from_parameter(rules), &rules, |b, _| {
            b.iter(|| {
                sheet.resolve(black_box(&inputs), &mut scratch, &mut out);
                black_box(out.len())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_store, bench_style);
criterion_main!(benches);
