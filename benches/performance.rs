// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use archcontour::analysis::{Adjacency, BandTable, FeatureClassifier, Strategy, TopologyBuilder};
use archcontour::geometry::{Bvh, Primitive, Transform};
use archcontour::{ContourView, ViewConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::Vector3;

fn bench_topology(c: &mut Criterion) {
    let mut group = c.benchmark_group("topology");

    for segments in [16u32, 64] {
        let soup = Primitive::sphere(10.0, segments).to_soup();
        for adjacency in [Adjacency::RingOrder, Adjacency::SharedEdge] {
            let builder = TopologyBuilder::new(adjacency);
            group.bench_with_input(
                BenchmarkId::new(format!("{adjacency:?}"), soup.triangle_count()),
                &soup,
                |b, soup| b.iter(|| builder.build(black_box(soup))),
            );
        }
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    let soup = Primitive::sphere(10.0, 64).to_soup();
    let topology = TopologyBuilder::default().build(&soup);
    for strategy in [Strategy::EdgeAngle, Strategy::AreaStatistics] {
        let classifier = FeatureClassifier::new(strategy, BandTable::table_one());
        group.bench_function(format!("{strategy:?}"), |b| {
            b.iter(|| classifier.classify(black_box(&topology)))
        });
    }

    group.finish();
}

fn bench_collision(c: &mut Criterion) {
    let mut group = c.benchmark_group("collision");

    let sphere = Primitive::sphere(10.0, 48).to_soup();
    group.bench_function("bvh_build", |b| b.iter(|| Bvh::build(black_box(&sphere))));

    let bvh = Bvh::build(&sphere);
    let cube = Bvh::build(&Primitive::cube(Vector3::new(8.0, 8.0, 8.0), true).to_soup());
    let touching = Transform::from_translation(12.0, 0.0, 0.0).matrix();
    let apart = Transform::from_translation(40.0, 0.0, 0.0).matrix();
    group.bench_function("intersect_touching", |b| {
        b.iter(|| bvh.intersects(black_box(&cube), &touching))
    });
    group.bench_function("intersect_apart", |b| {
        b.iter(|| bvh.intersects(black_box(&cube), &apart))
    });

    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let config = ViewConfig {
        width: 320,
        height: 240,
        ..ViewConfig::default()
    };
    let Ok(mut view) = ContourView::new(config) else {
        return;
    };
    view.load_primary(Primitive::sphere(10.0, 32).to_soup());
    view.load_opposing(Primitive::cube(Vector3::new(8.0, 8.0, 8.0), true).to_soup());

    c.bench_function("frame_320x240", |b| b.iter(|| black_box(view.frame())));
}

criterion_group!(benches, bench_topology, bench_classify, bench_collision, bench_frame);
criterion_main!(benches);
