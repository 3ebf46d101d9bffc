// ─────────────────────────────────────────────────────────────────────
// SCPN XRD Scan — Operator Benchmark
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use xrd_core::operator::ForwardOperatorBuilder;
use xrd_core::planner::MeasurementPlanner;
use xrd_core::reconstruct::Reconstructor;
use xrd_types::config::AveragingPolicy;
use xrd_types::state::Grid1D;

fn bench_fine_operator(c: &mut Criterion) {
    let grid = Grid1D::arange(3.5, 0.005).expect("grid");
    let centers = MeasurementPlanner::new(0.5, 0.5, 3.5)
        .and_then(|p| p.plan())
        .expect("centers");
    let mut group = c.benchmark_group("fine_operator_700");
    for policy in [AveragingPolicy::WindowedMask, AveragingPolicy::ReflectiveSymmetry] {
        let builder = ForwardOperatorBuilder::new(policy);
        group.bench_function(format!("{policy:?}"), |b| {
            b.iter(|| {
                let op = builder.build(&grid, &centers, 0.5).expect("build");
                black_box(op.nrows());
            })
        });
    }
    group.finish();
}

fn bench_reconstruction(c: &mut Criterion) {
    let grid = Grid1D::arange(3.5, 0.05).expect("grid");
    let centers = MeasurementPlanner::new(0.5, 0.5, 3.5)
        .and_then(|p| p.plan())
        .expect("centers");
    let op = ForwardOperatorBuilder::default()
        .build(&grid, &centers, 0.5)
        .expect("build");
    let readings = op.row_sums().mapv(|s| -400.0 * s);
    let solver = Reconstructor::new(&op).expect("factorize");
    c.bench_function("factorize_14x70", |b| {
        b.iter(|| black_box(Reconstructor::new(&op).expect("factorize")))
    });
    c.bench_function("solve_14x70", |b| {
        b.iter(|| black_box(solver.solve(&readings, 0.05).expect("solve").rank))
    });
}

criterion_group!(benches, bench_fine_operator, bench_reconstruction);
criterion_main!(benches);
