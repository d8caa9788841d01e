//! Benchmarks for the call pricer, the calibration solvers and grid solves.

#![allow(clippy::unwrap_used, missing_docs)]

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use loan_pricer::grid::{GridSpec, PricingGrid, SolveTarget};
use loan_pricer::pricing::{ContractTerms, MarketAssumptions, call_price};
use loan_pricer::solver::{FeeSolver, RateSolver, SolverConfig};

fn market() -> MarketAssumptions {
    MarketAssumptions::new(100.0, 0.5, 0.0, 0.0).unwrap()
}

fn bench_call_price(c: &mut Criterion) {
    c.bench_function("call_price_atm_30d", |b| {
        b.iter(|| {
            call_price(
                black_box(100.0),
                black_box(100.0),
                black_box(0.5),
                black_box(30.0 / 365.0),
                black_box(0.0),
                black_box(0.0),
            )
        })
    });
}

fn bench_rate_solver(c: &mut Criterion) {
    let market = market();
    let solver = RateSolver::default();
    let mut group = c.benchmark_group("rate_solver");

    // 1.5 exhausts every guess
    for ltv in [0.5, 0.7, 0.9, 1.5] {
        let terms = ContractTerms::new(ltv, 30.0 / 365.0).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(ltv), &terms, |b, terms| {
            b.iter(|| solver.solve(black_box(&market), black_box(terms)))
        });
    }
    group.finish();
}

fn bench_fee_solver(c: &mut Criterion) {
    let market = market();
    let solver = FeeSolver::default();
    let terms = ContractTerms::new(0.9, 30.0 / 365.0).unwrap();

    c.bench_function("fee_solver_ltv_0.9", |b| {
        b.iter(|| solver.solve(black_box(&market), black_box(&terms)))
    });
}

fn bench_grid(c: &mut Criterion) {
    let ltvs = ["10%", "20%", "30%", "40%", "50%", "60%", "70%", "80%", "90%"];
    let tenors = ["30d", "60d", "90d", "120d", "150d", "180d"];
    let spec = GridSpec::from_labels(&ltvs, &tenors).unwrap();
    let market = market();
    let mut group = c.benchmark_group("grid_9x6");

    for (name, min_parallel_cells) in [("sequential", usize::MAX), ("parallel", 1)] {
        let grid = PricingGrid::new(spec.clone(), SolverConfig::default())
            .with_min_parallel_cells(min_parallel_cells);
        group.bench_function(name, |b| {
            b.iter(|| grid.solve(SolveTarget::InterestRate, black_box(&market)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_call_price,
    bench_rate_solver,
    bench_fee_solver,
    bench_grid
);
criterion_main!(benches);
