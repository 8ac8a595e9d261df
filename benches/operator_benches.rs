use std::sync::OnceLock;

use advection::{faer_add::broadcast, profiles, Float, Grid, Scheme, UpdateOperator};
use faer::Mat;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

static U: OnceLock<Mat<Float>> = OnceLock::new();

fn initial_state() -> &'static Mat<Float> {
    U.get_or_init(|| {
        let grid = Grid::new(-1.0, 1.0, 400).expect("valid grid");
        broadcast(profiles::bump(0.5, 100.0), grid.coordinates().as_ref())
    })
}

fn benchmark_build(c: &mut Criterion) {
    c.bench_function("build_fromm_400", |b| {
        b.iter(|| UpdateOperator::build(Scheme::Fromm, 1.0, black_box(0.5), 400))
    });
}

fn benchmark_step(c: &mut Criterion) {
    let operator = UpdateOperator::build(Scheme::LaxWendroff, 1.0, 0.5, 400).expect("operator");
    let mut out = initial_state().clone();
    c.bench_function("lax_wendroff_step_400", |b| {
        b.iter(|| operator.apply_to(black_box(initial_state().as_ref()), out.as_mut()))
    });
}

criterion_group!(benches, benchmark_build, benchmark_step);
criterion_main!(benches);
