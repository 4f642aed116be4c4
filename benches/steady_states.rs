use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use equilibria::{
    algo::TrustRegion,
    find_steady_states,
    testing::*,
    Bound, Domain, Problem, SteadyStateFinder, SteadyStateOptions,
};

const MAX_ITERS: usize = 1000;
const TOLERANCE: f64 = 1e-12;

fn local_solver(c: &mut Criterion) {
    let r = ExtendedRosenbrock::new(2);
    let dom = r.domain();

    for (i, x) in r.initials().into_iter().enumerate() {
        c.bench_function(&format!("trust region rosenbrock {}", i + 1), |b| {
            b.iter(|| {
                assert!(solve(
                    &r,
                    &dom,
                    TrustRegion::new(&r, &dom),
                    x.clone_owned(),
                    MAX_ITERS,
                    TOLERANCE
                )
                .is_ok())
            })
        });
    }
}

fn bistable(c: &mut Criterion) {
    let r = Bistable::new();
    let mut group = c.benchmark_group("bistable");

    for num_samples in [10, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(num_samples),
            &num_samples,
            |b, &num_samples| {
                b.iter(|| {
                    let mut finder = SteadyStateFinder::builder(&r)
                        .with_domain(Domain::rect(vec![-2.0], vec![2.0]))
                        .with_samples(num_samples)
                        .with_seed(0)
                        .build()
                        .unwrap();

                    finder.find().unwrap()
                })
            },
        );
    }

    group.finish();
}

fn lotka_volterra(c: &mut Criterion) {
    let r = LotkaVolterra::default();

    c.bench_function("lotka-volterra 500 samples", |b| {
        b.iter(|| {
            let mut options = SteadyStateOptions::default();
            options.set_seed(Some(0));

            let domain: Domain<f64> = [Bound::TwoSided(-0.5, 3.0), Bound::TwoSided(-0.5, 3.0)]
                .into_iter()
                .collect();

            let roots = find_steady_states(|x| r.field(x), 2, Some(domain), options).unwrap();
            assert_eq!(roots.len(), 2);
        })
    });
}

criterion_group!(steady_states, local_solver, bistable, lotka_volterra);
criterion_main!(steady_states);
