use equilibria::{find_steady_states, Bound, Domain, SteadyStateFinder, SteadyStateOptions};
use equilibria::{FieldSystem, SteadyStateError};

// https://en.wikipedia.org/wiki/Lotka%E2%80%93Volterra_equations
struct LotkaVolterra {
    alpha: f64,
    beta: f64,
    gamma: f64,
    delta: f64,
}

impl LotkaVolterra {
    fn field(&self, x: &[f64]) -> Vec<f64> {
        let (prey, predator) = (x[0], x[1]);

        vec![
            self.alpha * prey - self.beta * prey * predator,
            self.delta * prey * predator - self.gamma * predator,
        ]
    }
}

fn main() -> Result<(), SteadyStateError> {
    let model = LotkaVolterra {
        alpha: 2.0 / 3.0,
        beta: 4.0 / 3.0,
        gamma: 1.0,
        delta: 1.0,
    };

    // Populations cannot be negative.
    let domain: Domain<f64> = [Bound::TwoSided(0.0, 3.0), Bound::LowerBounded(0.0)]
        .into_iter()
        .collect();

    let mut options = SteadyStateOptions::default();
    options.set_num_samples(200).set_seed(Some(42));

    let roots = find_steady_states(|x| model.field(x), 2, Some(domain.clone()), options)?;
    for root in &roots {
        println!("prey = {:.6}\tpredator = {:.6}", root[0], root[1]);
    }

    // The same search with access to the counts.
    let r = FieldSystem::infallible(2, |x: &[f64]| model.field(x));
    let mut finder = SteadyStateFinder::builder(&r)
        .with_domain(domain)
        .with_options(options)
        .build()?;

    let states = finder.find()?;
    println!("{:?}", states.stats());

    Ok(())
}
