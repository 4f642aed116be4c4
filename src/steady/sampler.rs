//! Uniform initial guesses drawn from a sampling box.

use rand::Rng;
use rand_distr::{uniform::SampleUniform, Distribution, Uniform};

use crate::core::{RealField, SamplingBox};

/// Draws independent initial guesses, each coordinate uniform over its
/// interval of the [`SamplingBox`].
pub struct Sampler<T: SampleUniform> {
    dists: Vec<Uniform<T>>,
}

impl<T: RealField + SampleUniform> Sampler<T> {
    /// Creates the sampler.
    ///
    /// Intervals are closed, so a degenerate `[a, a]` interval always yields
    /// `a`. Panics if the uniform distribution cannot represent an interval
    /// (reversed or too wide), which a box derived from a validated domain
    /// never is.
    pub fn new(sampling_box: &SamplingBox<T>) -> Self {
        let dists = sampling_box
            .intervals()
            .iter()
            .map(|&(lo, hi)| Uniform::new_inclusive(lo, hi))
            .collect();

        Self { dists }
    }

    /// Draws one guess.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<T> {
        self.dists.iter().map(|dist| dist.sample(rng)).collect()
    }

    /// Draws `m` guesses in the order they are generated.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R, m: usize) -> Vec<Vec<T>> {
        (0..m).map(|_| self.sample(rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::{Bound, Domain};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn guesses_stay_in_box() {
        let dom: Domain<f64> = [
            Bound::TwoSided(-10.0, 10.0),
            Bound::LowerBounded(5.0),
            Bound::TwoSided(2.0, 2.0),
        ]
        .into_iter()
        .collect();
        let sampler = Sampler::new(&dom.sampling_box());
        let mut rng = StdRng::seed_from_u64(3);

        let guesses = sampler.draw(&mut rng, 200);
        assert_eq!(guesses.len(), 200);

        for guess in guesses {
            assert_eq!(guess.len(), 3);
            assert!((-10.0..=10.0).contains(&guess[0]));
            assert!((0.0..=1.0).contains(&guess[1]));
            assert_eq!(guess[2], 2.0);
        }
    }

    #[test]
    fn widest_valid_interval() {
        let bound = Bound::TwoSided(0.0, f64::MAX / 2.0);
        assert!(bound.is_valid());

        let dom: Domain<f64> = [bound].into_iter().collect();
        let sampler = Sampler::new(&dom.sampling_box());

        for guess in sampler.draw(&mut StdRng::seed_from_u64(0), 20) {
            assert!(guess[0].is_finite());
            assert!((0.0..=f64::MAX / 2.0).contains(&guess[0]));
        }
    }

    #[test]
    fn same_seed_same_guesses() {
        let sampler = Sampler::new(&Domain::<f64>::unit(4).sampling_box());

        let a = sampler.draw(&mut StdRng::seed_from_u64(42), 10);
        let b = sampler.draw(&mut StdRng::seed_from_u64(42), 10);
        let c = sampler.draw(&mut StdRng::seed_from_u64(43), 10);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
