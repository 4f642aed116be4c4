//! Multi-start search for the steady states of a vector field.
//!
//! A steady state (equilibrium) of `dx/dt = F(x)` is a point where `F(x) = 0`.
//! The search draws many initial guesses uniformly from a sampling box, runs a
//! local root finder from each of them and keeps the distinct roots that lie
//! in the admissible domain:
//!
//! 1. The domain is validated and turned into a [`SamplingBox`]. Two-sided
//!    bounds are sampled as they are, every other bound falls back to `[0, 1]`.
//! 2. For every guess, the [`LocalSolver`] reports a [`Candidate`]. Candidates
//!    that did not converge are skipped.
//! 3. Coordinates smaller than `zero_tol` in magnitude are snapped to exact
//!    zero ([`filter::snap_to_zero`]).
//! 4. Points outside of the original (possibly unbounded) domain are skipped.
//! 5. Points closer than `tol` in every coordinate to an already accepted root
//!    are skipped ([`filter::is_duplicate`]).
//! 6. The accepted roots are sorted lexicographically by their coordinates
//!    rounded to 12 decimals ([`order::sort_canonical`]).
//!
//! The search is a heuristic. It gives no guarantee that all roots are found.
//!
//! For closures over `f64`, use [`find_steady_states`]:
//!
//! ```rust
//! use equilibria::{find_steady_states, Bound, Domain, SteadyStateOptions};
//!
//! let domain: Domain<f64> = [Bound::TwoSided(-10.0, 10.0)].into_iter().collect();
//! let mut options = SteadyStateOptions::default();
//! options.set_num_samples(100).set_seed(Some(0));
//!
//! let roots = find_steady_states(|x| vec![x[0] * x[0] - 1.0], 1, Some(domain), options)?;
//! assert_eq!(roots.len(), 2);
//! # Ok::<(), equilibria::SteadyStateError>(())
//! ```
//!
//! Types implementing [`System`] go through the builder:
//!
//! ```rust
//! # use equilibria::nalgebra as na;
//! # use equilibria::{Domain, Problem, System, SystemError};
//! # use na::{Dyn, IsContiguous};
//! use equilibria::SteadyStateFinder;
//! #
//! # struct Bistable;
//! #
//! # impl Problem for Bistable {
//! #     type Field = f64;
//! #
//! #     fn domain(&self) -> Domain<Self::Field> {
//! #         Domain::unconstrained(1)
//! #     }
//! # }
//! #
//! # impl System for Bistable {
//! #     fn eval<Sx, Srx>(
//! #         &self,
//! #         x: &na::Vector<Self::Field, Dyn, Sx>,
//! #         rx: &mut na::Vector<Self::Field, Dyn, Srx>,
//! #     ) -> Result<(), SystemError>
//! #     where
//! #         Sx: na::storage::Storage<Self::Field, Dyn> + IsContiguous,
//! #         Srx: na::storage::StorageMut<Self::Field, Dyn>,
//! #     {
//! #         rx[0] = x[0] - x[0].powi(3);
//! #         Ok(())
//! #     }
//! # }
//!
//! let r = Bistable;
//! let mut finder = SteadyStateFinder::builder(&r)
//!     .with_domain(Domain::rect(vec![-2.0], vec![2.0]))
//!     .with_samples(200)
//!     .with_seed(7)
//!     .build()?;
//!
//! let states = finder.find()?;
//! assert_eq!(states.len(), 3);
//! # Ok::<(), equilibria::SteadyStateError>(())
//! ```

pub mod filter;
pub mod local;
pub mod order;
pub mod sampler;

use std::{convert::Infallible, error::Error as StdError};

use getset::{CopyGetters, Setters};
use log::{log, Level};
use nalgebra::convert;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::uniform::SampleUniform;
use thiserror::Error;

use crate::{
    algo::TrustRegion,
    core::{Domain, Problem, RealField, SamplingBox, SystemError},
    driver::SolverDriver,
    field::FieldSystem,
};

pub use local::{Candidate, Convergence, LocalDriver, LocalSolver};
pub use sampler::Sampler;

use filter::{find_duplicate, snap_to_zero};
use order::sort_canonical;

/// Options of the steady-state search.
#[derive(Debug, Clone, Copy, CopyGetters, Setters)]
#[getset(get_copy = "pub", set = "pub")]
pub struct SteadyStateOptions<T: Copy> {
    /// Number of initial guesses. Default: `500`.
    num_samples: usize,
    /// Two roots closer than this in every coordinate are the same root.
    /// Default: `1e-8`.
    tol: T,
    /// Coordinates smaller than this in magnitude are snapped to zero.
    /// Default: `1e-10`.
    zero_tol: T,
    /// Log the per-guess progress at info level instead of debug. Default:
    /// `false`.
    ///
    /// The messages go through the [`log`](https://docs.rs/log) facade. The
    /// crate installs no logger, so nothing is printed unless the
    /// application sets one up (e.g., `env_logger`).
    verbose: bool,
    /// Seed of the random generator. Default: `None` (seeded from entropy).
    seed: Option<u64>,
}

impl<T: RealField> Default for SteadyStateOptions<T> {
    fn default() -> Self {
        Self {
            num_samples: 500,
            tol: convert(1e-8),
            zero_tol: convert(1e-10),
            verbose: false,
            seed: None,
        }
    }
}

/// Counts of what happened to the initial guesses of one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct SearchStats {
    /// Number of initial guesses drawn.
    samples: usize,
    /// Guesses from which the local solver did not converge.
    diverged: usize,
    /// Converged points outside of the domain.
    out_of_domain: usize,
    /// Converged points equal to an already accepted root.
    duplicates: usize,
    /// Accepted roots.
    accepted: usize,
}

/// The roots found by a search, in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct SteadyStates<T> {
    roots: Vec<Vec<T>>,
    stats: SearchStats,
}

impl<T> SteadyStates<T> {
    /// Gets the roots.
    pub fn roots(&self) -> &[Vec<T>] {
        &self.roots
    }

    /// Takes the roots.
    pub fn into_roots(self) -> Vec<Vec<T>> {
        self.roots
    }

    /// Gets the counts of the search.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Number of roots.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether no root was found.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Iterates over the roots.
    pub fn iter(&self) -> impl Iterator<Item = &[T]> {
        self.roots.iter().map(Vec::as_slice)
    }
}

/// Error of the steady-state search.
///
/// Everything except [`SteadyStateError::System`] is detected before the
/// first guess is drawn.
#[derive(Debug, Error)]
pub enum SteadyStateError {
    /// The domain does not have one bound per variable.
    #[error("domain has {actual} bounds, but the system has {expected} variables")]
    InvalidDomain {
        /// Number of variables.
        expected: usize,
        /// Number of bounds.
        actual: usize,
    },
    /// A bound is reversed or contains NaN.
    #[error("invalid bound of variable {var}")]
    InvalidBound {
        /// Index of the variable.
        var: usize,
    },
    /// The system has no variables.
    #[error("system has no variables")]
    EmptySystem,
    /// The number of samples is zero.
    #[error("number of samples must be positive")]
    NoSamples,
    /// A tolerance is negative or NaN.
    #[error("invalid tolerance `{name}`")]
    InvalidTolerance {
        /// Name of the option.
        name: &'static str,
    },
    /// Evaluation of the system failed. No partial result is available.
    #[error("{0}")]
    System(#[from] SystemError),
}

/// Builder for the [`SteadyStateFinder`].
pub struct SteadyStateBuilder<'a, R: Problem, L> {
    r: &'a R,
    domain: Option<Domain<R::Field>>,
    options: SteadyStateOptions<R::Field>,
    local: L,
}

impl<'a, R: Problem, L> SteadyStateBuilder<'a, R, L> {
    /// Sets the admissible domain. Default: `[0, 1]` for every variable.
    pub fn with_domain(mut self, domain: Domain<R::Field>) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Sets the admissible domain from bounds of individual variables.
    pub fn with_bounds<I>(self, bounds: I) -> Self
    where
        I: IntoIterator<Item = crate::core::Bound<R::Field>>,
    {
        self.with_domain(bounds.into_iter().collect())
    }

    /// Replaces all options at once.
    pub fn with_options(mut self, options: SteadyStateOptions<R::Field>) -> Self {
        self.options = options;
        self
    }

    /// Sets the number of initial guesses.
    pub fn with_samples(mut self, num_samples: usize) -> Self {
        self.options.num_samples = num_samples;
        self
    }

    /// Sets the tolerance for two roots being equal.
    pub fn with_tol(mut self, tol: R::Field) -> Self {
        self.options.tol = tol;
        self
    }

    /// Sets the tolerance for snapping coordinates to zero.
    pub fn with_zero_tol(mut self, zero_tol: R::Field) -> Self {
        self.options.zero_tol = zero_tol;
        self
    }

    /// Makes the search reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.options.seed = Some(seed);
        self
    }

    /// Logs the per-guess progress at info level.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.options.verbose = verbose;
        self
    }

    /// Uses a custom local root finder.
    pub fn with_local_solver<L2>(self, local: L2) -> SteadyStateBuilder<'a, R, L2> {
        SteadyStateBuilder {
            r: self.r,
            domain: self.domain,
            options: self.options,
            local,
        }
    }

    /// Validates the configuration and builds the [`SteadyStateFinder`].
    pub fn build(self) -> Result<SteadyStateFinder<R::Field, L>, SteadyStateError>
    where
        R::Field: SampleUniform,
    {
        let Self {
            r,
            domain,
            options,
            local,
        } = self;

        let dim = r.domain().dim();
        if dim == 0 {
            return Err(SteadyStateError::EmptySystem);
        }

        let domain = domain.unwrap_or_else(|| Domain::unit(dim));
        if domain.dim() != dim {
            return Err(SteadyStateError::InvalidDomain {
                expected: dim,
                actual: domain.dim(),
            });
        }

        if let Some(var) = domain.bounds().iter().position(|bound| !bound.is_valid()) {
            return Err(SteadyStateError::InvalidBound { var });
        }

        if options.num_samples == 0 {
            return Err(SteadyStateError::NoSamples);
        }

        // Written so that NaN fails as well.
        if !(options.tol >= convert(0.0)) {
            return Err(SteadyStateError::InvalidTolerance { name: "tol" });
        }

        if !(options.zero_tol >= convert(0.0)) {
            return Err(SteadyStateError::InvalidTolerance { name: "zero_tol" });
        }

        let sampling_box = domain.sampling_box();
        let sampler = Sampler::new(&sampling_box);

        Ok(SteadyStateFinder {
            domain,
            sampling_box,
            sampler,
            options,
            local,
        })
    }
}

impl<'a, R: Problem, A> SteadyStateBuilder<'a, R, LocalDriver<'a, R, A>> {
    /// Sets the algorithm of the default local solver.
    ///
    /// The factory gets the system and its own domain, which is used by the
    /// solver and is independent of the admissible domain of the search.
    pub fn with_algo<S2, FA>(self, factory: FA) -> SteadyStateBuilder<'a, R, LocalDriver<'a, R, S2>>
    where
        FA: FnOnce(&R, &Domain<R::Field>) -> S2,
    {
        let convergence = *self.local.convergence();
        let driver = SolverDriver::builder(self.r).with_algo(factory).build();

        self.with_local_solver(LocalDriver::new(driver, convergence))
    }

    /// Sets the stopping rules of the default local solver.
    pub fn with_convergence(mut self, convergence: Convergence<R::Field>) -> Self {
        self.local.set_convergence(convergence);
        self
    }
}

/// Multi-start steady-state search.
///
/// Created by [`SteadyStateFinder::builder`]. The finder can be run
/// repeatedly, every run is independent of the previous ones.
pub struct SteadyStateFinder<T: RealField + SampleUniform, L> {
    domain: Domain<T>,
    sampling_box: SamplingBox<T>,
    sampler: Sampler<T>,
    options: SteadyStateOptions<T>,
    local: L,
}

impl<'a, R: Problem> SteadyStateFinder<R::Field, LocalDriver<'a, R, TrustRegion<R>>>
where
    R::Field: SampleUniform,
{
    /// Returns the builder for the search over the roots of given system.
    ///
    /// The default local solver is the [`TrustRegion`] method running in the
    /// domain of the system.
    pub fn builder(r: &'a R) -> SteadyStateBuilder<'a, R, LocalDriver<'a, R, TrustRegion<R>>> {
        SteadyStateBuilder {
            r,
            domain: None,
            options: SteadyStateOptions::default(),
            local: LocalDriver::new(SolverDriver::new(r), Convergence::default()),
        }
    }
}

impl<T: RealField + SampleUniform, L: LocalSolver<T>> SteadyStateFinder<T, L> {
    /// Runs the search with the generator seeded from the options, or from
    /// entropy if there is no seed.
    pub fn find(&mut self) -> Result<SteadyStates<T>, SteadyStateError> {
        let mut rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        self.find_with_rng(&mut rng)
    }

    /// Runs the search with given random generator.
    pub fn find_with_rng<G: Rng + ?Sized>(
        &mut self,
        rng: &mut G,
    ) -> Result<SteadyStates<T>, SteadyStateError> {
        let SteadyStateOptions {
            num_samples,
            tol,
            zero_tol,
            verbose,
            ..
        } = self.options;

        let level = if verbose { Level::Info } else { Level::Debug };

        let mut roots: Vec<Vec<T>> = Vec::new();
        let mut stats = SearchStats {
            samples: num_samples,
            ..SearchStats::default()
        };

        for i in 0..num_samples {
            let guess = self.sampler.sample(rng);
            let candidate = self.local.solve(&guess)?;

            if !candidate.is_converged() {
                log!(level, "guess {:>3}: did not converge", i);
                stats.diverged += 1;
                continue;
            }

            let mut point = candidate.into_point();
            snap_to_zero(&mut point, zero_tol);

            if !self.domain.contains(&point) {
                log!(level, "guess {:>3}: out of bounds {:.4?}", i, point);
                stats.out_of_domain += 1;
                continue;
            }

            if let Some(k) = find_duplicate(&roots, &point, tol) {
                log!(level, "guess {:>3}: duplicate of root {}", i, k);
                stats.duplicates += 1;
                continue;
            }

            log!(level, "guess {:>3}: accepted root {:.4?}", i, point);
            roots.push(point);
            stats.accepted += 1;
        }

        sort_canonical(&mut roots);

        log!(
            level,
            "found {} steady states from {} samples ({} did not converge, {} out of bounds, {} duplicates)",
            stats.accepted,
            stats.samples,
            stats.diverged,
            stats.out_of_domain,
            stats.duplicates
        );

        Ok(SteadyStates { roots, stats })
    }
}

impl<T: RealField + SampleUniform, L> SteadyStateFinder<T, L> {
    /// Gets the admissible domain.
    pub fn domain(&self) -> &Domain<T> {
        &self.domain
    }

    /// Gets the box the initial guesses are drawn from.
    pub fn sampling_box(&self) -> &SamplingBox<T> {
        &self.sampling_box
    }

    /// Gets the options.
    pub fn options(&self) -> &SteadyStateOptions<T> {
        &self.options
    }
}

/// Finds the steady states of the vector field `field` in `num_vars`
/// variables.
///
/// Without `domain`, every variable is restricted to `[0, 1]`. Returns the
/// distinct roots inside the domain in canonical order, possibly none.
pub fn find_steady_states<F>(
    field: F,
    num_vars: usize,
    domain: Option<Domain<f64>>,
    options: SteadyStateOptions<f64>,
) -> Result<Vec<Vec<f64>>, SteadyStateError>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    try_find_steady_states(
        move |x: &[f64]| Ok::<_, Infallible>(field(x)),
        num_vars,
        domain,
        options,
    )
}

/// Same as [`find_steady_states`], but for a vector field that can fail.
///
/// The first error returned by the field aborts the search with
/// [`SteadyStateError::System`].
pub fn try_find_steady_states<F, E>(
    field: F,
    num_vars: usize,
    domain: Option<Domain<f64>>,
    options: SteadyStateOptions<f64>,
) -> Result<Vec<Vec<f64>>, SteadyStateError>
where
    F: Fn(&[f64]) -> Result<Vec<f64>, E>,
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    if num_vars == 0 {
        return Err(SteadyStateError::EmptySystem);
    }

    let r = FieldSystem::new(num_vars, field);
    let mut builder = SteadyStateFinder::builder(&r).with_options(options);
    if let Some(domain) = domain {
        builder = builder.with_domain(domain);
    }

    let states = builder.build()?.find()?;
    Ok(states.into_roots())
}
